use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

use super::Thumbprint;

/// Leaf certificate offered by the peer during a handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedCertificate {
    /// Simple name (first subject common name)
    #[serde(default)]
    pub simple_name: Option<String>,

    /// DNS name (first SAN dNSName, or the common name when there is none)
    #[serde(default)]
    pub dns_name: Option<String>,

    /// Thumbprint of the certificate itself
    pub thumbprint: Thumbprint,
}

impl PresentedCertificate {
    /// Certificate known only by its thumbprint
    #[must_use]
    pub const fn new(thumbprint: Thumbprint) -> Self {
        Self {
            simple_name: None,
            dns_name: None,
            thumbprint,
        }
    }

    /// Set the simple (CN) name
    #[must_use]
    pub fn simple_name(mut self, name: impl Into<String>) -> Self {
        self.simple_name = Some(name.into());
        self
    }

    /// Set the DNS name
    #[must_use]
    pub fn dns_name(mut self, name: impl Into<String>) -> Self {
        self.dns_name = Some(name.into());
        self
    }

    /// Iterate the names this certificate can be matched by
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.simple_name
            .as_deref()
            .into_iter()
            .chain(self.dns_name.as_deref())
    }
}

/// Coarse handshake-level errors reported by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyErrors(u8);

impl PolicyErrors {
    /// The transport found nothing wrong
    pub const NONE: Self = Self(0);
    /// The peer did not present a usable certificate
    pub const CERTIFICATE_NOT_AVAILABLE: Self = Self(0x1);
    /// The certificate does not match the host name that was dialed
    pub const NAME_MISMATCH: Self = Self(0x2);
    /// Chain building reported defects
    pub const CHAIN_ERRORS: Self = Self(0x4);

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag in `other` is also set in `self`
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if the chain carries build errors that need interpreting
    #[must_use]
    pub const fn chain_errors_present(self) -> bool {
        self.contains(Self::CHAIN_ERRORS)
    }
}

impl BitOr for PolicyErrors {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PolicyErrors {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_skip_missing_values() {
        let tp = Thumbprint::parse("AA").unwrap();
        let cert = PresentedCertificate::new(tp.clone()).dns_name("svc.cluster");
        assert_eq!(cert.names().collect::<Vec<_>>(), vec!["svc.cluster"]);

        let cert = PresentedCertificate::new(tp)
            .simple_name("node-1")
            .dns_name("svc.cluster");
        assert_eq!(cert.names().collect::<Vec<_>>(), vec!["node-1", "svc.cluster"]);
    }

    #[test]
    fn policy_error_flags() {
        let errors = PolicyErrors::NAME_MISMATCH | PolicyErrors::CHAIN_ERRORS;
        assert!(errors.chain_errors_present());
        assert!(!errors.contains(PolicyErrors::CERTIFICATE_NOT_AVAILABLE));
        assert!(PolicyErrors::NONE.is_empty());
        assert!(!PolicyErrors::NAME_MISMATCH.chain_errors_present());
    }
}
