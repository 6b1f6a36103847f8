use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::Thumbprint;

/// One accepted server identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConstraint {
    /// Name compared case-insensitively with the certificate's simple and DNS names
    pub expected_name: String,

    /// When set, the signing issuer must carry this thumbprint too
    #[serde(default)]
    pub issuer_thumbprint_pin: Option<Thumbprint>,
}

impl NameConstraint {
    /// Accept any certificate carrying `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            expected_name: name.into(),
            issuer_thumbprint_pin: None,
        }
    }

    /// Additionally require the issuer (or the certificate itself, when
    /// self-signed) to carry `pin`
    #[must_use]
    pub fn with_issuer_pin(mut self, pin: Thumbprint) -> Self {
        self.issuer_thumbprint_pin = Some(pin);
        self
    }
}

/// Accepted trust rules. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrustPolicy {
    /// Trust by subject/DNS name, optionally pinned to an issuer
    NameBased {
        /// Constraints tried in order; the first name match decides
        constraints: Vec<NameConstraint>,
        /// Accept chains whose only defect is an unreachable revocation list
        #[serde(default)]
        tolerates_offline_crl: bool,
    },
    /// Trust by the certificate's own thumbprint
    ThumbprintBased {
        /// Accepted certificate thumbprints
        pinned: HashSet<Thumbprint>,
        /// Also tolerate an unreachable revocation list
        #[serde(default)]
        tolerates_offline_crl: bool,
    },
    /// No trust rule: every certificate is rejected
    #[default]
    Unconfigured,
}

impl TrustPolicy {
    /// Name-based policy
    #[must_use]
    pub const fn name_based(constraints: Vec<NameConstraint>, tolerates_offline_crl: bool) -> Self {
        Self::NameBased {
            constraints,
            tolerates_offline_crl,
        }
    }

    /// Thumbprint-pinning policy
    pub fn thumbprint_based(
        pinned: impl IntoIterator<Item = Thumbprint>,
        tolerates_offline_crl: bool,
    ) -> Self {
        Self::ThumbprintBased {
            pinned: pinned.into_iter().collect(),
            tolerates_offline_crl,
        }
    }

    /// Whether an offline revocation list is tolerated
    #[must_use]
    pub const fn tolerates_offline_crl(&self) -> bool {
        match self {
            Self::NameBased {
                tolerates_offline_crl,
                ..
            }
            | Self::ThumbprintBased {
                tolerates_offline_crl,
                ..
            } => *tolerates_offline_crl,
            Self::Unconfigured => false,
        }
    }

    /// True if no rule can ever grant trust
    #[must_use]
    pub fn is_fail_closed(&self) -> bool {
        match self {
            Self::NameBased { constraints, .. } => constraints.is_empty(),
            Self::ThumbprintBased { pinned, .. } => pinned.is_empty(),
            Self::Unconfigured => true,
        }
    }

    /// Number of configured rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        match self {
            Self::NameBased { constraints, .. } => constraints.len(),
            Self::ThumbprintBased { pinned, .. } => pinned.len(),
            Self::Unconfigured => 0,
        }
    }

    /// Short label for the trust mode
    #[must_use]
    pub const fn mode(&self) -> TrustMode {
        match self {
            Self::NameBased { .. } => TrustMode::Name,
            Self::ThumbprintBased { .. } => TrustMode::Thumbprint,
            Self::Unconfigured => TrustMode::Unconfigured,
        }
    }
}

/// Trust mode of a [`TrustPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustMode {
    /// Name matching
    Name,
    /// Thumbprint pinning
    Thumbprint,
    /// Nothing configured
    Unconfigured,
}

impl fmt::Display for TrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Thumbprint => write!(f, "thumbprint"),
            Self::Unconfigured => write!(f, "unconfigured"),
        }
    }
}
