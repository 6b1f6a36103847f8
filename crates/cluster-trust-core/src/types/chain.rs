use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use super::Thumbprint;

/// Per-element defects found while building a certificate chain.
///
/// Bit values follow the conventional X.509 chain-status numbering so flag
/// sets reported by platform chain engines can be carried through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainStatus(u32);

impl ChainStatus {
    /// No defect
    pub const NO_ERROR: Self = Self(0);
    /// Outside its validity period
    pub const NOT_TIME_VALID: Self = Self(0x0000_0001);
    /// Revoked by its issuer
    pub const REVOKED: Self = Self(0x0000_0004);
    /// Signature does not verify
    pub const NOT_SIGNATURE_VALID: Self = Self(0x0000_0008);
    /// Key usage does not permit this use
    pub const NOT_VALID_FOR_USAGE: Self = Self(0x0000_0010);
    /// Chain terminates in a root that is not trusted
    pub const UNTRUSTED_ROOT: Self = Self(0x0000_0020);
    /// Revocation status could not be determined
    pub const REVOCATION_STATUS_UNKNOWN: Self = Self(0x0000_0040);
    /// Chain contains a cycle
    pub const CYCLIC: Self = Self(0x0000_0080);
    /// Invalid extension
    pub const INVALID_EXTENSION: Self = Self(0x0000_0100);
    /// Invalid policy constraints
    pub const INVALID_POLICY_CONSTRAINTS: Self = Self(0x0000_0200);
    /// Invalid basic constraints
    pub const INVALID_BASIC_CONSTRAINTS: Self = Self(0x0000_0400);
    /// Invalid name constraints
    pub const INVALID_NAME_CONSTRAINTS: Self = Self(0x0000_0800);
    /// Chain could not be built up to a root
    pub const PARTIAL_CHAIN: Self = Self(0x0001_0000);
    /// Revocation list could not be reached
    pub const OFFLINE_REVOCATION: Self = Self(0x0100_0000);
    /// Unclassified chain build failure
    pub const NOT_TRUSTED: Self = Self(0x4000_0000);

    /// Build from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u32 {
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

    /// Flags in `self` that are not in `other`
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Union of both flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for ChainStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ChainStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ChainStatus {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ChainStatus {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// One certificate of a built chain with the defects found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainElement {
    /// Thumbprint of this element's certificate
    pub thumbprint: Thumbprint,

    /// Defects reported for this element
    #[serde(default)]
    pub status: ChainStatus,
}

impl ChainElement {
    /// Element with no defects
    #[must_use]
    pub const fn new(thumbprint: Thumbprint) -> Self {
        Self {
            thumbprint,
            status: ChainStatus::NO_ERROR,
        }
    }

    /// Element carrying the given defects
    #[must_use]
    pub const fn with_status(thumbprint: Thumbprint, status: ChainStatus) -> Self {
        Self { thumbprint, status }
    }
}

/// Certificate chain from the leaf (index 0) towards the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateChain {
    elements: Vec<ChainElement>,
}

impl CertificateChain {
    /// Wrap an ordered list of elements
    #[must_use]
    pub const fn new(elements: Vec<ChainElement>) -> Self {
        Self { elements }
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if the chain holds no element
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element at `index`, leaf first
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChainElement> {
        self.elements.get(index)
    }

    /// The leaf element
    #[must_use]
    pub fn leaf(&self) -> Option<&ChainElement> {
        self.elements.first()
    }

    /// The element that signed the leaf, if present
    #[must_use]
    pub fn issuer(&self) -> Option<&ChainElement> {
        self.elements.get(1)
    }

    /// Iterate elements from leaf to root
    pub fn iter(&self) -> std::slice::Iter<'_, ChainElement> {
        self.elements.iter()
    }

    /// Union of all element defects
    #[must_use]
    pub fn combined_status(&self) -> ChainStatus {
        self.elements
            .iter()
            .fold(ChainStatus::NO_ERROR, |acc, e| acc | e.status)
    }
}

impl FromIterator<ChainElement> for CertificateChain {
    fn from_iter<I: IntoIterator<Item = ChainElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a ChainElement;
    type IntoIter = std::slice::Iter<'a, ChainElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
