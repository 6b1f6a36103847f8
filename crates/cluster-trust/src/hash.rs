//! Certificate thumbprints via `ring::digest`.

use cluster_trust_core::Thumbprint;
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256};
use serde::{Deserialize, Serialize};

/// Digest used to compute certificate thumbprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbprintAlgorithm {
    /// SHA-1, the conventional certificate thumbprint (40 hex chars)
    #[default]
    Sha1,
    /// SHA-256 fingerprint (64 hex chars)
    Sha256,
}

/// Compute the thumbprint of a DER-encoded certificate.
#[must_use]
pub fn thumbprint_of(der: &[u8], algorithm: ThumbprintAlgorithm) -> Thumbprint {
    let algorithm = match algorithm {
        ThumbprintAlgorithm::Sha1 => &SHA1_FOR_LEGACY_USE_ONLY,
        ThumbprintAlgorithm::Sha256 => &SHA256,
    };
    Thumbprint::from_digest(digest(algorithm, der).as_ref())
}
