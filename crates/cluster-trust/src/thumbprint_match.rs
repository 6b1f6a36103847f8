//! Direct certificate pinning by thumbprint.

use std::collections::HashSet;

use cluster_trust_core::{CertificateChain, ChainStatus, PresentedCertificate, Thumbprint};

use crate::chain::is_tolerable;

/// Chain defects that do not matter once the leaf itself is pinned.
pub const PINNING_TOLERATED: ChainStatus = ChainStatus::UNTRUSTED_ROOT
    .union(ChainStatus::REVOCATION_STATUS_UNKNOWN)
    .union(ChainStatus::PARTIAL_CHAIN);

/// Decide trust for `cert` against a set of pinned thumbprints.
#[must_use]
pub fn matches(
    cert: &PresentedCertificate,
    chain: &CertificateChain,
    chain_errors_present: bool,
    pinned: &HashSet<Thumbprint>,
    tolerates_offline_crl: bool,
) -> bool {
    if chain_errors_present {
        let mut tolerated = PINNING_TOLERATED;
        if tolerates_offline_crl {
            tolerated |= ChainStatus::OFFLINE_REVOCATION;
        }
        if !is_tolerable(chain, tolerated) {
            return false;
        }
    }

    pinned.contains(&cert.thumbprint)
}
