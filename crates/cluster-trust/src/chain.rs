//! Chain tolerance evaluation.

use cluster_trust_core::{CertificateChain, ChainStatus};

/// Decide whether a chain carrying build defects is still acceptable.
///
/// Every element's flags minus `tolerated` must be empty. A single element
/// with any other defect makes the whole chain intolerable.
#[must_use]
pub fn is_tolerable(chain: &CertificateChain, tolerated: ChainStatus) -> bool {
    chain
        .iter()
        .all(|element| element.status.difference(tolerated).is_empty())
}
