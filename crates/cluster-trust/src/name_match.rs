//! Subject/DNS name trust with optional issuer pinning.

use cluster_trust_core::{CertificateChain, ChainStatus, NameConstraint, PresentedCertificate};

use crate::chain::is_tolerable;

/// Decide trust for `cert` against an ordered list of name constraints.
///
/// With chain errors present the chain must carry nothing but
/// `OFFLINE_REVOCATION`, and only if the policy tolerates it. The first
/// constraint whose name matches decides; later constraints are never tried.
#[must_use]
pub fn matches(
    cert: &PresentedCertificate,
    chain: &CertificateChain,
    chain_errors_present: bool,
    constraints: &[NameConstraint],
    tolerates_offline_crl: bool,
) -> bool {
    if chain_errors_present
        && !(tolerates_offline_crl && is_tolerable(chain, ChainStatus::OFFLINE_REVOCATION))
    {
        return false;
    }

    let Some(constraint) = constraints
        .iter()
        .find(|c| cert.names().any(|name| names_equal(name, &c.expected_name)))
    else {
        return false;
    };

    let Some(pin) = &constraint.issuer_thumbprint_pin else {
        return true;
    };

    // Self-signed: the leaf is its own issuer.
    if chain.leaf().is_some_and(|leaf| leaf.thumbprint == *pin) {
        return true;
    }

    chain.issuer().is_some_and(|issuer| issuer.thumbprint == *pin)
}

/// Case-insensitive name comparison, Unicode-aware without allocating.
fn names_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_trust_core::{ChainElement, Thumbprint};

    fn tp(s: &str) -> Thumbprint {
        Thumbprint::parse(s).unwrap()
    }

    fn cert(name: &str, own: &str) -> PresentedCertificate {
        PresentedCertificate::new(tp(own)).dns_name(name)
    }

    fn chain_of(elements: &[(&str, ChainStatus)]) -> CertificateChain {
        elements
            .iter()
            .map(|(t, s)| ChainElement::with_status(tp(t), *s))
            .collect()
    }

    fn pinned(name: &str, pin: &str) -> Vec<NameConstraint> {
        vec![NameConstraint::new(name).with_issuer_pin(tp(pin))]
    }

    #[test]
    fn dns_name_match_without_pin() {
        let constraints = vec![NameConstraint::new("svc.cluster")];
        let chain = chain_of(&[("FF00", ChainStatus::NO_ERROR)]);

        assert!(matches(&cert("SVC.Cluster", "FF00"), &chain, false, &constraints, false));
        assert!(!matches(&cert("other.cluster", "FF00"), &chain, false, &constraints, false));
    }

    #[test]
    fn simple_name_also_matches() {
        let constraints = vec![NameConstraint::new("node-1")];
        let chain = chain_of(&[("FF00", ChainStatus::NO_ERROR)]);
        let c = PresentedCertificate::new(tp("FF00"))
            .simple_name("NODE-1")
            .dns_name("node-1.example");

        assert!(matches(&c, &chain, false, &constraints, false));
    }

    #[test]
    fn certificate_without_names_never_matches() {
        let constraints = vec![NameConstraint::new("svc.cluster")];
        let chain = chain_of(&[("FF00", ChainStatus::NO_ERROR)]);
        let c = PresentedCertificate::new(tp("FF00"));

        assert!(!matches(&c, &chain, false, &constraints, false));
    }

    #[test]
    fn self_signed_pin_on_leaf() {
        let chain = chain_of(&[("AA11", ChainStatus::NO_ERROR)]);
        assert!(matches(
            &cert("svc.cluster", "AA11"),
            &chain,
            false,
            &pinned("svc.cluster", "aa11"),
            false
        ));
    }

    #[test]
    fn ca_signed_pin_on_issuer() {
        let constraints = pinned("svc.cluster", "AA11");
        let full = chain_of(&[("FF00", ChainStatus::NO_ERROR), ("AA11", ChainStatus::NO_ERROR)]);
        let leaf_only = chain_of(&[("FF00", ChainStatus::NO_ERROR)]);

        assert!(matches(&cert("svc.cluster", "FF00"), &full, false, &constraints, false));
        assert!(!matches(&cert("svc.cluster", "FF00"), &leaf_only, false, &constraints, false));
    }

    #[test]
    fn wrong_issuer_rejects() {
        let chain = chain_of(&[("FF00", ChainStatus::NO_ERROR), ("BB22", ChainStatus::NO_ERROR)]);
        assert!(!matches(
            &cert("svc.cluster", "FF00"),
            &chain,
            false,
            &pinned("svc.cluster", "AA11"),
            false
        ));
    }

    #[test]
    fn first_matching_name_decides() {
        // The second constraint would accept, but the first name match wins.
        let constraints = vec![
            NameConstraint::new("svc.cluster").with_issuer_pin(tp("AA11")),
            NameConstraint::new("svc.cluster"),
        ];
        let chain = chain_of(&[("FF00", ChainStatus::NO_ERROR), ("BB22", ChainStatus::NO_ERROR)]);

        assert!(!matches(&cert("svc.cluster", "FF00"), &chain, false, &constraints, false));
    }

    #[test]
    fn chain_errors_without_offline_tolerance_reject() {
        let constraints = vec![NameConstraint::new("svc.cluster")];
        let chain = chain_of(&[("FF00", ChainStatus::OFFLINE_REVOCATION)]);

        assert!(!matches(&cert("svc.cluster", "FF00"), &chain, true, &constraints, false));
    }

    #[test]
    fn offline_revocation_only_proceeds_to_names() {
        let constraints = vec![NameConstraint::new("svc.cluster")];
        let chain = chain_of(&[
            ("FF00", ChainStatus::OFFLINE_REVOCATION),
            ("AA11", ChainStatus::OFFLINE_REVOCATION),
        ]);

        assert!(matches(&cert("svc.cluster", "FF00"), &chain, true, &constraints, true));
        assert!(!matches(&cert("other", "FF00"), &chain, true, &constraints, true));
    }

    #[test]
    fn any_other_defect_rejects_even_when_tolerant() {
        let constraints = vec![NameConstraint::new("svc.cluster")];
        let chain = chain_of(&[
            ("FF00", ChainStatus::OFFLINE_REVOCATION),
            ("AA11", ChainStatus::UNTRUSTED_ROOT),
        ]);

        assert!(!matches(&cert("svc.cluster", "FF00"), &chain, true, &constraints, true));
    }

    #[test]
    fn unicode_names_compare_case_insensitively() {
        assert!(names_equal("ÄRZTE.cluster", "ärzte.CLUSTER"));
        assert!(!names_equal("ärzte", "arzte"));
        assert!(!names_equal("ÄRZTE", "ärzte.cluster"));
        // 'İ' lowercases to two chars; comparison follows the expansion.
        assert!(names_equal("İ.cluster", "i\u{307}.cluster"));
    }
}
