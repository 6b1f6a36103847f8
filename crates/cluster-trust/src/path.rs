//! Issuer path from a leaf through presented certificates to a trust anchor.

use cluster_trust_core::{ClusterError, Result};
use x509_parser::certificate::X509Certificate;

/// Issuers followed above the leaf before giving up
const MAX_DEPTH: usize = 8;

/// A parsed certificate together with the DER it was parsed from.
pub struct Candidate<'a> {
    pub der: &'a [u8],
    cert: X509Certificate<'a>,
}

impl<'a> Candidate<'a> {
    pub fn parse(der: &'a [u8]) -> Result<Self> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| ClusterError::CertificateParse(e.to_string()))?;
        Ok(Self { der, cert })
    }

    pub fn is_self_issued(&self) -> bool {
        self.cert.subject().as_raw() == self.cert.issuer().as_raw()
    }

    /// `issuer` names this certificate's issuer and its key verifies our signature.
    fn is_signed_by(&self, issuer: &Candidate<'_>) -> bool {
        self.cert.issuer().as_raw() == issuer.cert.subject().as_raw()
            && self
                .cert
                .verify_signature(Some(issuer.cert.public_key()))
                .is_ok()
    }
}

/// Follow signed issuer links upward from `leaf`.
///
/// Presented certificates are tried before anchors, in any order, each at
/// most once. The walk stops after reaching an anchor or a self-issued
/// certificate, or when nothing links. Certificates that never link are
/// left out. The leaf itself is not part of the result.
pub fn issuer_path<'a>(
    leaf: &'a Candidate<'a>,
    presented: &'a [Candidate<'a>],
    anchors: &'a [Candidate<'a>],
) -> Vec<&'a Candidate<'a>> {
    let mut path = Vec::new();
    let mut used = vec![false; presented.len()];
    let mut current = leaf;

    while path.len() < MAX_DEPTH && !current.is_self_issued() {
        let from_presented = presented
            .iter()
            .enumerate()
            .find(|(i, c)| !used[*i] && current.is_signed_by(c));

        if let Some((i, issuer)) = from_presented {
            used[i] = true;
            path.push(issuer);
            current = issuer;
            continue;
        }

        if let Some(anchor) = anchors.iter().find(|a| current.is_signed_by(a)) {
            path.push(anchor);
        }
        break;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{
        BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    };

    struct Issuer {
        cert: Certificate,
        key: KeyPair,
    }

    fn ca_params(cn: &str) -> CertificateParams {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
    }

    fn root(cn: &str) -> Issuer {
        let key = KeyPair::generate().unwrap();
        let cert = ca_params(cn).self_signed(&key).unwrap();
        Issuer { cert, key }
    }

    fn intermediate(cn: &str, parent: &Issuer) -> Issuer {
        let key = KeyPair::generate().unwrap();
        let cert = ca_params(cn)
            .signed_by(&key, &parent.cert, &parent.key)
            .unwrap();
        Issuer { cert, key }
    }

    fn leaf(parent: &Issuer) -> Vec<u8> {
        let params = CertificateParams::new(vec!["svc.cluster".to_string()]).unwrap();
        let key = KeyPair::generate().unwrap();
        params
            .signed_by(&key, &parent.cert, &parent.key)
            .unwrap()
            .der()
            .to_vec()
    }

    fn parse_all(ders: &[&[u8]]) -> Vec<Candidate<'static>> {
        ders.iter()
            .map(|d| Candidate::parse(Box::leak(d.to_vec().into_boxed_slice())).unwrap())
            .collect()
    }

    fn ders<'a>(path: &[&'a Candidate<'a>]) -> Vec<&'a [u8]> {
        path.iter().map(|c| c.der).collect()
    }

    #[test]
    fn reorders_presented_and_ends_at_anchor() {
        let r = root("Root");
        let i = intermediate("Issuing", &r);
        let leaf_der = leaf(&i);

        let leaf = Candidate::parse(&leaf_der).unwrap();
        // Sent root-first; linkage decides the order.
        let presented = parse_all(&[&r.cert.der()[..], &i.cert.der()[..]]);
        let anchors = parse_all(&[&r.cert.der()[..]]);

        let path = issuer_path(&leaf, &presented, &anchors);
        assert_eq!(ders(&path), vec![&i.cert.der()[..], &r.cert.der()[..]]);
    }

    #[test]
    fn anchor_completes_a_leaf_sent_alone() {
        let r = root("Root");
        let leaf_der = leaf(&r);
        let leaf = Candidate::parse(&leaf_der).unwrap();
        let anchors = parse_all(&[&r.cert.der()[..]]);

        let path = issuer_path(&leaf, &[], &anchors);
        assert_eq!(ders(&path), vec![&r.cert.der()[..]]);
    }

    #[test]
    fn unrelated_and_impostor_certificates_are_skipped() {
        let real = root("Real Issuer");
        let impostor = root("Real Issuer");
        let unrelated = root("Pinned Issuer");
        let leaf_der = leaf(&real);
        let leaf = Candidate::parse(&leaf_der).unwrap();

        // Same subject name as the real issuer, but its key never signed the leaf.
        let presented = parse_all(&[&unrelated.cert.der()[..], &impostor.cert.der()[..]]);
        assert!(issuer_path(&leaf, &presented, &[]).is_empty());

        let anchors = parse_all(&[&real.cert.der()[..]]);
        let path = issuer_path(&leaf, &presented, &anchors);
        assert_eq!(ders(&path), vec![&real.cert.der()[..]]);
    }

    #[test]
    fn self_issued_leaf_has_no_issuers() {
        let r = root("Standalone");
        let leaf = Candidate::parse(r.cert.der()).unwrap();
        assert!(leaf.is_self_issued());

        let anchors = parse_all(&[&r.cert.der()[..]]);
        assert!(issuer_path(&leaf, &[], &anchors).is_empty());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            Candidate::parse(b"not a certificate"),
            Err(ClusterError::CertificateParse(_))
        ));
    }
}
