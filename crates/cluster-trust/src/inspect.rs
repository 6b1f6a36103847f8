//! Extract the matching inputs from a DER certificate.

use cluster_trust_core::{ClusterError, PresentedCertificate, Result, Thumbprint};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;

use crate::hash::{thumbprint_of, ThumbprintAlgorithm};

/// What the trust engine needs to know about one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedCertificate {
    /// First subject common name
    pub simple_name: Option<String>,
    /// First SAN dNSName, falling back to the common name
    pub dns_name: Option<String>,
    /// Subject and issuer names are identical
    pub self_issued: bool,
    /// Thumbprint of the DER encoding
    pub thumbprint: Thumbprint,
}

impl InspectedCertificate {
    /// The leaf view consumed by the validator
    #[must_use]
    pub fn to_presented(&self) -> PresentedCertificate {
        PresentedCertificate {
            simple_name: self.simple_name.clone(),
            dns_name: self.dns_name.clone(),
            thumbprint: self.thumbprint.clone(),
        }
    }
}

/// Parse a single DER-encoded X.509 certificate.
pub fn inspect_certificate(
    der: &[u8],
    algorithm: ThumbprintAlgorithm,
) -> Result<InspectedCertificate> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| ClusterError::CertificateParse(e.to_string()))?;

    let simple_name = common_name(&cert);
    let dns_name = first_dns_name(&cert)?.or_else(|| simple_name.clone());
    let self_issued = cert.subject().as_raw() == cert.issuer().as_raw();

    Ok(InspectedCertificate {
        simple_name,
        dns_name,
        self_issued,
        thumbprint: thumbprint_of(der, algorithm),
    })
}

fn common_name(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string)
}

fn first_dns_name(cert: &X509Certificate<'_>) -> Result<Option<String>> {
    let san = cert
        .subject_alternative_name()
        .map_err(|e| ClusterError::CertificateParse(e.to_string()))?;

    Ok(san.and_then(|ext| {
        ext.value.general_names.iter().find_map(|name| match name {
            GeneralName::DNSName(dns) => Some((*dns).to_string()),
            _ => None,
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

    fn self_signed(cn: &str, sans: &[&str]) -> Vec<u8> {
        let mut params =
            CertificateParams::new(sans.iter().map(|s| (*s).to_string()).collect::<Vec<_>>())
                .unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        let key = KeyPair::generate().unwrap();
        params.self_signed(&key).unwrap().der().to_vec()
    }

    #[test]
    fn extracts_names_and_thumbprint() {
        let der = self_signed("node-1", &["svc.cluster", "alt.cluster"]);
        let info = inspect_certificate(&der, ThumbprintAlgorithm::Sha1).unwrap();

        assert_eq!(info.simple_name.as_deref(), Some("node-1"));
        assert_eq!(info.dns_name.as_deref(), Some("svc.cluster"));
        assert!(info.self_issued);
        assert_eq!(info.thumbprint, thumbprint_of(&der, ThumbprintAlgorithm::Sha1));
        assert_eq!(info.thumbprint.as_str().len(), 40);
    }

    #[test]
    fn dns_name_falls_back_to_common_name() {
        let der = self_signed("svc.cluster", &[]);
        let info = inspect_certificate(&der, ThumbprintAlgorithm::Sha256).unwrap();

        assert_eq!(info.dns_name.as_deref(), Some("svc.cluster"));
        assert_eq!(info.thumbprint.as_str().len(), 64);

        let presented = info.to_presented();
        assert_eq!(presented.simple_name.as_deref(), Some("svc.cluster"));
        assert_eq!(presented.thumbprint, info.thumbprint);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            inspect_certificate(b"definitely not DER", ThumbprintAlgorithm::Sha1),
            Err(ClusterError::CertificateParse(_))
        ));
    }
}
