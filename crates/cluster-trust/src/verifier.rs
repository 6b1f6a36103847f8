//! rustls integration: runs the trust engine inside the TLS handshake.
//!
//! The verifier lets rustls' WebPKI engine build and check the chain, turns
//! its verdict into [`PolicyErrors`] and [`ChainStatus`] flags, and hands the
//! final decision to the [`CertificateValidator`].
//!
//! The chain given to the validator is rebuilt from signatures: each element
//! after the leaf is a presented certificate or trust anchor whose key
//! verifies the element below it. Presented certificates that do not link
//! are dropped, so an issuer pin can only match the real issuer.

use std::sync::Arc;

use cluster_trust_core::{
    CertificateChain, ChainElement, ChainStatus, ClusterError, PolicyErrors, PresentedCertificate,
    Result,
};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, CertificateRevocationListDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, Error as TlsError, RootCertStore,
    SignatureScheme,
};
use tracing::debug;

use crate::hash::{thumbprint_of, ThumbprintAlgorithm};
use crate::inspect::inspect_certificate;
use crate::path::{issuer_path, Candidate};
use crate::validator::CertificateValidator;

/// Server certificate verifier driven by a [`CertificateValidator`].
#[derive(Debug)]
pub struct PolicyServerVerifier {
    validator: Arc<CertificateValidator>,
    webpki: Arc<WebPkiServerVerifier>,
    provider: Arc<CryptoProvider>,
    algorithm: ThumbprintAlgorithm,
    anchors: Vec<CertificateDer<'static>>,
}

impl PolicyServerVerifier {
    /// Start building a verifier that checks chains against `roots`.
    #[must_use]
    pub fn builder(
        validator: Arc<CertificateValidator>,
        roots: Arc<RootCertStore>,
    ) -> PolicyServerVerifierBuilder {
        PolicyServerVerifierBuilder {
            validator,
            roots,
            anchors: Vec::new(),
            crls: Vec::new(),
            enforce_crl_expiry: false,
            algorithm: ThumbprintAlgorithm::default(),
            provider: None,
        }
    }

    /// The validator consulted on every handshake
    #[must_use]
    pub fn validator(&self) -> &Arc<CertificateValidator> {
        &self.validator
    }

    /// Build a rustls client configuration using this verifier.
    pub fn client_config(self: &Arc<Self>) -> Result<ClientConfig> {
        let config = ClientConfig::builder_with_provider(Arc::clone(&self.provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| ClusterError::Tls(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::clone(self) as Arc<dyn ServerCertVerifier>)
            .with_no_client_auth();
        Ok(config)
    }

    fn decide(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        outcome: std::result::Result<ServerCertVerified, TlsError>,
    ) -> bool {
        let (Ok(leaf), Ok(start)) = (
            inspect_certificate(end_entity, self.algorithm),
            Candidate::parse(end_entity),
        ) else {
            let cert = PresentedCertificate::new(thumbprint_of(end_entity, self.algorithm));
            return self.validator.validate(
                &cert,
                &CertificateChain::default(),
                PolicyErrors::CERTIFICATE_NOT_AVAILABLE,
            );
        };

        let presented: Vec<Candidate<'_>> = intermediates
            .iter()
            .filter_map(|der| Candidate::parse(der).ok())
            .collect();
        let anchors: Vec<Candidate<'_>> = self
            .anchors
            .iter()
            .filter_map(|der| Candidate::parse(der).ok())
            .collect();
        let issuers = issuer_path(&start, &presented, &anchors);

        let chain_top_self_issued = issuers
            .last()
            .map_or(leaf.self_issued, |top| top.is_self_issued());

        let (errors, leaf_status) = match &outcome {
            Ok(_) => (PolicyErrors::NONE, ChainStatus::NO_ERROR),
            Err(err) => classify(err, chain_top_self_issued),
        };

        let chain: CertificateChain = std::iter::once(ChainElement::with_status(
            leaf.thumbprint.clone(),
            leaf_status,
        ))
        .chain(
            issuers
                .iter()
                .map(|c| ChainElement::new(thumbprint_of(c.der, self.algorithm))),
        )
        .collect();

        self.validator.validate(&leaf.to_presented(), &chain, errors)
    }
}

impl ServerCertVerifier for PolicyServerVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, TlsError> {
        let outcome =
            self.webpki
                .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now);

        if self.decide(end_entity, intermediates, outcome) {
            Ok(ServerCertVerified::assertion())
        } else {
            debug!(server = ?server_name, "server certificate rejected by trust policy");
            Err(TlsError::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Builder for [`PolicyServerVerifier`]
#[derive(Debug)]
pub struct PolicyServerVerifierBuilder {
    validator: Arc<CertificateValidator>,
    roots: Arc<RootCertStore>,
    anchors: Vec<CertificateDer<'static>>,
    crls: Vec<CertificateRevocationListDer<'static>>,
    enforce_crl_expiry: bool,
    algorithm: ThumbprintAlgorithm,
    provider: Option<Arc<CryptoProvider>>,
}

impl PolicyServerVerifierBuilder {
    /// Add root certificates to the trust store.
    ///
    /// Their DER is kept so the chain handed to the validator can end at the
    /// anchor, which lets an issuer pin name a root the server does not send.
    /// Anchors known only as `TrustAnchor`s (such as the Mozilla set) cannot
    /// be thumbprinted and never appear in that chain.
    #[must_use]
    pub fn anchor_certificates(
        mut self,
        certs: impl IntoIterator<Item = CertificateDer<'static>>,
    ) -> Self {
        self.anchors.extend(certs);
        self
    }

    /// Check revocation against these already-fetched CRLs
    #[must_use]
    pub fn crls(
        mut self,
        crls: impl IntoIterator<Item = CertificateRevocationListDer<'static>>,
    ) -> Self {
        self.crls.extend(crls);
        self
    }

    /// Report CRLs past their next-update time as offline revocation
    #[must_use]
    pub fn enforce_crl_expiry(mut self) -> Self {
        self.enforce_crl_expiry = true;
        self
    }

    /// Digest used to compute thumbprints (default SHA-1)
    #[must_use]
    pub fn thumbprint_algorithm(mut self, algorithm: ThumbprintAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Crypto provider (default: ring)
    #[must_use]
    pub fn provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the verifier
    pub fn build(self) -> Result<Arc<PolicyServerVerifier>> {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()));

        let roots = if self.anchors.is_empty() {
            self.roots
        } else {
            let mut store = (*self.roots).clone();
            for der in &self.anchors {
                Candidate::parse(der)?;
                store
                    .add(der.clone())
                    .map_err(|e| ClusterError::Tls(e.to_string()))?;
            }
            Arc::new(store)
        };

        let mut webpki = WebPkiServerVerifier::builder_with_provider(roots, Arc::clone(&provider));
        if !self.crls.is_empty() {
            webpki = webpki.with_crls(self.crls);
        }
        if self.enforce_crl_expiry {
            webpki = webpki.enforce_revocation_expiration();
        }
        let webpki = webpki
            .build()
            .map_err(|e| ClusterError::Tls(e.to_string()))?;

        Ok(Arc::new(PolicyServerVerifier {
            validator: self.validator,
            webpki,
            provider,
            algorithm: self.algorithm,
            anchors: self.anchors,
        }))
    }
}

/// Map a WebPKI failure onto handshake errors and leaf chain flags.
///
/// `chain_top_self_issued` tells an unknown issuer at a self-issued top
/// (untrusted root) apart from a chain that stops short of any root.
fn classify(err: &TlsError, chain_top_self_issued: bool) -> (PolicyErrors, ChainStatus) {
    let TlsError::InvalidCertificate(cert_err) = err else {
        return (PolicyErrors::CHAIN_ERRORS, ChainStatus::NOT_TRUSTED);
    };

    let status = match cert_err {
        CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. } => {
            return (PolicyErrors::NAME_MISMATCH, ChainStatus::NO_ERROR);
        }
        CertificateError::BadEncoding => {
            return (PolicyErrors::CERTIFICATE_NOT_AVAILABLE, ChainStatus::NO_ERROR);
        }
        CertificateError::UnknownIssuer if chain_top_self_issued => ChainStatus::UNTRUSTED_ROOT,
        CertificateError::UnknownIssuer => ChainStatus::PARTIAL_CHAIN,
        CertificateError::UnknownRevocationStatus => ChainStatus::REVOCATION_STATUS_UNKNOWN,
        CertificateError::ExpiredRevocationList
        | CertificateError::ExpiredRevocationListContext { .. } => ChainStatus::OFFLINE_REVOCATION,
        CertificateError::Revoked => ChainStatus::REVOKED,
        CertificateError::Expired
        | CertificateError::ExpiredContext { .. }
        | CertificateError::NotValidYet
        | CertificateError::NotValidYetContext { .. } => ChainStatus::NOT_TIME_VALID,
        CertificateError::BadSignature => ChainStatus::NOT_SIGNATURE_VALID,
        CertificateError::InvalidPurpose => ChainStatus::NOT_VALID_FOR_USAGE,
        CertificateError::UnhandledCriticalExtension => ChainStatus::INVALID_EXTENSION,
        _ => ChainStatus::NOT_TRUSTED,
    };

    (PolicyErrors::CHAIN_ERRORS, status)
}
