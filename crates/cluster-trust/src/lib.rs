//! # cluster-trust
//!
//! Server certificate trust validation for cluster management clients.
//!
//! The transport calls into a [`CertificateValidator`] once per TLS
//! handshake. The validator answers with a plain `bool` under the trust
//! policy that is active at that moment. The policy can be swapped by an
//! administrative reload while handshakes are in flight.
//!
//! ## Trust Modes
//!
//! - **Name-based**: the certificate's simple or DNS name must match a
//!   configured name, optionally with the issuer pinned by thumbprint.
//!   Chain defects are tolerated only when the sole defect is an offline
//!   revocation list and the policy allows it.
//! - **Thumbprint-based**: the certificate itself is pinned. An untrusted
//!   root, unknown revocation status or partial chain does not matter once
//!   the leaf is pinned.
//! - **Unconfigured**: every certificate is rejected.
//!
//! ## Decision Flow
//!
//! ```text
//! transport ──► validate(cert, chain, errors)
//!                 │ errors == NONE                 -> true
//!                 │ CERTIFICATE_NOT_AVAILABLE      -> false
//!                 ▼
//!               policy snapshot
//!                 ├── NameBased       -> name_match::matches
//!                 ├── ThumbprintBased -> thumbprint_match::matches
//!                 └── Unconfigured    -> false
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cluster_trust::{CertificateValidator, TrustSettings};
//! use cluster_trust_core::{
//!     CertificateChain, ChainElement, PolicyErrors, PresentedCertificate, Thumbprint,
//! };
//!
//! let settings: TrustSettings = serde_json::from_str(
//!     r#"{ "name_constraints": [ { "name": "svc.cluster" } ] }"#,
//! )?;
//! let validator = CertificateValidator::from_settings(Some(settings))?;
//!
//! let leaf = Thumbprint::parse("ff00")?;
//! let cert = PresentedCertificate::new(leaf.clone()).dns_name("svc.cluster");
//! let chain: CertificateChain = [ChainElement::new(leaf)].into_iter().collect();
//!
//! assert!(validator.validate(&cert, &chain, PolicyErrors::NAME_MISMATCH));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chain;
pub mod hash;
pub mod inspect;
pub mod name_match;
#[cfg(feature = "rustls")]
mod path;
pub mod settings;
pub mod thumbprint_match;
pub mod validator;
#[cfg(feature = "rustls")]
pub mod verifier;

pub use cluster_trust_core::{ClusterError, Result};
pub use hash::{thumbprint_of, ThumbprintAlgorithm};
pub use inspect::{inspect_certificate, InspectedCertificate};
pub use settings::{NameConstraintSettings, TrustSettings};
pub use validator::CertificateValidator;
#[cfg(feature = "rustls")]
pub use verifier::{PolicyServerVerifier, PolicyServerVerifierBuilder};
