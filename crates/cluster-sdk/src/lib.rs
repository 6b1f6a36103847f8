//! Cluster management client with policy-driven server certificate trust.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cluster_sdk::{CertificateValidator, ClusterClient, TrustSettings};
//!
//! #[tokio::main]
//! async fn main() -> cluster_sdk::Result<()> {
//!     let settings: TrustSettings = toml::from_str(r#"
//!         tolerate_offline_crl = true
//!
//!         [[name_constraints]]
//!         name = "mycluster.westus.cloudapp.azure.com"
//!         issuer_thumbprint = "AB:CD:EF:01:23"
//!     "#)?;
//!     let validator = Arc::new(CertificateValidator::from_settings(Some(settings))?);
//!
//!     let client = ClusterClient::builder("https://mycluster.westus.cloudapp.azure.com:19080")
//!         .server_validator(Arc::clone(&validator))
//!         .build()?;
//!
//!     let health: serde_json::Value = client.get("/$/GetClusterHealth").await?;
//!     println!("{health}");
//!
//!     // Rotate to a pinned certificate without rebuilding the client
//!     validator.replace(Some(cluster_sdk::TrustPolicy::thumbprint_based(
//!         [cluster_sdk::Thumbprint::parse("0123456789ABCDEF")?],
//!         false,
//!     )))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The trust engine always runs as the client's rustls server verifier, so
//! this crate has no TLS feature switch.

#![doc(html_root_url = "https://docs.rs/cluster-sdk/0.4.0")]

// Re-export core types
pub use cluster_trust_core::*;

// Re-export the trust engine
pub use cluster_trust::{
    inspect_certificate, thumbprint_of, CertificateValidator, InspectedCertificate,
    NameConstraintSettings, PolicyServerVerifier, PolicyServerVerifierBuilder, ThumbprintAlgorithm,
    TrustSettings,
};

// Re-export client
pub use cluster_client::{CertificateDer, ClusterClient, ClusterClientBuilder, RootCertStore};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
