//! HTTP transport for the cluster management REST API.
//!
//! Every TLS handshake made by a [`ClusterClient`] is decided by a shared
//! [`CertificateValidator`](cluster_trust::CertificateValidator), so a
//! trust policy reload takes effect on the next connection.

#![doc(html_root_url = "https://docs.rs/cluster-client/0.4.0")]

mod client;

pub use client::{ClusterClient, ClusterClientBuilder};
pub use cluster_trust_core::{ClusterError, Result};
pub use rustls::pki_types::CertificateDer;
pub use rustls::RootCertStore;
