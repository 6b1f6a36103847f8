//! Core types for cluster server-certificate trust.
//!
//! This crate provides the foundational types shared by the trust engine and
//! the cluster transport:
//!
//! - **Policy**: [`TrustPolicy`] with its name-based and thumbprint-based modes
//! - **Handshake input**: [`PresentedCertificate`], [`CertificateChain`],
//!   [`ChainStatus`] and [`PolicyErrors`]
//! - **Errors**: a single [`ClusterError`] enum
//!
//! # Example
//!
//! ```rust
//! use cluster_trust_core::{NameConstraint, Thumbprint, TrustPolicy};
//!
//! let pin = Thumbprint::parse("aa11")?;
//! let policy = TrustPolicy::name_based(
//!     vec![NameConstraint::new("svc.cluster").with_issuer_pin(pin)],
//!     false,
//! );
//! assert!(!policy.is_fail_closed());
//! # Ok::<(), cluster_trust_core::ClusterError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/cluster-trust-core/0.4.0")]

mod error;
pub mod types;

pub use error::{ClusterError, Result};
pub use types::*;
