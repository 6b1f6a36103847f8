//! The per-handshake trust decision point.

use std::sync::{Arc, PoisonError, RwLock};

use cluster_trust_core::{
    CertificateChain, ClusterError, PolicyErrors, PresentedCertificate, Result, TrustPolicy,
};
use tracing::info;

use crate::settings::TrustSettings;
use crate::{name_match, thumbprint_match};

/// Decides whether a server certificate is trusted under the current policy.
///
/// One validator is shared by every handshake of a client (usually behind an
/// `Arc`). The policy can be swapped at any time with [`replace`]; each
/// [`validate`] call evaluates against a single snapshot, old or new, never
/// a mixture.
///
/// [`replace`]: CertificateValidator::replace
/// [`validate`]: CertificateValidator::validate
#[derive(Debug)]
pub struct CertificateValidator {
    policy: RwLock<Arc<TrustPolicy>>,
}

impl CertificateValidator {
    /// Create a validator holding `policy`.
    ///
    /// A missing policy is an operator error and yields
    /// [`ClusterError::InvalidConfiguration`].
    pub fn new(policy: Option<TrustPolicy>) -> Result<Self> {
        let policy = policy.ok_or_else(|| ClusterError::config("trust policy is required"))?;
        log_policy("installed", &policy);
        Ok(Self {
            policy: RwLock::new(Arc::new(policy)),
        })
    }

    /// Create a validator from a settings section.
    pub fn from_settings(settings: Option<TrustSettings>) -> Result<Self> {
        Self::new(settings.map(TrustSettings::into_policy).transpose()?)
    }

    /// Atomically swap in a new policy.
    ///
    /// On error the previously active policy stays in place.
    pub fn replace(&self, policy: Option<TrustPolicy>) -> Result<()> {
        let policy = policy.ok_or_else(|| ClusterError::config("trust policy is required"))?;
        log_policy("replaced", &policy);
        let policy = Arc::new(policy);
        *self
            .policy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = policy;
        Ok(())
    }

    /// Swap in a policy built from a settings section.
    pub fn replace_from_settings(&self, settings: Option<TrustSettings>) -> Result<()> {
        self.replace(settings.map(TrustSettings::into_policy).transpose()?)
    }

    /// Snapshot of the currently active policy
    #[must_use]
    pub fn policy(&self) -> Arc<TrustPolicy> {
        Arc::clone(&self.policy.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Decide whether to trust `cert`.
    ///
    /// `errors` is the transport's own verdict on the handshake. A clean
    /// verdict is accepted as is; a missing certificate is always rejected.
    /// Everything else is judged by the active policy. Rejection is `false`,
    /// never an error, and carries no reason.
    #[must_use]
    pub fn validate(
        &self,
        cert: &PresentedCertificate,
        chain: &CertificateChain,
        errors: PolicyErrors,
    ) -> bool {
        if errors.is_empty() {
            return true;
        }
        if errors.contains(PolicyErrors::CERTIFICATE_NOT_AVAILABLE) {
            return false;
        }

        let policy = self.policy();
        let chain_errors_present = errors.chain_errors_present();

        match policy.as_ref() {
            TrustPolicy::NameBased {
                constraints,
                tolerates_offline_crl,
            } => name_match::matches(
                cert,
                chain,
                chain_errors_present,
                constraints,
                *tolerates_offline_crl,
            ),
            TrustPolicy::ThumbprintBased {
                pinned,
                tolerates_offline_crl,
            } => thumbprint_match::matches(
                cert,
                chain,
                chain_errors_present,
                pinned,
                *tolerates_offline_crl,
            ),
            TrustPolicy::Unconfigured => false,
        }
    }
}

fn log_policy(action: &str, policy: &TrustPolicy) {
    info!(
        action,
        mode = %policy.mode(),
        rules = policy.rule_count(),
        tolerates_offline_crl = policy.tolerates_offline_crl(),
        "server certificate trust policy updated"
    );
}
