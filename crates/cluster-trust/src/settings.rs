//! Trust section of a client configuration document.

use cluster_trust_core::{ClusterError, NameConstraint, Result, Thumbprint, TrustPolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Serialized shape of the server certificate trust settings.
///
/// ```toml
/// tolerate_offline_crl = true
///
/// [[name_constraints]]
/// name = "svc.cluster"
/// issuer_thumbprint = "AA11..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSettings {
    /// Accept chains whose only defect is an unreachable revocation list
    #[serde(default)]
    pub tolerate_offline_crl: bool,

    /// Accepted server names, tried in order
    #[serde(default)]
    pub name_constraints: Vec<NameConstraintSettings>,

    /// Accepted server certificate thumbprints
    #[serde(default)]
    pub pinned_thumbprints: Vec<Thumbprint>,
}

/// One entry of [`TrustSettings::name_constraints`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConstraintSettings {
    /// Expected certificate name
    pub name: String,

    /// Thumbprint of the issuer that must have signed the certificate
    #[serde(default)]
    pub issuer_thumbprint: Option<Thumbprint>,
}

impl TrustSettings {
    /// Convert into an immutable [`TrustPolicy`].
    ///
    /// Name constraints take priority over pinned thumbprints when both are
    /// present. With neither, the policy is [`TrustPolicy::Unconfigured`] and
    /// rejects every certificate.
    pub fn into_policy(self) -> Result<TrustPolicy> {
        if !self.name_constraints.is_empty() {
            if !self.pinned_thumbprints.is_empty() {
                warn!(
                    names = self.name_constraints.len(),
                    pins = self.pinned_thumbprints.len(),
                    "both name constraints and pinned thumbprints configured; pinned thumbprints are ignored"
                );
            }

            let constraints = self
                .name_constraints
                .into_iter()
                .map(NameConstraintSettings::into_constraint)
                .collect::<Result<Vec<_>>>()?;
            return Ok(TrustPolicy::name_based(
                constraints,
                self.tolerate_offline_crl,
            ));
        }

        if !self.pinned_thumbprints.is_empty() {
            return Ok(TrustPolicy::thumbprint_based(
                self.pinned_thumbprints,
                self.tolerate_offline_crl,
            ));
        }

        Ok(TrustPolicy::Unconfigured)
    }
}

impl NameConstraintSettings {
    fn into_constraint(self) -> Result<NameConstraint> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClusterError::config("name constraint with an empty name"));
        }

        Ok(NameConstraint {
            expected_name: name.to_string(),
            issuer_thumbprint_pin: self.issuer_thumbprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_trust_core::TrustMode;

    #[test]
    fn name_constraints_from_toml() {
        let doc = r#"
            tolerate_offline_crl = true

            [[name_constraints]]
            name = "svc.cluster"
            issuer_thumbprint = "aa:11"

            [[name_constraints]]
            name = "backup.cluster"
        "#;
        let settings: TrustSettings = toml::from_str(doc).unwrap();
        let policy = settings.into_policy().unwrap();

        let TrustPolicy::NameBased {
            constraints,
            tolerates_offline_crl,
        } = policy
        else {
            panic!("expected name-based policy");
        };
        assert!(tolerates_offline_crl);
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].expected_name, "svc.cluster");
        assert_eq!(
            constraints[0].issuer_thumbprint_pin.as_ref().unwrap().as_str(),
            "AA11"
        );
        assert!(constraints[1].issuer_thumbprint_pin.is_none());
    }

    #[test]
    fn pinned_thumbprints_from_json() {
        let settings: TrustSettings =
            serde_json::from_str(r#"{"pinned_thumbprints":["aa11","BB22"]}"#).unwrap();
        let policy = settings.into_policy().unwrap();

        assert_eq!(policy.mode(), TrustMode::Thumbprint);
        assert_eq!(policy.rule_count(), 2);
        assert!(!policy.tolerates_offline_crl());
    }

    #[test]
    fn malformed_thumbprint_is_rejected_while_parsing() {
        let result = toml::from_str::<TrustSettings>(r#"pinned_thumbprints = ["not-hex"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn names_win_over_pins() {
        let settings = TrustSettings {
            tolerate_offline_crl: false,
            name_constraints: vec![NameConstraintSettings {
                name: "svc.cluster".into(),
                issuer_thumbprint: None,
            }],
            pinned_thumbprints: vec![Thumbprint::parse("AA11").unwrap()],
        };

        assert_eq!(settings.into_policy().unwrap().mode(), TrustMode::Name);
    }

    #[test]
    fn empty_settings_are_unconfigured() {
        let policy = TrustSettings::default().into_policy().unwrap();
        assert_eq!(policy, TrustPolicy::Unconfigured);
    }

    #[test]
    fn blank_name_is_invalid() {
        let settings = TrustSettings {
            name_constraints: vec![NameConstraintSettings {
                name: "  ".into(),
                issuer_thumbprint: None,
            }],
            ..TrustSettings::default()
        };

        assert!(matches!(
            settings.into_policy(),
            Err(ClusterError::InvalidConfiguration(_))
        ));
    }
}
