use thiserror::Error;

/// Result type alias for cluster SDK operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors surfaced by the trust engine and the cluster transport.
///
/// Certificate rejection is not an error: the validator answers `false`.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Trust configuration is absent or malformed
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Thumbprint is empty or not hex-encoded
    #[error("invalid thumbprint: {0}")]
    InvalidThumbprint(String),

    /// DER certificate could not be parsed
    #[error("certificate parse error: {0}")]
    CertificateParse(String),

    /// TLS client configuration could not be built
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// Authentication with the cluster endpoint failed
    #[error("authentication failed")]
    Unauthorized,

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// Cluster endpoint returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the endpoint
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed (includes rejected handshakes)
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClusterError {
    /// Shorthand for [`ClusterError::InvalidConfiguration`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Returns true if the error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }

    /// Returns true if the error stems from trust or TLS configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::InvalidThumbprint(_) | Self::Tls(_)
        )
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_classified() {
        assert!(ClusterError::config("missing policy").is_config_error());
        assert!(ClusterError::InvalidThumbprint("zz".into()).is_config_error());
        assert!(!ClusterError::Unauthorized.is_config_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(ClusterError::Unauthorized.status_code(), Some(401));
        assert_eq!(
            ClusterError::Api {
                code: 503,
                message: "busy".into()
            }
            .status_code(),
            Some(503)
        );
        assert_eq!(ClusterError::Timeout(30).status_code(), None);
        assert!(ClusterError::Timeout(30).is_retryable());
    }
}
