//! Cluster management REST transport.

use cluster_trust::{CertificateValidator, PolicyServerVerifier, ThumbprintAlgorithm};
use cluster_trust_core::{ClusterError, Result, TrustPolicy};
use reqwest::Client as HttpClient;
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default REST API version sent with every request
const DEFAULT_API_VERSION: &str = "6.0";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport shared by the generated endpoint wrappers
#[derive(Clone)]
pub struct ClusterClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Url,
    api_version: String,
    timeout: Duration,
    validator: Arc<CertificateValidator>,
}

impl ClusterClient {
    /// Create a builder for the given management endpoint
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> ClusterClientBuilder {
        ClusterClientBuilder::new(endpoint)
    }

    /// The validator consulted on every TLS handshake.
    ///
    /// Call [`CertificateValidator::replace`] on it to reload the trust
    /// policy of a live client.
    #[must_use]
    pub fn validator(&self) -> &Arc<CertificateValidator> {
        &self.inner.validator
    }

    /// Management endpoint this client talks to
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    /// Perform a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.build_url(path, params)?;
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_response(response).await
    }

    /// Perform a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path, &[])?;
        debug!(url = %url, "POST request");

        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_response(response).await
    }

    /// Perform a PUT request with JSON body and no response payload
    pub async fn put<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.build_url(path, &[])?;
        debug!(url = %url, "PUT request");

        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_empty_response(response).await
    }

    /// Perform a DELETE request
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.build_url(path, &[])?;
        debug!(url = %url, "DELETE request");

        let response = self
            .inner
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_empty_response(response).await
    }

    /// Build a URL with query parameters (including the API version)
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{path}"))
            .map_err(|e| ClusterError::InvalidUrl(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", &self.inner.api_version);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Map a reqwest failure; rejected handshakes surface as connection errors
    fn transport_error(&self, err: &reqwest::Error) -> ClusterError {
        if err.is_timeout() {
            ClusterError::Timeout(self.inner.timeout.as_secs())
        } else if err.is_connect() {
            ClusterError::Connection(err.to_string())
        } else {
            ClusterError::Http(err.to_string())
        }
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ClusterError::Http(e.to_string()))?;
            serde_json::from_str(&body).map_err(ClusterError::Json)
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Handle an API response that returns no body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            self.handle_error(status.as_u16(), response).await
        }
    }

    /// Convert an error response to a ClusterError
    async fn handle_error<T>(&self, status: u16, response: reqwest::Response) -> Result<T> {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or(body);

        match status {
            401 => Err(ClusterError::Unauthorized),
            404 => Err(ClusterError::NotFound { resource: message }),
            _ => {
                if status >= 500 {
                    warn!(status, "cluster endpoint reported a server error");
                }
                Err(ClusterError::Api {
                    code: status,
                    message,
                })
            }
        }
    }
}

/// Pull the message out of `{"Error": {"Message": ...}}` or `{"error": ...}` bodies
fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    value
        .pointer("/Error/Message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(String::from)
}

/// Builder for configuring a [`ClusterClient`]
pub struct ClusterClientBuilder {
    endpoint: String,
    api_version: String,
    timeout: Duration,
    user_agent: String,
    roots: Option<RootCertStore>,
    anchors: Vec<CertificateDer<'static>>,
    validator: Option<Arc<CertificateValidator>>,
    thumbprint_algorithm: ThumbprintAlgorithm,
}

impl ClusterClientBuilder {
    /// Create a new builder for the given management endpoint
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("cluster-sdk-rust/{}", env!("CARGO_PKG_VERSION")),
            roots: None,
            anchors: Vec::new(),
            validator: None,
            thumbprint_algorithm: ThumbprintAlgorithm::default(),
        }
    }

    /// Set the REST API version
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Trust anchors for chain building (default: Mozilla roots)
    #[must_use]
    pub fn trust_roots(mut self, roots: RootCertStore) -> Self {
        self.roots = Some(roots);
        self
    }

    /// Cluster root certificates, added to the trust roots.
    ///
    /// Issuer pins can name these roots even when the server sends only its
    /// leaf certificate.
    #[must_use]
    pub fn trust_anchor_certificates(
        mut self,
        certs: impl IntoIterator<Item = CertificateDer<'static>>,
    ) -> Self {
        self.anchors.extend(certs);
        self
    }

    /// Server certificate validator (default: unconfigured policy, which
    /// accepts only certificates the TLS layer already trusts)
    #[must_use]
    pub fn server_validator(mut self, validator: Arc<CertificateValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Digest used for certificate thumbprints (default SHA-1)
    #[must_use]
    pub const fn thumbprint_algorithm(mut self, algorithm: ThumbprintAlgorithm) -> Self {
        self.thumbprint_algorithm = algorithm;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ClusterClient> {
        let base_url =
            Url::parse(&self.endpoint).map_err(|e| ClusterError::InvalidUrl(e.to_string()))?;

        let validator = match self.validator {
            Some(validator) => validator,
            None => Arc::new(CertificateValidator::new(Some(TrustPolicy::Unconfigured))?),
        };
        let roots = self.roots.unwrap_or_else(|| {
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect()
        });

        let verifier = PolicyServerVerifier::builder(Arc::clone(&validator), Arc::new(roots))
            .anchor_certificates(self.anchors)
            .thumbprint_algorithm(self.thumbprint_algorithm)
            .build()?;
        let tls = verifier.client_config()?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .use_preconfigured_tls(tls)
            .build()
            .map_err(|e| ClusterError::Tls(e.to_string()))?;

        Ok(ClusterClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_version: self.api_version,
                timeout: self.timeout,
                validator,
            }),
        })
    }
}
