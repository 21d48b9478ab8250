//! Certification sources.
//!
//! [`CertificationSource`] is the seam between the fetch lifecycle and
//! whatever provides certification data. [`HttpSource`] talks to the
//! `GET /api/certification/{id}` endpoint; tests plug in their own sources.

use std::time::Duration;

use crate::error::FetchError;
use crate::model::Certification;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// A provider of certifications keyed by an opaque identifier.
///
/// The identifier is whatever routing supplied. Sources must not validate
/// it; the provider's answer decides success or failure.
#[async_trait::async_trait]
pub trait CertificationSource: Send + Sync + 'static {
    /// Fetch one certification.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, a non-2xx status, or a
    /// body that does not decode.
    async fn fetch(&self, id: &str) -> Result<Certification, FetchError>;
}

/// Configuration for [`HttpSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Server base URL. Default: `http://127.0.0.1:3000`.
    pub base_url: String,
    /// Per-request timeout. `None` lets the transport decide.
    pub timeout: Option<Duration>,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
        }
    }
}

/// Fetches certifications from the REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for the given base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_config(HttpSourceConfig {
            base_url: base_url.to_owned(),
            ..Default::default()
        })
    }

    /// Create a source with full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be built.
    #[allow(clippy::needless_pass_by_value)]
    pub fn with_config(cfg: HttpSourceConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent("lawva/0.1.0");
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = if cfg.base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            cfg.base_url.trim_end_matches('/')
        };

        Ok(Self {
            base_url: base_url.to_owned(),
            client,
        })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for an identifier.
    ///
    /// The identifier is percent-encoded as one path segment and otherwise
    /// passed through as given, including when empty.
    pub fn certification_url(&self, id: &str) -> String {
        format!(
            "{}/api/certification/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    /// URL of the server's health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url)
    }

    /// Ask the server for its health status, using the same client and
    /// timeout as certification requests.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] on transport failure,
    /// [`FetchError::Http`] on a non-2xx status, and [`FetchError::Decode`]
    /// when the body has no `status` string.
    pub async fn health(&self) -> Result<String, FetchError> {
        let resp = self.client.get(self.health_url()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        body.get("status")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| FetchError::Decode {
                reason: "health response has no status".to_owned(),
            })
    }
}

#[async_trait::async_trait]
impl CertificationSource for HttpSource {
    async fn fetch(&self, id: &str) -> Result<Certification, FetchError> {
        let url = self.certification_url(id);
        tracing::debug!(url = %url, "requesting certification");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        Certification::from_json(&body)
    }
}
