//! reqwest-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::SpaceError;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

pub const DEFAULT_BASE_URL: &str = "https://huggingface.co/api";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root that endpoint paths are appended to (default: Hugging Face Hub).
    pub base_url: String,

    /// Bearer token sent with every request.
    pub token: Option<String>,

    /// Per-request timeout (default: 30 seconds).
    pub request_timeout: Duration,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("spacectl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns `SpaceError::Configuration` if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, SpaceError> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            SpaceError::configuration(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SpaceError::configuration(format!(
                "unsupported base URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| SpaceError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "request failed"
            );
            TransportError::from(e)
        })?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "response received"
        );
        Ok(ApiResponse { status, body })
    }
}
