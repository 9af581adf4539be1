//! HTTP feed source.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, trace, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::feed::{BoxFuture, FeedSource};

/// Configuration for [`HttpFeedSource`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("trcyoga/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FeedConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches feeds with a plain HTTP GET.
pub struct HttpFeedSource {
    client: Client,
    config: FeedConfig,
}

impl HttpFeedSource {
    /// Creates a new feed source.
    pub fn new(config: FeedConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_backend("http")
            })?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn get(&self, url: &str) -> ProviderResult<Vec<u8>> {
        trace!(url = %url, "Sending request");

        let response = self.client.get(url).send().await.map_err(|e| {
            ProviderError::network(format!("Request to {} failed: {}", url, e)).with_source(e)
        })?;

        let body = handle_response(url, response).await?;
        debug!(url = %url, bytes = body.len(), "Fetched feed");
        Ok(body)
    }
}

impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(async move { self.get(url).await.map_err(|e| e.with_backend("http")) })
    }
}

/// Returns the body of a 2xx response; anything else is an error carrying
/// the status.
async fn handle_response(url: &str, response: Response) -> ProviderResult<Vec<u8>> {
    let status = response.status();
    trace!(status = %status, "Received response");

    if status.is_success() {
        let body = response.bytes().await.map_err(|e| {
            ProviderError::network(format!("Failed to read response from {}: {}", url, e))
                .with_source(e)
        })?;
        return Ok(body.to_vec());
    }

    let code = ProviderErrorCode::for_status(status.as_u16());
    if code == ProviderErrorCode::InvalidResponse {
        warn!(url = %url, status = %status, "Unexpected response status");
    }
    Err(ProviderError::new(code, format!("{} returned {}", url, status)))
}
