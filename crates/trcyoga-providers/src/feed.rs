//! FeedSource trait definition.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

/// A boxed future for async trait methods.
///
/// Keeps [`FeedSource`] and [`ObjectStore`](crate::ObjectStore) object-safe so
/// the pipeline can hold them as `Arc<dyn ...>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches calendar feeds.
pub trait FeedSource: Send + Sync {
    /// Returns the name of this source (e.g. "http").
    fn name(&self) -> &str;

    /// Fetches the feed at `url` and returns its raw bytes.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success response is an error.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>>;
}

#[derive(Debug, Clone)]
enum StaticResponse {
    Body(Vec<u8>),
    Error(ProviderErrorCode, String),
}

/// A feed source serving fixed responses from memory.
///
/// Unknown URLs answer `not_found`. Every requested URL is recorded in
/// request order.
#[derive(Debug, Default)]
pub struct StaticFeedSource {
    responses: HashMap<String, StaticResponse>,
    requests: Mutex<Vec<String>>,
}

impl StaticFeedSource {
    /// Creates a source with no feeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve `body` at `url`.
    #[must_use]
    pub fn with_feed(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.into(), StaticResponse::Body(body.into()));
        self
    }

    /// Builder method to fail requests for `url` with the given error.
    #[must_use]
    pub fn with_error(mut self, url: impl Into<String>, error: ProviderError) -> Self {
        self.responses.insert(
            url.into(),
            StaticResponse::Error(error.code(), error.message().to_string()),
        );
        self
    }

    /// Returns the URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl FeedSource for StaticFeedSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let result = match self.responses.get(url) {
            Some(StaticResponse::Body(body)) => Ok(body.clone()),
            Some(StaticResponse::Error(code, message)) => {
                Err(ProviderError::new(*code, message.clone()).with_backend(self.name()))
            }
            None => Err(ProviderError::not_found(url).with_backend(self.name())),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_feeds() {
        let source = StaticFeedSource::new().with_feed("https://example.com/a.ics", "BEGIN:VCALENDAR");

        let body = source.fetch("https://example.com/a.ics").await.unwrap();
        assert_eq!(body, b"BEGIN:VCALENDAR");
        assert_eq!(source.requests(), vec!["https://example.com/a.ics"]);
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let source = StaticFeedSource::new();
        let err = source.fetch("https://example.com/missing.ics").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert_eq!(err.backend(), Some("static"));
    }

    #[tokio::test]
    async fn configured_errors_are_returned() {
        let source = StaticFeedSource::new()
            .with_error("https://example.com/b.ics", ProviderError::server("502 Bad Gateway"));

        let err = source.fetch("https://example.com/b.ics").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.message(), "502 Bad Gateway");
    }
}
