//! Errors raised by feed sources and object stores.

use std::fmt;
use std::io;

use thiserror::Error;

/// What kind of failure a backend hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Connection, DNS, timeout or body read failure.
    NetworkError,
    /// 401/403, or a permission error from a store.
    AuthorizationFailed,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerError,
    /// Any other non-success status.
    InvalidResponse,
    /// 404, or no object at a key.
    NotFound,
    /// A store read or write failed.
    StorageError,
    /// The backend could not be set up.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Classifies a non-success HTTP status.
    pub fn for_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthorizationFailed,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::InvalidResponse,
        }
    }

    /// Transient failures. Reported in logs only; runs are never retried
    /// internally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::AuthorizationFailed => "authorization_failed",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::StorageError => "storage_error",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl From<io::ErrorKind> for ProviderErrorCode {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::AuthorizationFailed,
            _ => Self::StorageError,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch, read or write.
///
/// Displays as `[backend] code: message`.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    backend: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

macro_rules! constructors {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            #[doc = concat!("Creates a `", stringify!($code), "` error.")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ProviderErrorCode::$code, message)
            }
        )*
    };
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            source: None,
        }
    }

    constructors! {
        network => NetworkError,
        authorization => AuthorizationFailed,
        rate_limited => RateLimited,
        server => ServerError,
        invalid_response => InvalidResponse,
        not_found => NotFound,
        storage => StorageError,
        configuration => ConfigurationError,
    }

    /// Wraps an I/O error, prefixing the message with the path it concerns.
    pub fn io(context: impl fmt::Display, err: io::Error) -> Self {
        Self::new(err.kind().into(), format!("{}: {}", context, err)).with_source(err)
    }

    /// Tags the error with the backend that raised it ("http", "fs", ...).
    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl From<io::Error> for ProviderError {
    fn from(err: io::Error) -> Self {
        Self::new(err.kind().into(), err.to_string()).with_source(err)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backend {
            Some(ref backend) => write!(f, "[{}] {}: {}", backend, self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
