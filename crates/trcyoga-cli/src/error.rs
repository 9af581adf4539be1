//! Client error types.

use std::fmt;

use trcyoga_pipeline::PipelineError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// A collaborator could not be created.
    Provider(String),
    /// The run failed.
    Pipeline(PipelineError),
    /// The run did not finish before the deadline.
    Timeout(String),
    /// Logging could not be initialized.
    Tracing(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Pipeline(err) => write!(f, "run failed: {}", err),
            Self::Timeout(msg) => write!(f, "timeout: {}", msg),
            Self::Tracing(msg) => write!(f, "logging error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PipelineError> for ClientError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<trcyoga_providers::ProviderError> for ClientError {
    fn from(err: trcyoga_providers::ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl From<trcyoga_core::TracingError> for ClientError {
    fn from(err: trcyoga_core::TracingError) -> Self {
        Self::Tracing(err.to_string())
    }
}
