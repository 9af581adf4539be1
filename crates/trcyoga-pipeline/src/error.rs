//! Pipeline error types.

use thiserror::Error;
use trcyoga_core::{CodecError, LocationError};
use trcyoga_providers::ProviderError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Why the location list could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The store could not return the object.
    #[error(transparent)]
    Store(#[from] ProviderError),

    /// The object is not a valid location list.
    #[error(transparent)]
    Invalid(#[from] LocationError),
}

/// Errors that abort a run.
///
/// Each variant names the location or output key that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The location list is unreachable or malformed.
    #[error("failed to load locations from {key}: {source}")]
    ConfigLoad {
        key: String,
        #[source]
        source: ConfigLoadError,
    },

    /// A location's feed could not be fetched.
    #[error("failed to fetch feed for {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: ProviderError,
    },

    /// A location's feed is not valid calendar text.
    #[error("failed to parse feed for {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: CodecError,
    },

    /// A merged calendar could not be serialized.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: CodecError,
    },

    /// An output calendar could not be written.
    #[error("failed to write {key}: {source}")]
    Persist {
        key: String,
        #[source]
        source: ProviderError,
    },

    /// Invalid pipeline settings.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the location short name this error concerns, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Fetch { location, .. } | Self::Parse { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Returns the object key this error concerns, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ConfigLoad { key, .. } | Self::Serialize { key, .. } | Self::Persist { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}
