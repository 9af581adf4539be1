//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/trcyoga/config.toml` by default:
//!
//! ```toml
//! [pipeline]
//! locations_key = "locations.json"
//! calendar_folder = "calendars"
//! keyword = "yoga"
//! fetch_concurrency = 1
//!
//! [store]
//! kind = "s3"
//! bucket = "trc-yoga"
//!
//! [feed]
//! timeout = 30
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Command-line flags and their environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;
use trcyoga_core::{TracingConfig, TracingOutputFormat};
use trcyoga_pipeline::PipelineConfig;
use trcyoga_providers::FeedConfig;

use crate::error::{ClientError, ClientResult};

/// Configuration for the trcyoga client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregation settings.
    pub pipeline: PipelineConfig,

    /// Where locations are read and calendars written.
    pub store: StoreSettings,

    /// Feed fetching settings.
    pub feed: FeedSettings,

    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Object store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Local directory.
    #[default]
    Fs,
    /// S3 bucket.
    S3,
}

/// Object store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Backend to use.
    pub kind: StoreKind,

    /// Root directory for the `fs` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Bucket for the `s3` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// AWS region override for the `s3` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl StoreSettings {
    /// Returns the `fs` root, defaulting to the user data directory.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(AppConfig::default_data_dir)
    }
}

/// Feed fetching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Per-request timeout in seconds.
    pub timeout: u64,

    /// User agent override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            timeout: FeedConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl FeedSettings {
    /// Converts to the HTTP feed source configuration.
    pub fn to_feed_config(&self) -> FeedConfig {
        let config = FeedConfig::default().with_timeout(Duration::from_secs(self.timeout));
        match self.user_agent {
            Some(ref agent) => config.with_user_agent(agent),
            None => config,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for trcyoga crates when `RUST_LOG` is unset.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level.
    pub fn level(&self) -> ClientResult<Level> {
        self.level
            .parse()
            .map_err(|_| ClientError::Config(format!("invalid log level {:?}", self.level)))
    }

    /// Builds the tracing configuration.
    pub fn to_tracing_config(&self) -> ClientResult<TracingConfig> {
        let format = match self.format {
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Json => TracingOutputFormat::Json,
        };
        Ok(TracingConfig::new(self.level()?).with_format(format))
    }
}

impl AppConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trcyoga")
    }

    /// Returns the default data directory, used as the `fs` store root.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trcyoga")
    }

    /// Checks every section.
    pub fn validate(&self) -> ClientResult<()> {
        self.pipeline
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        match self.store.kind {
            StoreKind::Fs => {}
            StoreKind::S3 => {
                if self.store.bucket.as_deref().is_none_or(str::is_empty) {
                    return Err(ClientError::Config(
                        "[store] kind = \"s3\" requires a bucket (or BUCKET_NAME)".to_string(),
                    ));
                }
                if !cfg!(feature = "s3") {
                    return Err(ClientError::Config(
                        "this build does not include S3 support (enable the `s3` feature)"
                            .to_string(),
                    ));
                }
            }
        }

        if self.feed.timeout == 0 {
            return Err(ClientError::Config(
                "[feed] timeout must be at least 1 second".to_string(),
            ));
        }

        self.logging.level()?;
        Ok(())
    }
}
