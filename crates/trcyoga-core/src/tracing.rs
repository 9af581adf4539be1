//! Log subscriber setup.
//!
//! A run logs one line per location fetched and one per calendar written.
//! `RUST_LOG` wins over the configured level; a directive set with
//! [`TracingConfig::with_directive`] wins over both.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer as _};

/// Target prefix shared by every crate in the workspace.
const TARGET: &str = "trcyoga";

/// Subscriber installation failures.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A filter directive does not parse.
    #[error("invalid log filter {directive:?}: {source}")]
    Filter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// Another subscriber was installed first.
    #[error("log subscriber already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One short line per event, for terminals.
    #[default]
    Compact,
    /// One JSON object per event, for log collectors.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for trcyoga targets.
    pub level: Level,
    pub output_format: TracingOutputFormat,
    /// Print the file and line of each event.
    pub source_locations: bool,
    /// Log span durations when spans close.
    pub timed_spans: bool,
    /// Full filter directive replacing the level and `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl TracingConfig {
    /// Compact output at `level`.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            output_format: TracingOutputFormat::Compact,
            source_locations: false,
            timed_spans: false,
            directive: None,
        }
    }

    /// Debug level with source locations, for `--debug`.
    pub fn debug() -> Self {
        Self {
            source_locations: true,
            ..Self::new(Level::DEBUG)
        }
    }

    /// JSON output with span timings, for scheduled runs.
    pub fn scheduled() -> Self {
        Self {
            output_format: TracingOutputFormat::Json,
            timed_spans: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Directive used when neither `RUST_LOG` nor a custom directive is set.
    pub fn default_directive(&self) -> String {
        format!("{}={}", TARGET, self.level.as_str().to_ascii_lowercase())
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return parse_filter(directive);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => parse_filter(&self.default_directive()),
        }
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TracingError> {
    EnvFilter::try_new(directive).map_err(|source| TracingError::Filter {
        directive: directive.to_string(),
        source,
    })
}

/// Installs the global subscriber. Call once per process.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let spans = if config.timed_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let output = tracing_subscriber::fmt::layer()
        .with_file(config.source_locations)
        .with_line_number(config.source_locations)
        .with_span_events(spans);

    match config.output_format {
        TracingOutputFormat::Compact => tracing_subscriber::registry()
            .with(output.compact().with_filter(filter))
            .try_init()?,
        TracingOutputFormat::Json => tracing_subscriber::registry()
            .with(output.json().with_filter(filter))
            .try_init()?,
    }

    Ok(())
}
