//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LogFormat, StoreKind};

/// trcyoga - Combined yoga calendars for every set of gyms
#[derive(Debug, Parser)]
#[command(name = "trcyoga")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TRCYOGA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log as JSON, one object per line
    #[arg(long)]
    pub json_logs: bool,

    /// Print command output as JSON
    #[arg(long)]
    pub json: bool,

    // --- Store flags ---
    /// Write to this S3 bucket
    #[arg(long, env = "BUCKET_NAME", conflicts_with = "store_dir")]
    pub bucket: Option<String>,

    /// AWS region for the S3 bucket
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Write to this local directory
    #[arg(long, env = "TRCYOGA_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    // --- Pipeline flags ---
    /// Object key of the location list
    #[arg(long, env = "LOCATIONS_DATA_KEY")]
    pub locations_key: Option<String>,

    /// Folder that calendars are written under
    #[arg(long, env = "CALENDAR_FOLDER_KEY")]
    pub calendar_folder: Option<String>,

    /// Keep only events mentioning this keyword
    #[arg(long)]
    pub keyword: Option<String>,

    /// Number of feeds fetched at once
    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// Abort the run after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Applies flag and environment overrides on top of the file config.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref dir) = self.store_dir {
            config.store.kind = StoreKind::Fs;
            config.store.dir = Some(dir.clone());
        }
        if let Some(ref bucket) = self.bucket {
            config.store.kind = StoreKind::S3;
            config.store.bucket = Some(bucket.clone());
        }
        if let Some(ref region) = self.region {
            config.store.region = Some(region.clone());
        }
        if let Some(ref key) = self.locations_key {
            config.pipeline.locations_key = key.clone();
        }
        if let Some(ref folder) = self.calendar_folder {
            config.pipeline.calendar_folder = folder.clone();
        }
        if let Some(ref keyword) = self.keyword {
            config.pipeline.keyword = keyword.clone();
        }
        if let Some(concurrency) = self.fetch_concurrency {
            config.pipeline.fetch_concurrency = concurrency;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.debug {
            config.logging.level = "debug".to_string();
        }
    }

    /// Returns the whole-run deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every feed and write all combined calendars (default)
    Run,

    /// List the calendars a run would write, without fetching feeds
    Plan,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
