//! Configuration commands.

use std::path::Path;

use crate::config::{AppConfig, StoreKind};
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &AppConfig, source: Option<&Path>) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    let path = source.map_or_else(AppConfig::default_path, Path::to_path_buf);
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &AppConfig) -> ClientResult<()> {
    config.validate()?;

    match config.store.kind {
        StoreKind::Fs => println!("Store: directory {}", config.store.resolved_dir().display()),
        StoreKind::S3 => println!(
            "Store: s3://{}",
            config.store.bucket.as_deref().unwrap_or_default()
        ),
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(source: Option<&Path>) -> ClientResult<()> {
    let config_path = source.map_or_else(AppConfig::default_path, Path::to_path_buf);
    println!("config: {}", config_path.display());
    Ok(())
}
