//! CLI, configuration file, collaborator wiring
//!
//! This crate provides the `trcyoga` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::AppConfig;
pub use error::{ClientError, ClientResult};
