//! trcyoga CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use trcyoga_cli::cli::{Cli, Command, ConfigAction};
use trcyoga_cli::commands;
use trcyoga_cli::config::AppConfig;
use trcyoga_cli::error::{ClientError, ClientResult};
use trcyoga_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let mut config = match cli.config {
        Some(ref path) => AppConfig::load_from(path).map_err(ClientError::Config)?,
        None => AppConfig::load().map_err(ClientError::Config)?,
    };
    cli.apply_overrides(&mut config);

    // Initialize tracing
    let tracing_config = if cli.debug {
        TracingConfig::debug().with_format(config.logging.to_tracing_config()?.output_format)
    } else {
        config.logging.to_tracing_config()?
    };
    init_tracing(tracing_config)?;

    let deadline = cli.deadline();
    let source = cli.config.as_deref();

    match cli.command {
        None | Some(Command::Run) => commands::run::run(&config, deadline, cli.json).await,
        Some(Command::Plan) => commands::plan::plan(&config, deadline, cli.json).await,
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, source),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(source),
        },
    }
}
