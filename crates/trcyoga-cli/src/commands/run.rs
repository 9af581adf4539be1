//! The `run` command.

use std::time::Duration;

use tracing::info;
use trcyoga_pipeline::RunSummary;

use super::{build_pipeline, with_deadline};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

/// Runs the pipeline once and prints a summary.
pub async fn run(config: &AppConfig, deadline: Option<Duration>, json: bool) -> ClientResult<()> {
    let summary = execute(config, deadline).await?;
    println!("{}", render(&summary, json)?);
    Ok(())
}

/// Runs the pipeline once.
///
/// The deadline covers the whole run, including store setup.
pub async fn execute(config: &AppConfig, deadline: Option<Duration>) -> ClientResult<RunSummary> {
    config.validate()?;

    let summary = with_deadline(deadline, async {
        let pipeline = build_pipeline(config).await?;
        pipeline.run().await.map_err(ClientError::from)
    })
    .await??;

    info!(calendars = summary.calendars_written, "Calendars updated");
    Ok(summary)
}

fn render(summary: &RunSummary, json: bool) -> ClientResult<String> {
    if json {
        return serde_json::to_string_pretty(summary)
            .map_err(|e| ClientError::Config(format!("failed to serialize summary: {}", e)));
    }

    let mut out = format!(
        "Wrote {} calendars from {} locations ({} events) in {}ms",
        summary.calendars_written,
        summary.locations,
        summary.events,
        summary.duration().num_milliseconds()
    );
    for key in &summary.keys {
        out.push_str("\n  ");
        out.push_str(key);
    }
    Ok(out)
}
