//! The `plan` command.

use std::time::Duration;

use super::{build_pipeline, with_deadline};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

/// Prints every key a run would write, one per line.
pub async fn plan(config: &AppConfig, deadline: Option<Duration>, json: bool) -> ClientResult<()> {
    let keys = keys(config, deadline).await?;

    if json {
        let out = serde_json::to_string_pretty(&keys)
            .map_err(|e| ClientError::Config(format!("failed to serialize keys: {}", e)))?;
        println!("{}", out);
    } else {
        for key in &keys {
            println!("{}", key);
        }
    }
    Ok(())
}

/// Loads the locations and lists the output keys without fetching feeds.
pub async fn keys(config: &AppConfig, deadline: Option<Duration>) -> ClientResult<Vec<String>> {
    config.validate()?;
    with_deadline(deadline, async {
        let pipeline = build_pipeline(config).await?;
        pipeline.plan().await.map_err(ClientError::from)
    })
    .await?
}
