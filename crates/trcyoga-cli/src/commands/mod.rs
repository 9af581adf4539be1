//! Subcommand implementations and collaborator wiring.

pub mod config;
pub mod plan;
pub mod run;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use trcyoga_core::IcalendarCodec;
use trcyoga_pipeline::Pipeline;
use trcyoga_providers::{FsObjectStore, HttpFeedSource, ObjectStore};

use crate::config::{AppConfig, StoreKind, StoreSettings};
use crate::error::{ClientError, ClientResult};

/// Builds a pipeline wired to the configured store, HTTP feeds and the
/// iCalendar codec.
pub async fn build_pipeline(config: &AppConfig) -> ClientResult<Pipeline> {
    let store = build_store(&config.store).await?;
    let feeds = HttpFeedSource::new(config.feed.to_feed_config())?;

    Ok(Pipeline::new(
        config.pipeline.clone(),
        store,
        Arc::new(feeds),
        Arc::new(IcalendarCodec::new()),
    ))
}

/// Creates the configured object store.
pub async fn build_store(settings: &StoreSettings) -> ClientResult<Arc<dyn ObjectStore>> {
    match settings.kind {
        StoreKind::Fs => {
            let root = settings.resolved_dir();
            debug!(root = %root.display(), "Using filesystem store");
            Ok(Arc::new(FsObjectStore::new(root)))
        }
        StoreKind::S3 => s3_store(settings).await,
    }
}

#[cfg(feature = "s3")]
async fn s3_store(settings: &StoreSettings) -> ClientResult<Arc<dyn ObjectStore>> {
    let bucket = settings
        .bucket
        .clone()
        .ok_or_else(|| ClientError::Config("no S3 bucket configured".to_string()))?;
    let store =
        trcyoga_providers::S3ObjectStore::from_env(bucket, settings.region.clone()).await;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "s3"))]
async fn s3_store(_settings: &StoreSettings) -> ClientResult<Arc<dyn ObjectStore>> {
    Err(ClientError::Config(
        "this build does not include S3 support (enable the `s3` feature)".to_string(),
    ))
}

/// Awaits `future`, failing with [`ClientError::Timeout`] once `deadline`
/// has passed.
pub async fn with_deadline<F>(deadline: Option<Duration>, future: F) -> ClientResult<F::Output>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
            ClientError::Timeout(format!("run did not finish within {}s", limit.as_secs()))
        }),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_expiry_is_timeout() {
        let result = with_deadline(
            Some(Duration::from_millis(10)),
            std::future::pending::<()>(),
        )
        .await;
        assert!(matches!(result, Err(ClientError::Timeout(_))));
    }

    #[tokio::test]
    async fn no_deadline_waits_for_completion() {
        let result = with_deadline(None, async { 42 }).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn fs_store_is_rooted_at_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StoreSettings {
            dir: Some(dir.path().to_path_buf()),
            ..StoreSettings::default()
        };

        let store = build_store(&settings).await.unwrap();
        assert_eq!(store.name(), "fs");
        store.put("calendars/A.ical", b"x".to_vec()).await.unwrap();
        assert!(dir.path().join("calendars/A.ical").exists());
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn s3_store_requires_feature() {
        let settings = StoreSettings {
            kind: StoreKind::S3,
            bucket: Some("trc-yoga".to_string()),
            ..StoreSettings::default()
        };
        assert!(matches!(
            build_store(&settings).await,
            Err(ClientError::Config(_))
        ));
    }
}
