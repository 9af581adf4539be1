//! Aggregation pipeline.
//!
//! A run has four phases, each depending on the previous one succeeding:
//!
//! 1. load the location list from the object store
//! 2. fetch, normalize, parse, filter and enrich each location's feed
//! 3. enumerate every non-empty subset of location short names
//! 4. merge and write one calendar per subset
//!
//! The first error aborts the run. Outputs written before the failure are
//! left in place.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use trcyoga_core::IcalendarCodec;
//! use trcyoga_pipeline::{Pipeline, PipelineConfig};
//! use trcyoga_providers::{FsObjectStore, StaticFeedSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     PipelineConfig::default(),
//!     Arc::new(FsObjectStore::new("/srv/trcyoga")),
//!     Arc::new(StaticFeedSource::new()),
//!     Arc::new(IcalendarCodec::new()),
//! );
//! let summary = pipeline.run().await?;
//! println!("wrote {} calendars", summary.calendars_written);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod pipeline;

pub use config::{DEFAULT_CALENDAR_FOLDER, DEFAULT_LOCATIONS_KEY, PipelineConfig};
pub use error::{ConfigLoadError, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, RunSummary};
