//! Feed sources and object stores.
//!
//! The aggregation pipeline reaches the outside world through two traits:
//!
//! - [`FeedSource`] - fetches a location's calendar feed by URL
//! - [`ObjectStore`] - reads the location metadata and writes output calendars
//!
//! Production implementations are [`HttpFeedSource`] and the
//! [`FsObjectStore`] / `S3ObjectStore` stores. [`StaticFeedSource`] and
//! [`MemoryObjectStore`] are in-memory doubles for tests.

pub mod error;
pub mod feed;
#[cfg(feature = "http")]
pub mod http;
pub mod store;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use feed::{BoxFuture, FeedSource, StaticFeedSource};
#[cfg(feature = "http")]
pub use http::{FeedConfig, HttpFeedSource};
#[cfg(feature = "s3")]
pub use store::S3ObjectStore;
pub use store::{FsObjectStore, MemoryObjectStore, ObjectStore};
