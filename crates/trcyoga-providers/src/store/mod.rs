//! ObjectStore trait definition and backends.
//!
//! The pipeline reads one object (the location metadata) and writes one
//! object per merged calendar. Keys are `/`-separated paths such as
//! `calendars/A_B.ical`.

mod fs;
mod memory;
#[cfg(feature = "s3")]
mod s3;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

use crate::error::ProviderResult;
use crate::feed::BoxFuture;

/// Reads and writes whole objects by key.
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store (e.g. "fs", "s3").
    fn name(&self) -> &str;

    /// Reads the object at `key`.
    ///
    /// # Errors
    ///
    /// A missing object is a `not_found` error.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>>;

    /// Writes `data` to `key`, replacing any existing object.
    fn put<'a>(&'a self, key: &'a str, data: Vec<u8>) -> BoxFuture<'a, ProviderResult<()>>;
}
