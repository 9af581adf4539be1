//! Local filesystem store.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use super::ObjectStore;
use crate::error::{ProviderError, ProviderResult};
use crate::feed::BoxFuture;

/// Stores objects as files under a root directory.
///
/// The key `calendars/A.ical` maps to `<root>/calendars/A.ical`. Parent
/// directories are created on write.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to a path inside the root.
    ///
    /// Keys must be relative and must not climb out of the root.
    fn resolve(&self, key: &str) -> ProviderResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ProviderError::configuration(format!("invalid object key {:?}", key))
                .with_backend("fs"));
        }
        Ok(self.root.join(relative))
    }

    async fn read(&self, key: &str) -> ProviderResult<Vec<u8>> {
        let path = self.resolve(key)?;
        trace!(path = %path.display(), "Reading object");
        tokio::fs::read(&path)
            .await
            .map_err(|e| ProviderError::io(path.display(), e).with_backend("fs"))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> ProviderResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProviderError::io(parent.display(), e).with_backend("fs"))?;
        }

        let bytes = data.len();
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ProviderError::io(path.display(), e).with_backend("fs"))?;
        debug!(path = %path.display(), bytes, "Wrote object");
        Ok(())
    }
}

impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "fs"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(self.read(key))
    }

    fn put<'a>(&'a self, key: &'a str, data: Vec<u8>) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.write(key, data))
    }
}
