//! In-memory store.

use std::collections::{BTreeMap, HashSet};

use tokio::sync::RwLock;

use super::ObjectStore;
use crate::error::{ProviderError, ProviderResult};
use crate::feed::BoxFuture;

/// Keeps objects in a map. Used by tests and dry runs.
///
/// Writes to keys registered with [`fail_on_put`](Self::fail_on_put) are
/// rejected with a storage error and leave the map untouched.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    failing: HashSet<String>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to seed an object.
    #[must_use]
    pub fn with_object(self, key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let mut objects = self.objects.into_inner();
        objects.insert(key.into(), data.into());
        Self {
            objects: RwLock::new(objects),
            failing: self.failing,
        }
    }

    /// Builder method to make writes to `key` fail.
    #[must_use]
    pub fn fail_on_put(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// Returns all keys in lexicographic order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Returns a copy of the object at `key`.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(async move {
            self.objects.read().await.get(key).cloned().ok_or_else(|| {
                ProviderError::not_found(format!("no object at {}", key)).with_backend("memory")
            })
        })
    }

    fn put<'a>(&'a self, key: &'a str, data: Vec<u8>) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            if self.failing.contains(key) {
                return Err(
                    ProviderError::storage(format!("write to {} rejected", key))
                        .with_backend("memory"),
                );
            }
            self.objects.write().await.insert(key.to_string(), data);
            Ok(())
        })
    }
}
