// # Memory Cache Store
//
// In-memory implementation of CacheStore.
//
// ## Purpose
//
// Keeps the cache in process memory. Nothing survives a restart, so every
// network looks first-seen on the next process start.
//
// ## When to Use
//
// - Testing environments
// - Embedding the reconciler in a longer-lived process

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::cache_store::{Cache, CacheStore};

/// In-memory cache store implementation
///
/// Clones share the same underlying cache.
///
/// # Example
///
/// ```rust,no_run
/// use autodns_core::cache::MemoryCacheStore;
/// use autodns_core::traits::CacheStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryCacheStore::new();
///
///     let mut cache = store.load().await?;
///     cache.upsert("Home", "home", "1.2.3.4");
///     store.save(&cache).await?;
///
///     assert_eq!(store.snapshot().await.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    inner: Arc<RwLock<Cache>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryCacheStore {
    /// Create a new empty memory cache store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `cache`
    pub fn with_cache(cache: Cache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Copy of the currently stored cache
    pub async fn snapshot(&self) -> Cache {
        self.inner.read().await.clone()
    }

    /// Number of times [`CacheStore::save`] was called
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self) -> Result<Cache, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, cache: &Cache) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        *guard = cache.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
