//! Run-level orchestration
//!
//! The [`AutoDnsEngine`] wires a [`MappingSource`] and a [`CacheStore`]
//! around the reconciler and owns the order of one process run:
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐
//! │ CacheStore  │   │ MappingSource │
//! │ (load)      │   │ (load)        │
//! └──────┬──────┘   └───────┬───────┘
//!        │                  │
//!        ▼                  ▼
//!      ┌──────────────────────┐      ┌────────────┐
//!      │ reconcile / add      │─────▶│ DnsRemap   │
//!      └──────────┬───────────┘      └────────────┘
//!                 │
//!                 ▼
//!        ┌─────────────┐
//!        │ CacheStore  │
//!        │ (save)      │
//!        └─────────────┘
//! ```
//!
//! ## Failure Points
//!
//! 1. Cache corrupt → stop, nothing saved
//! 2. Mapping unavailable → stop, nothing saved
//! 3. Per-entry failures → collected in the report, cache still saved

use crate::error::Result;
use crate::reconciler::{self, ReconcileReport};
use crate::traits::{CacheStore, DnsRemap, MappingSource, NetworkMapping, Upsert};
use tracing::info;

/// Orchestrates one AutoDNS run
///
/// The engine owns its stores. The DNS remap port is passed per call so
/// the `add` maintenance path never needs provider credentials.
pub struct AutoDnsEngine {
    /// Where the previous run's addresses are kept
    cache_store: Box<dyn CacheStore>,

    /// Where this run's addresses come from
    mapping_source: Box<dyn MappingSource>,
}

impl AutoDnsEngine {
    /// Create a new engine
    pub fn new(cache_store: Box<dyn CacheStore>, mapping_source: Box<dyn MappingSource>) -> Self {
        Self {
            cache_store,
            mapping_source,
        }
    }

    /// Reconcile every cached network and persist the result
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: the run completed and the cache was saved.
    ///   The report may still contain per-entry failures; use
    ///   [`ReconcileReport::into_result`] to turn them into an error.
    /// - `Err(Error)`: the cache or mapping could not be loaded, or the cache
    ///   could not be saved.
    pub async fn run(&self, remapper: &dyn DnsRemap) -> Result<ReconcileReport> {
        let (mut cache, mapping) = self.load().await?;

        let report = reconciler::reconcile(&mut cache, &mapping, remapper).await;

        self.cache_store.save(&cache).await?;
        Ok(report)
    }

    /// Pin a network into the cache against its current address
    ///
    /// Nothing is saved when the network is not in the mapping.
    pub async fn add(&self, network_name: &str, display_name: Option<&str>) -> Result<Upsert> {
        let (mut cache, mapping) = self.load().await?;

        let upsert = reconciler::add_mapping(&mut cache, &mapping, network_name, display_name)?;

        self.cache_store.save(&cache).await?;
        Ok(upsert)
    }

    /// Load the previous cache, then the current mapping
    async fn load(&self) -> Result<(crate::traits::Cache, NetworkMapping)> {
        let cache = self.cache_store.load().await?;
        info!(
            "Loaded {} cache entr{} from {}",
            cache.len(),
            if cache.len() == 1 { "y" } else { "ies" },
            self.cache_store.describe()
        );

        let mapping = self.mapping_source.load().await?;
        info!("Reading IP address map from {}:", self.mapping_source.describe());
        for (network_name, address) in mapping.iter() {
            info!("  {} = {}", network_name, address);
        }

        Ok((cache, mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::error::Error;
    use crate::mapping::StaticMappingSource;
    use crate::traits::{Cache, CacheEntry, RemapSummary};
    use async_trait::async_trait;

    struct NoopRemapper;

    #[async_trait]
    impl DnsRemap for NoopRemapper {
        async fn remap(&self, _old: &str, _new: &str) -> Result<RemapSummary> {
            Ok(RemapSummary::nothing_matched())
        }

        fn provider_name(&self) -> &'static str {
            "noop"
        }
    }

    #[tokio::test]
    async fn test_run_saves_first_seen_addresses() {
        let store = MemoryCacheStore::with_cache(
            Cache::from_entries(vec![CacheEntry::new("Home", "home", "")]).unwrap(),
        );
        let engine = AutoDnsEngine::new(
            Box::new(store.clone()),
            Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
        );

        let report = engine.run(&NoopRemapper).await.unwrap();

        assert_eq!(report.first_seen_count(), 1);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot().await.entries()[0].last_address, "1.2.3.4");
    }

    #[tokio::test]
    async fn test_add_unknown_network_does_not_save() {
        let store = MemoryCacheStore::new();
        let engine = AutoDnsEngine::new(
            Box::new(store.clone()),
            Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
        );

        let err = engine.add("office", None).await.unwrap_err();

        assert!(matches!(err, Error::NetworkNotObserved { .. }));
        assert_eq!(store.save_count(), 0);
    }
}
