// # Cache Store Trait
//
// Defines the interface for persisting what each tracked network's address
// was at the end of the previous run.
//
// ## Purpose
//
// The cache is what makes a run idempotent: an entry whose cached address
// matches the current one is skipped, so running twice against an unchanged
// mapping issues no provider calls on the second run.
//
// ## Implementations
//
// - File-based: JSON list of `{name, network_name, address}` objects
// - Memory: for tests and embedding
//
// ## Usage
//
// ```rust,ignore
// use autodns_core::CacheStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* CacheStore implementation */;
//
//     let mut cache = store.load().await?;
//     // ... reconcile ...
//     store.save(&cache).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One tracked network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// User-facing label, defaults to the network name
    #[serde(rename = "name")]
    pub display_name: String,

    /// Key into the current run's [`crate::NetworkMapping`]
    pub network_name: String,

    /// Address recorded at the end of the last successful run
    ///
    /// Empty means "never recorded". Files written before this field
    /// existed load as empty.
    #[serde(rename = "address", default)]
    pub last_address: String,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(
        display_name: impl Into<String>,
        network_name: impl Into<String>,
        last_address: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            network_name: network_name.into(),
            last_address: last_address.into(),
        }
    }

    /// Whether an address was ever recorded for this entry
    pub fn has_address(&self) -> bool {
        !self.last_address.is_empty()
    }
}

/// What [`Cache::upsert`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new entry was appended
    Inserted,
    /// The existing entry for the network was updated in place
    Updated,
}

/// Ordered collection of [`CacheEntry`], at most one per network name
///
/// Order is insertion order. It has no meaning for reconciliation but is
/// kept across save/load so the file stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CacheEntry>", into = "Vec<CacheEntry>")]
pub struct Cache {
    entries: Vec<CacheEntry>,
}

impl Cache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from entries, rejecting duplicate network names
    pub fn from_entries(entries: Vec<CacheEntry>) -> Result<Self, String> {
        for (index, entry) in entries.iter().enumerate() {
            if entries[..index]
                .iter()
                .any(|earlier| earlier.network_name == entry.network_name)
            {
                return Err(format!(
                    "duplicate network_name '{}' in cache",
                    entry.network_name
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Entries in cache order
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Mutable entries in cache order
    ///
    /// Hands out a slice so entries can change but cannot be added or
    /// removed, which keeps network names unique.
    pub fn entries_mut(&mut self) -> &mut [CacheEntry] {
        &mut self.entries
    }

    /// Look up the entry for `network_name`
    pub fn find(&self, network_name: &str) -> Option<&CacheEntry> {
        self.entries
            .iter()
            .find(|entry| entry.network_name == network_name)
    }

    /// Insert or update the entry for `network_name`
    ///
    /// An existing entry keeps its position and has its display name and
    /// address overwritten. Otherwise a new entry is appended.
    pub fn upsert(
        &mut self,
        display_name: impl Into<String>,
        network_name: &str,
        address: impl Into<String>,
    ) -> Upsert {
        let display_name = display_name.into();
        let address = address.into();

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.network_name == network_name)
        {
            Some(entry) => {
                entry.display_name = display_name;
                entry.last_address = address;
                Upsert::Updated
            }
            None => {
                self.entries
                    .push(CacheEntry::new(display_name, network_name, address));
                Upsert::Inserted
            }
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<CacheEntry>> for Cache {
    type Error = String;

    fn try_from(entries: Vec<CacheEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Cache> for Vec<CacheEntry> {
    fn from(cache: Cache) -> Self {
        cache.entries
    }
}

/// Trait for cache store implementations
///
/// # Load Policy
///
/// - Persisted cache absent or unreadable: return an **empty** cache. A cold
///   start is a normal first run, not a failure.
/// - Persisted cache present but malformed: return
///   [`crate::Error::CacheCorrupt`]. Callers must stop rather than guess.
///
/// # Save Policy
///
/// `save` overwrites the destination with the full cache. Callers save even
/// when nothing was remapped, because first-seen addresses may have been
/// recorded.
///
/// # Round Trip
///
/// For any cache `c`, saving `c` and loading it back yields `c`
/// field-for-field, in the same order.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the cache persisted by the previous run
    async fn load(&self) -> Result<Cache, crate::Error>;

    /// Persist the cache, replacing what was there
    async fn save(&self, cache: &Cache) -> Result<(), crate::Error>;

    /// Human-readable description of the store (for logging)
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_appends_then_updates() {
        let mut cache = Cache::new();

        assert_eq!(cache.upsert("Home", "home", "1.1.1.1"), Upsert::Inserted);
        assert_eq!(cache.upsert("Office", "office", "2.2.2.2"), Upsert::Inserted);
        assert_eq!(cache.upsert("My Home", "home", "1.1.1.9"), Upsert::Updated);

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.entries()[0],
            CacheEntry::new("My Home", "home", "1.1.1.9")
        );
        assert_eq!(cache.entries()[1].network_name, "office");
    }

    #[test]
    fn test_duplicate_network_rejected() {
        let result = Cache::from_entries(vec![
            CacheEntry::new("A", "home", "1.1.1.1"),
            CacheEntry::new("B", "home", "2.2.2.2"),
        ]);

        let err = result.unwrap_err();
        assert!(err.contains("home"));
    }

    #[test]
    fn test_missing_address_loads_empty() {
        let cache: Cache =
            serde_json::from_str(r#"[{"name": "Home", "network_name": "home"}]"#).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(!cache.entries()[0].has_address());
    }

    #[test]
    fn test_serialized_field_names() {
        let cache =
            Cache::from_entries(vec![CacheEntry::new("Home", "home", "1.2.3.4")]).unwrap();

        let value = serde_json::to_value(&cache).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"name": "Home", "network_name": "home", "address": "1.2.3.4"}])
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let result: Result<Cache, _> = serde_json::from_str(
            r#"[{"name": "A", "network_name": "home", "address": ""},
                {"name": "B", "network_name": "home", "address": ""}]"#,
        );
        assert!(result.is_err());
    }
}
