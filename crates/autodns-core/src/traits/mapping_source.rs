// # Mapping Source Trait
//
// Defines where the current run learns each network's address.
//
// ## Implementations
//
// - File-based: JSON list of `{network_name, address}` objects
// - Static: fixed entries, for tests and embedding

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `(network name, address)` pair as it appears in a mapping source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Network name, the key cache entries refer to
    pub network_name: String,
    /// Current address on that network (IP literal or hostname, opaque here)
    pub address: String,
}

impl MappingRecord {
    /// Create a new mapping record
    pub fn new(network_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network_name: network_name.into(),
            address: address.into(),
        }
    }
}

/// Network name to current address, fixed for the duration of one run
///
/// Built fresh on every run and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkMapping {
    addresses: HashMap<String, String>,
}

impl NetworkMapping {
    /// Build a mapping from source records
    ///
    /// When a network name appears more than once the last occurrence wins.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MappingRecord>,
    {
        let mut addresses = HashMap::new();
        for record in records {
            if let Some(previous) = addresses.insert(record.network_name.clone(), record.address)
            {
                tracing::debug!(
                    network = %record.network_name,
                    overwritten = %previous,
                    "Duplicate network name in mapping, last entry wins"
                );
            }
        }
        Self { addresses }
    }

    /// Current address of `network_name`, if it was observed this run
    pub fn get(&self, network_name: &str) -> Option<&str> {
        self.addresses.get(network_name).map(String::as_str)
    }

    /// Whether `network_name` was observed this run
    pub fn contains(&self, network_name: &str) -> bool {
        self.addresses.contains_key(network_name)
    }

    /// Number of observed networks
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether no network was observed
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Iterate over `(network name, address)` pairs, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs: Vec<_> = self
            .addresses
            .iter()
            .map(|(name, address)| (name.as_str(), address.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }
}

impl FromIterator<MappingRecord> for NetworkMapping {
    fn from_iter<I: IntoIterator<Item = MappingRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

/// Trait for mapping source implementations
///
/// A mapping source is read once per run. If it cannot be read or parsed,
/// `load` fails with [`crate::Error::SourceUnavailable`] and the caller must
/// not reconcile.
#[async_trait]
pub trait MappingSource: Send + Sync {
    /// Load the current network mapping
    async fn load(&self) -> Result<NetworkMapping, crate::Error>;

    /// Human-readable description of the source (for logging)
    fn describe(&self) -> String;
}
