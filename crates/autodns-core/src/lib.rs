// # autodns-core
//
// Core library for AutoDNS.
//
// ## Architecture Overview
//
// AutoDNS keeps DNS records pointed at the current address of one or more
// named networks. Each run compares freshly observed addresses against the
// cache written by the previous run and repoints records only for networks
// that moved.
//
// - **MappingSource**: Trait for loading this run's network → address mapping
// - **CacheStore**: Trait for persisting the previous run's addresses
// - **DnsRemap**: Trait for repointing provider records from an old value to a new one
// - **reconcile**: The change-detection pass over the cache
// - **AutoDnsEngine**: Wires the stores around the reconciler for one run
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider adapters
// 2. **Explicit Dependencies**: The remap port is passed in, never looked up
// 3. **At-Least-Once Remaps**: The cache only records confirmed transitions
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use cache::{FileCacheStore, MemoryCacheStore};
pub use config::{AutoDnsConfig, ProviderConfig};
pub use engine::AutoDnsEngine;
pub use error::{Error, Result};
pub use mapping::{FileMappingSource, StaticMappingSource};
pub use reconciler::{EntryOutcome, ReconcileReport, add_mapping, reconcile};
pub use traits::{
    Cache, CacheEntry, CacheStore, DnsRemap, MappingRecord, MappingSource, NetworkMapping,
    RemapSummary, Upsert,
};
