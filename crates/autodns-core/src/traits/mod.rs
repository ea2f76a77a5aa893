//! Core traits for AutoDNS
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`MappingSource`]: Where the current run learns each network's address
//! - [`CacheStore`]: Persistence of the previous run's addresses
//! - [`DnsRemap`]: Repoint provider records from an old value to a new one

pub mod cache_store;
pub mod dns_remap;
pub mod mapping_source;

pub use cache_store::{Cache, CacheEntry, CacheStore, Upsert};
pub use dns_remap::{DnsRemap, RemapSummary};
pub use mapping_source::{MappingRecord, MappingSource, NetworkMapping};
