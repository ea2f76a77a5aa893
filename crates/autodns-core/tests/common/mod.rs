//! Test doubles and common utilities for contract tests
//!
//! This module provides a recording remap port and small builders for
//! caches and mappings.

#![allow(dead_code)]

use autodns_core::error::{Error, Result};
use autodns_core::traits::{
    Cache, CacheEntry, DnsRemap, MappingRecord, NetworkMapping, RemapSummary,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A DnsRemap that records every call and fails for chosen old values
#[derive(Clone, Default)]
pub struct RecordingRemapper {
    /// Every `(old, new)` pair passed to remap(), in call order
    calls: Arc<Mutex<Vec<(String, String)>>>,
    /// Old values for which remap() returns an error
    failing: Arc<Mutex<HashSet<String>>>,
    /// Old values for which remap() reports zero matching records
    unmatched: Arc<Mutex<HashSet<String>>>,
}

impl RecordingRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make remap() fail whenever it is asked to move `old_value`
    pub fn fail_on(&self, old_value: &str) {
        self.failing.lock().unwrap().insert(old_value.to_string());
    }

    /// Stop failing for `old_value`
    pub fn recover(&self, old_value: &str) {
        self.failing.lock().unwrap().remove(old_value);
    }

    /// Make remap() find no records for `old_value`
    pub fn no_records_for(&self, old_value: &str) {
        self.unmatched.lock().unwrap().insert(old_value.to_string());
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Forget recorded calls
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl DnsRemap for RecordingRemapper {
    async fn remap(&self, old_value: &str, new_value: &str) -> Result<RemapSummary> {
        self.calls
            .lock()
            .unwrap()
            .push((old_value.to_string(), new_value.to_string()));

        if self.failing.lock().unwrap().contains(old_value) {
            return Err(Error::provider(
                "recording",
                format!("edit of record holding {} rejected", old_value),
            ));
        }
        if self.unmatched.lock().unwrap().contains(old_value) {
            return Ok(RemapSummary::nothing_matched());
        }

        Ok(RemapSummary::updated(vec![format!("{}.example.com", new_value.replace('.', "-"))]))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Build a cache from `(display name, network name, last address)` triples
pub fn cache_of(entries: &[(&str, &str, &str)]) -> Cache {
    Cache::from_entries(
        entries
            .iter()
            .map(|(name, network, address)| CacheEntry::new(*name, *network, *address))
            .collect(),
    )
    .expect("test cache has unique network names")
}

/// Build a mapping from `(network name, address)` pairs
pub fn mapping_of(pairs: &[(&str, &str)]) -> NetworkMapping {
    NetworkMapping::from_records(
        pairs
            .iter()
            .map(|(network, address)| MappingRecord::new(*network, *address)),
    )
}

/// Pair of owned strings, for comparing against recorded calls
pub fn call(old: &str, new: &str) -> (String, String) {
    (old.to_string(), new.to_string())
}
