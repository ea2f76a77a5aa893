// # Static Mapping Source
//
// A mapping source with fixed entries, for tests and for callers that
// observe addresses themselves.

use async_trait::async_trait;

use crate::Error;
use crate::traits::mapping_source::{MappingRecord, MappingSource, NetworkMapping};

/// Mapping source that always returns the same records
#[derive(Debug, Clone, Default)]
pub struct StaticMappingSource {
    records: Vec<MappingRecord>,
}

impl StaticMappingSource {
    /// Create a source from records
    pub fn new(records: Vec<MappingRecord>) -> Self {
        Self { records }
    }

    /// Add one `(network name, address)` pair
    pub fn with(mut self, network_name: impl Into<String>, address: impl Into<String>) -> Self {
        self.records.push(MappingRecord::new(network_name, address));
        self
    }
}

#[async_trait]
impl MappingSource for StaticMappingSource {
    async fn load(&self) -> Result<NetworkMapping, Error> {
        Ok(NetworkMapping::from_records(self.records.iter().cloned()))
    }

    fn describe(&self) -> String {
        format!("static ({} records)", self.records.len())
    }
}
