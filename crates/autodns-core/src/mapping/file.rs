// # File Mapping Source
//
// Reads the current network mapping from a JSON file produced by whatever
// observes the networks (a router script, a cron job, ...).
//
// ## File Format
//
// ```json
// [
//   { "network_name": "home", "address": "1.2.3.4" },
//   { "network_name": "office", "address": "5.6.7.8" }
// ]
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::traits::mapping_source::{MappingRecord, MappingSource, NetworkMapping};

/// Mapping source backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileMappingSource {
    path: PathBuf,
}

impl FileMappingSource {
    /// Create a source for the mapping file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the mapping file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MappingSource for FileMappingSource {
    async fn load(&self) -> Result<NetworkMapping, Error> {
        let location = self.path.display().to_string();

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::source_unavailable(&location, e.to_string()))?;

        let records: Vec<MappingRecord> = serde_json::from_str(&content)
            .map_err(|e| Error::source_unavailable(&location, format!("invalid mapping: {}", e)))?;

        tracing::debug!("Read {} mapping record(s) from {}", records.len(), location);
        Ok(NetworkMapping::from_records(records))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
