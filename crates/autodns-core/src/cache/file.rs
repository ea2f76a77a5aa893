// # File Cache Store
//
// File-based implementation of CacheStore.
//
// ## Purpose
//
// Persists each tracked network's last address between runs so the next run
// can tell which networks moved.
//
// ## Load Policy
//
// - Missing file: cold start, empty cache
// - Unreadable file (permissions, not a regular file): logged, empty cache
// - Malformed content, invalid UTF-8 included: `CacheCorrupt`, no guessing
//
// ## Crash Safety
//
// - Atomic writes: Uses write-then-rename
// - Backup: The previous file is kept as `.backup` for manual recovery
//
// ## File Format
//
// ```json
// [
//   {
//     "name": "Home",
//     "network_name": "home",
//     "address": "1.2.3.4"
//   }
// ]
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::cache_store::{Cache, CacheStore};

/// File-based cache store
///
/// # Example
///
/// ```rust,no_run
/// use autodns_core::cache::FileCacheStore;
/// use autodns_core::traits::CacheStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileCacheStore::new("/var/lib/autodns/cache.json");
///
///     let mut cache = store.load().await?;
///     cache.upsert("Home", "home", "1.2.3.4");
///     store.save(&cache).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Create a store for the cache file at `path`
    ///
    /// Nothing is read or written until [`CacheStore::load`] or
    /// [`CacheStore::save`] is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse cache file content
    fn parse(&self, content: &[u8]) -> Result<Cache, Error> {
        serde_json::from_slice(content).map_err(|e| {
            let backup_path = Self::backup_path(&self.path);
            let hint = if backup_path.exists() {
                format!(" Previous cache kept at {}.", backup_path.display())
            } else {
                String::new()
            };
            Error::cache_corrupt(self.path.display().to_string(), format!("{}.{}", e, hint))
        })
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(&self) -> Result<Cache, Error> {
        if !self.path.exists() {
            tracing::info!(
                "Cache file {} does not exist, starting with an empty cache",
                self.path.display()
            );
            return Ok(Cache::new());
        }

        // Raw bytes, so bad encoding surfaces as a parse failure
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Failed to read cache file {}: {}. Starting with an empty cache.",
                    self.path.display(),
                    e
                );
                return Ok(Cache::new());
            }
        };

        let cache = self.parse(&content)?;
        tracing::debug!(
            "Loaded cache from {}: {} entries",
            self.path.display(),
            cache.len()
        );
        Ok(cache)
    }

    async fn save(&self, cache: &Cache) -> Result<(), Error> {
        tracing::info!("Writing cache to {}", self.path.display());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(cache)?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::Other(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::Other(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::Other(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep the file being replaced
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create cache backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::Other(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Cache written to file: {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::cache_store::CacheEntry;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_cold_start() {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("cache.json"));

        let cache = store.load().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_cold_start() {
        let dir = tempdir().unwrap();
        // A directory exists at the path but cannot be read as a file
        let path = dir.path().join("cache.json");
        fs::create_dir(&path).await.unwrap();

        let store = FileCacheStore::new(&path);
        let cache = store.load().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"corrupted json data").await.unwrap();

        let store = FileCacheStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::CacheCorrupt { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut content =
            br#"[{"name": "Home", "network_name": "home", "address": "1.2.3.4"}]"#.to_vec();
        content.insert(10, 0xFF);
        fs::write(&path, &content).await.unwrap();

        let store = FileCacheStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::CacheCorrupt { .. }), "got {err:?}");

        // Left for the operator to repair
        assert_eq!(fs::read(&path).await.unwrap(), content);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, br#"{"version": "1.0"}"#).await.unwrap();

        let store = FileCacheStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(Error::CacheCorrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let store = FileCacheStore::new(&path);

        let mut cache = Cache::new();
        cache.upsert("Home", "home", "1.1.1.1");
        store.save(&cache).await.unwrap();
        assert!(path.exists());

        cache.upsert("Home", "home", "1.1.1.2");
        store.save(&cache).await.unwrap();

        let backup_path = FileCacheStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after rewrite");

        let previous = FileCacheStore::new(&backup_path).load().await.unwrap();
        assert_eq!(previous.entries()[0].last_address, "1.1.1.1");

        let current = store.load().await.unwrap();
        assert_eq!(current.entries()[0].last_address, "1.1.1.2");
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_error_mentions_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let store = FileCacheStore::new(&path);

        let cache =
            Cache::from_entries(vec![CacheEntry::new("Home", "home", "1.1.1.1")]).unwrap();
        store.save(&cache).await.unwrap();
        store.save(&cache).await.unwrap();

        fs::write(&path, b"[{").await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("cache.backup"), "got {err}");
    }
}
