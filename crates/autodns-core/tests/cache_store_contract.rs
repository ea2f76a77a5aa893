//! Contract Test: Cache Persistence
//!
//! Constraints verified:
//! - load(save(cache)) == cache, order included, empty addresses included
//! - A missing cache is a cold start, not an error
//! - A malformed cache, bad encoding included, is CacheCorrupt and stops the
//!   run before any save
//! - A missing mapping is SourceUnavailable and stops the run before any save

mod common;

use autodns_core::{
    AutoDnsEngine, Cache, CacheStore, Error, FileCacheStore, FileMappingSource,
    StaticMappingSource,
};
use common::*;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

async fn round_trip(cache: &Cache) -> Cache {
    let dir = tempdir().unwrap();
    let store = FileCacheStore::new(dir.path().join("cache.json"));
    assert_ok!(store.save(cache).await);
    assert_ok!(store.load().await)
}

#[tokio::test]
async fn empty_cache_round_trips() {
    let cache = Cache::new();
    assert_eq!(round_trip(&cache).await, cache);
}

#[tokio::test]
async fn single_entry_round_trips() {
    let cache = cache_of(&[("Home", "home", "1.2.3.4")]);
    assert_eq!(round_trip(&cache).await, cache);
}

#[tokio::test]
async fn many_entries_round_trip_in_order() {
    let cache = cache_of(&[
        ("Zulu", "zulu", "10.0.0.1"),
        ("Alpha", "alpha", ""),
        ("Office", "office", "office.example.net"),
        ("IPv6", "v6", "2001:db8::1"),
    ]);

    let loaded = round_trip(&cache).await;

    assert_eq!(loaded, cache);
    let order: Vec<_> = loaded.entries().iter().map(|e| e.network_name.as_str()).collect();
    assert_eq!(order, vec!["zulu", "alpha", "office", "v6"]);
}

#[tokio::test]
async fn cold_start_reconciles_nothing_and_saves_empty_cache() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");

    let engine = AutoDnsEngine::new(
        Box::new(FileCacheStore::new(&cache_path)),
        Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
    );
    let remapper = RecordingRemapper::new();

    let report = assert_ok!(engine.run(&remapper).await);

    assert!(report.outcomes().is_empty());
    assert_eq!(remapper.call_count(), 0);
    assert!(cache_path.exists(), "Cache must be written even on a cold start");
}

#[tokio::test]
async fn corrupt_cache_stops_the_run() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    tokio::fs::write(&cache_path, b"{ not a cache").await.unwrap();

    let engine = AutoDnsEngine::new(
        Box::new(FileCacheStore::new(&cache_path)),
        Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
    );
    let remapper = RecordingRemapper::new();

    let err = assert_err!(engine.run(&remapper).await);

    assert!(matches!(err, Error::CacheCorrupt { .. }), "got {err:?}");
    assert_eq!(remapper.call_count(), 0);
    let content = tokio::fs::read_to_string(&cache_path).await.unwrap();
    assert_eq!(content, "{ not a cache", "Corrupt cache must not be overwritten");
}

#[tokio::test]
async fn missing_mapping_stops_the_run() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");

    let engine = AutoDnsEngine::new(
        Box::new(FileCacheStore::new(&cache_path)),
        Box::new(FileMappingSource::new(dir.path().join("absent.json"))),
    );
    let remapper = RecordingRemapper::new();

    let err = assert_err!(engine.run(&remapper).await);

    assert!(matches!(err, Error::SourceUnavailable { .. }), "got {err:?}");
    assert!(!cache_path.exists(), "No save without a mapping");
}

#[tokio::test]
async fn non_utf8_cache_stops_the_run_and_is_kept() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let mut content =
        br#"[{"name": "Home", "network_name": "home", "address": "1.2.3.3"}]"#.to_vec();
    content.insert(18, 0xFF);
    tokio::fs::write(&cache_path, &content).await.unwrap();

    let engine = AutoDnsEngine::new(
        Box::new(FileCacheStore::new(&cache_path)),
        Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
    );
    let remapper = RecordingRemapper::new();

    let err = assert_err!(engine.run(&remapper).await);

    assert!(matches!(err, Error::CacheCorrupt { .. }), "got {err:?}");
    assert_eq!(remapper.call_count(), 0);
    assert_eq!(
        tokio::fs::read(&cache_path).await.unwrap(),
        content,
        "Tracked networks must not be dropped"
    );
}
