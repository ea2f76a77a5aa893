//! Contract Test: Maintenance "add"
//!
//! Constraints verified:
//! - Adding the same network twice leaves one entry with the latest label
//! - An added entry counts as already seen: the next run does not remap it
//! - Adding a network missing from the mapping fails and changes nothing

mod common;

use autodns_core::{
    AutoDnsEngine, Error, MemoryCacheStore, StaticMappingSource, Upsert, add_mapping,
};
use common::*;

#[test]
fn add_twice_is_an_upsert() {
    let mapping = mapping_of(&[("home", "1.2.3.4")]);
    let mut cache = cache_of(&[]);

    let first = add_mapping(&mut cache, &mapping, "home", Some("Home")).unwrap();
    let second = add_mapping(&mut cache, &mapping, "home", Some("House")).unwrap();

    assert_eq!(first, Upsert::Inserted);
    assert_eq!(second, Upsert::Updated);
    assert_eq!(cache, cache_of(&[("House", "home", "1.2.3.4")]));
}

#[test]
fn add_refreshes_address_in_place() {
    let mapping = mapping_of(&[("home", "1.2.3.4")]);
    let mut cache = cache_of(&[("Office", "office", "5.6.7.8"), ("Home", "home", "1.1.1.1")]);

    add_mapping(&mut cache, &mapping, "home", None).unwrap();

    assert_eq!(
        cache,
        cache_of(&[("Office", "office", "5.6.7.8"), ("home", "home", "1.2.3.4")])
    );
}

#[test]
fn add_unobserved_network_fails() {
    let mapping = mapping_of(&[("home", "1.2.3.4")]);
    let mut cache = cache_of(&[("Home", "home", "1.2.3.4")]);

    let err = add_mapping(&mut cache, &mapping, "office", Some("Office")).unwrap_err();

    assert!(matches!(
        err,
        Error::NetworkNotObserved { ref network_name } if network_name == "office"
    ));
    assert_eq!(cache, cache_of(&[("Home", "home", "1.2.3.4")]));
}

#[tokio::test]
async fn added_network_is_not_remapped_by_next_run() {
    let store = MemoryCacheStore::new();
    let engine = AutoDnsEngine::new(
        Box::new(store.clone()),
        Box::new(StaticMappingSource::default().with("home", "1.2.3.4")),
    );
    let remapper = RecordingRemapper::new();

    engine.add("home", Some("Home")).await.unwrap();
    let report = engine.run(&remapper).await.unwrap();

    assert_eq!(remapper.call_count(), 0);
    assert_eq!(report.unchanged_count(), 1);
    assert_eq!(store.snapshot().await, cache_of(&[("Home", "home", "1.2.3.4")]));
}
