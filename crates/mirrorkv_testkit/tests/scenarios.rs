//! End-to-end scenarios for `CachedStore`.

use mirrorkv_core::{CachedStore, StoreConfig, STORE_KEY};
use mirrorkv_storage::{EventKind, InMemoryBackend};
use mirrorkv_testkit::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

#[test]
fn set_get_delete_lifecycle() {
    let mut fixture = TestStore::memory("store");

    fixture.set("foo", "bar".to_string()).unwrap();
    assert_eq!(fixture.get("foo", None).unwrap(), "bar");

    fixture.delete("foo").unwrap();
    assert!(fixture.get("foo", None).unwrap_err().is_not_found());

    let second = fixture.delete("foo").unwrap_err();
    assert!(second.is_not_found());
    assert!(!second.is_persistence());
}

#[test]
fn copy_key_between_stores() {
    let mut a: CachedStore<i64, _> =
        CachedStore::open("store_a", InMemoryBackend::new(), StoreConfig::default()).unwrap();
    let mut b: CachedStore<i64, _> =
        CachedStore::open("store_b", InMemoryBackend::new(), StoreConfig::default()).unwrap();

    a.set("x", 1).unwrap();
    b.copy_key(&mut a, "x", None).unwrap();
    assert_eq!(b.get("x", None).unwrap(), 1);
}

#[test]
fn failed_write_is_rolled_back_and_warned() {
    let mut fixture = TestStore::memory("store");
    fixture.backend.fail_writes(true);

    assert!(fixture.set("k", "v".to_string()).unwrap_err().is_persistence());

    assert!(!fixture.has("k").unwrap());
    assert!(fixture.logger.has_warning("set(k) rolled back"));
    assert!(fixture.backend.record(STORE_KEY).is_none());
}

#[test]
fn recovering_backend_accepts_later_writes() {
    let mut fixture = TestStore::memory("store");

    fixture.backend.fail_writes(true);
    assert!(fixture.set("a", "1".to_string()).is_err());

    fixture.backend.fail_writes(false);
    fixture.set("b", "2".to_string()).unwrap();

    assert_eq!(fixture.keys().unwrap(), vec!["b".to_string()]);
}

#[test]
fn file_store_persists_across_processes() {
    let file = TempStoreFile::new("settings");

    {
        let mut store = file.open(StoreConfig::default());
        store.set("theme", "dark".to_string()).unwrap();
        store.set("lang", "en".to_string()).unwrap();
        store.delete("lang").unwrap();
        store.disconnect().unwrap();
    }

    let mut store = file.open(StoreConfig::default());
    assert_eq!(store.keys().unwrap(), vec!["theme".to_string()]);
    assert_eq!(store.get("theme", None).unwrap(), "dark");
}

#[test]
fn file_store_wipe_on_start() {
    let file = TempStoreFile::new("session");
    {
        let mut store = file.open(StoreConfig::default());
        store.set("token", "abc".to_string()).unwrap();
    }

    let store = file.open(StoreConfig::new().wipe_on_start(true));
    assert!(store.is_empty().unwrap());

    let reopened = file.open(StoreConfig::default());
    assert!(reopened.is_empty().unwrap());
}

#[test]
fn development_mode_reads_but_never_writes_file() {
    let file = TempStoreFile::new("shared");
    {
        let mut store = file.open(StoreConfig::default());
        store.set("seed", "value".to_string()).unwrap();
    }
    let on_disk = std::fs::read(file.file_path()).unwrap();

    {
        let mut store = file.open(StoreConfig::new().development_mode(true));
        assert_eq!(store.get("seed", None).unwrap(), "value");
        store.set("scratch", "temp".to_string()).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    assert_eq!(std::fs::read(file.file_path()).unwrap(), on_disk);
}

#[test]
fn disconnect_then_reconnect_reloads_from_backend() {
    let backend = InMemoryBackend::new();
    let mut first = TestStore::on_backend("store", backend.clone(), StoreConfig::default());
    first.set("k", "v".to_string()).unwrap();

    first.disconnect().unwrap();
    assert!(backend.is_closed());
    assert!(first.entries().unwrap_err().is_not_connected());

    first.reconnect().unwrap();
    assert_eq!(first.get("k", None).unwrap(), "v");
}

#[test]
fn backend_errors_are_logged_after_logger_swap() {
    let fixture = TestStore::memory("store");
    let replacement = Arc::new(RecordingLogger::new());

    let previous = fixture.set_logger(replacement.clone());
    fixture.backend.emit_error("socket closed");

    assert!(replacement.has(Level::ERROR, "socket closed"));
    assert!(!fixture.logger.has(Level::ERROR, "socket closed"));

    fixture.set_logger(previous);
}

#[test]
fn listeners_observe_writes() {
    let mut fixture = TestStore::memory("store");
    let writes = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&writes);
    fixture
        .add_listener(EventKind::Set, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    fixture.set("a", "1".to_string()).unwrap();
    fixture.set("b", "2".to_string()).unwrap();
    let _ = fixture.delete("missing");

    assert_eq!(writes.load(Ordering::SeqCst), 2);
}

#[test]
fn copy_key_with_fallback_seeds_both_stores() {
    let mut source = TestStore::memory("source");
    let mut target = TestStore::memory("target");

    target
        .copy_key(&mut source.store, "region", Some("eu".to_string()))
        .unwrap();

    assert_eq!(source.get("region", None).unwrap(), "eu");
    assert_eq!(target.get("region", None).unwrap(), "eu");
}

#[test]
fn copy_key_fallback_failure_in_source_is_not_found() {
    let mut source = TestStore::memory("source");
    let mut target = TestStore::memory("target");
    source.backend.fail_writes(true);

    let err = target
        .copy_key(&mut source.store, "region", Some("eu".to_string()))
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!target.has("region").unwrap());
}

#[test]
fn reconcile_fills_defaults() {
    let mut fixture = TestStore::seeded("prefs", &mirror_of(&[("theme", "light")]));
    let defaults = mirror_of(&[("theme", "dark"), ("lang", "en"), ("tz", "UTC")]);

    assert_eq!(fixture.reconcile(&defaults).unwrap(), 2);
    assert_eq!(
        fixture.entries().unwrap(),
        mirror_of(&[("theme", "light"), ("lang", "en"), ("tz", "UTC")])
    );
}
