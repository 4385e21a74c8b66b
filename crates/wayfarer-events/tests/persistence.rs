//! File-backed persistence tests for the event log.
//!
//! Each test works in its own temporary directory.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use wayfarer_events::{
    BlobStore, DEFAULT_LOG_KEY, EventLog, EventLogError, FileBlobStore, StoreError,
};
use wayfarer_types::{Event, EventKind, Tag};

fn zone_event(zone: &str, label: &str) -> Event {
    Event::new(
        EventKind::Zone,
        json!({ "label": label }),
        vec![Tag::new("zone", zone), Tag::new("seed", zone)],
    )
}

#[test]
fn reload_reproduces_order() {
    let dir = TempDir::new().unwrap();
    let mut log = EventLog::load(FileBlobStore::new(dir.path()));
    log.append(zone_event("a", "1")).unwrap();
    log.append(Event::new(EventKind::Trace, json!({}), vec![Tag::new("zone", "a")]))
        .unwrap();
    log.append(zone_event("b", "2")).unwrap();
    let before = log.events().to_vec();

    let reloaded = EventLog::load(FileBlobStore::new(dir.path()));
    assert_eq!(reloaded.events(), before.as_slice());
    assert!(dir.path().join(format!("{DEFAULT_LOG_KEY}.json")).exists());
}

#[test]
fn latest_by_tag_after_reload() {
    let dir = TempDir::new().unwrap();
    let mut log = EventLog::load(FileBlobStore::new(dir.path()));
    log.append(zone_event("abc123", "old")).unwrap();
    log.append(zone_event("abc123", "new")).unwrap();

    let reloaded = EventLog::load(FileBlobStore::new(dir.path()));
    let latest = reloaded
        .latest_by_tag(EventKind::Zone, "zone", "abc123")
        .unwrap();
    assert_eq!(latest.content["label"], "new");
}

#[test]
fn corrupt_file_loads_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(format!("{DEFAULT_LOG_KEY}.json")), "[{\"broken\"").unwrap();

    let mut log = EventLog::load(FileBlobStore::new(dir.path()));
    assert!(log.is_empty());

    log.append(zone_event("a", "1")).unwrap();
    let reloaded = EventLog::load(FileBlobStore::new(dir.path()));
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn separate_keys_are_independent() {
    let dir = TempDir::new().unwrap();
    let mut first = EventLog::load_with_key(FileBlobStore::new(dir.path()), "first");
    first.append(zone_event("a", "1")).unwrap();

    let second = EventLog::load_with_key(FileBlobStore::new(dir.path()), "second");
    assert!(second.is_empty());
    assert_eq!(second.key(), "second");
}

#[test]
fn invalid_key_fails_append_but_keeps_event() {
    let dir = TempDir::new().unwrap();
    let mut log = EventLog::load_with_key(FileBlobStore::new(dir.path()), "../outside");
    let err = log.append(zone_event("a", "1")).unwrap_err();
    assert!(matches!(err, EventLogError::Persist(StoreError::InvalidKey(_))));
    assert_eq!(log.len(), 1);
}

#[test]
fn write_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let mut store = FileBlobStore::new(dir.path().join("nested"));
    store.write_blob("log", "[]").unwrap();
    let names: Vec<_> = fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["log.json"]);
    assert_eq!(store.read_blob("log").unwrap().as_deref(), Some("[]"));
    assert_eq!(store.read_blob("missing").unwrap(), None);
}

#[test]
fn rewrite_replaces_previous_blob() {
    let dir = TempDir::new().unwrap();
    let mut store = FileBlobStore::new(dir.path());
    store.write_blob("log", "[1]").unwrap();
    store.write_blob("log", "[1,2]").unwrap();
    assert_eq!(store.read_blob("log").unwrap().as_deref(), Some("[1,2]"));
    assert!(!dir.path().join("log.json.tmp").exists());
}

#[test]
fn unreadable_file_is_left_intact() {
    let dir = TempDir::new().unwrap();
    // A directory where the blob file should be cannot be read as text.
    let blob_path = dir.path().join(format!("{DEFAULT_LOG_KEY}.json"));
    fs::create_dir(&blob_path).unwrap();
    fs::write(blob_path.join("marker"), "keep").unwrap();

    let mut log = EventLog::load(FileBlobStore::new(dir.path()));
    assert!(log.is_empty());
    assert!(log.is_degraded());

    let err = log.append(zone_event("a", "1")).unwrap_err();
    assert!(matches!(err, EventLogError::Degraded { .. }));
    assert_eq!(log.len(), 1);
    assert!(blob_path.is_dir());
    assert_eq!(fs::read_to_string(blob_path.join("marker")).unwrap(), "keep");
}
