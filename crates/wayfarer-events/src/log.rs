//! The append-only event log.
//!
//! [`EventLog`] owns the ordered event sequence and the [`BlobStore`] it is
//! persisted to. Every append rewrites the whole serialized sequence as one
//! blob, so the persisted order is always the in-memory order.
//!
//! # Failure semantics
//!
//! - **Load** never fails. A missing blob gives an empty log; an
//!   unparseable blob gives an empty log and a warning.
//! - A blob the store cannot read also gives an empty log, but the log is
//!   degraded: appends stay in memory and return
//!   [`EventLogError::Degraded`] instead of overwriting the stored blob.
//! - **Append** keeps the event in memory even when the write fails, so the
//!   current session continues with a consistent view. The error is returned
//!   and observers are not notified.

use std::fmt;

use tracing::{debug, warn};
use wayfarer_types::{Event, EventKind};

use crate::error::{EventLogError, StoreError};
use crate::store::BlobStore;

/// Blob key used by [`EventLog::load`].
pub const DEFAULT_LOG_KEY: &str = "wayfarer.events";

/// Receives every successfully persisted event.
pub trait AppendObserver {
    /// Called after `event` has been appended and persisted.
    fn on_append(&mut self, event: &Event);
}

impl<F> AppendObserver for F
where
    F: FnMut(&Event),
{
    fn on_append(&mut self, event: &Event) {
        self(event);
    }
}

/// Ordered, append-only, persisted sequence of events.
pub struct EventLog<S: BlobStore> {
    store: S,
    key: String,
    events: Vec<Event>,
    observers: Vec<Box<dyn AppendObserver>>,
    degraded: bool,
}

impl<S: BlobStore> EventLog<S> {
    /// Load the log stored under [`DEFAULT_LOG_KEY`].
    pub fn load(store: S) -> Self {
        Self::load_with_key(store, DEFAULT_LOG_KEY)
    }

    /// Load the log stored under `key`.
    pub fn load_with_key(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut degraded = false;
        let events = match store.read_blob(&key) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<Event>>(&blob) {
                Ok(events) => events,
                Err(e) => {
                    warn!(key = %key, error = %e, "Persisted event log is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    "Failed to read event log, starting empty"
                );
                // An invalid key has no stored blob to protect.
                degraded = !matches!(e, StoreError::InvalidKey(_));
                Vec::new()
            }
        };
        debug!(key = %key, events = events.len(), degraded, "Loaded event log");
        Self {
            store,
            key,
            events,
            observers: Vec::new(),
            degraded,
        }
    }

    /// Append an event and persist the full sequence.
    ///
    /// # Errors
    ///
    /// Returns [`EventLogError::Persist`] if the store rejects the write,
    /// [`EventLogError::Serialization`] if the sequence cannot be encoded, or
    /// [`EventLogError::Degraded`] if the stored log was unreadable at load.
    /// In every case the event remains in memory.
    pub fn append(&mut self, event: Event) -> Result<(), EventLogError> {
        self.events.push(event);

        if self.degraded {
            warn!(key = %self.key, "Event log is degraded, event kept in memory only");
            return Err(EventLogError::Degraded {
                key: self.key.clone(),
            });
        }

        let blob = serde_json::to_string(&self.events)?;
        if let Err(e) = self.store.write_blob(&self.key, &blob) {
            warn!(key = %self.key, error = %e, "Failed to persist event log");
            return Err(e.into());
        }

        if let Some(event) = self.events.last() {
            debug!(kind = %event.kind, id = %event.id, total = self.events.len(), "Appended event");
            for observer in &mut self.observers {
                observer.on_append(event);
            }
        }
        Ok(())
    }

    /// Events of `kind`, in log order.
    pub fn by_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Events of `kind` carrying the tag `(key, value)`, in log order.
    pub fn by_tag<'a>(
        &'a self,
        kind: EventKind,
        key: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Event> {
        self.by_kind(kind).filter(move |e| e.has_tag(key, value))
    }

    /// The most recently appended event of `kind` carrying `(key, value)`.
    pub fn latest_by_tag(&self, kind: EventKind, key: &str, value: &str) -> Option<&Event> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind == kind && e.has_tag(key, value))
    }

    /// Every event, in log order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the stored log was unreadable at load, so appends are not
    /// persisted.
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Register an observer for future successful appends.
    pub fn subscribe(&mut self, observer: impl AppendObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Blob key the log persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the log and return its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: BlobStore + fmt::Debug> fmt::Debug for EventLog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("store", &self.store)
            .field("key", &self.key)
            .field("events", &self.events.len())
            .field("observers", &self.observers.len())
            .field("degraded", &self.degraded)
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;
    use wayfarer_types::Tag;

    use super::*;
    use crate::store::MemoryBlobStore;

    fn zone_event(zone: &str, label: &str) -> Event {
        Event::new(
            EventKind::Zone,
            json!({ "label": label }),
            vec![Tag::new("zone", zone)],
        )
    }

    #[test]
    fn empty_store_gives_empty_log() {
        let log = EventLog::load(MemoryBlobStore::new());
        assert!(log.is_empty());
        assert_eq!(log.key(), DEFAULT_LOG_KEY);
    }

    #[test]
    fn latest_by_tag_returns_last_match() {
        let mut log = EventLog::load(MemoryBlobStore::new());
        log.append(zone_event("abc123", "first")).unwrap();
        log.append(zone_event("other", "noise")).unwrap();
        log.append(zone_event("abc123", "second")).unwrap();

        let latest = log.latest_by_tag(EventKind::Zone, "zone", "abc123").unwrap();
        assert_eq!(latest.content["label"], "second");
        assert_eq!(log.by_tag(EventKind::Zone, "zone", "abc123").count(), 2);
        assert!(log.latest_by_tag(EventKind::Portal, "zone", "abc123").is_none());
    }

    #[test]
    fn by_kind_filters_and_keeps_order() {
        let mut log = EventLog::load(MemoryBlobStore::new());
        log.append(zone_event("a", "1")).unwrap();
        log.append(Event::new(EventKind::Trace, json!({}), vec![])).unwrap();
        log.append(zone_event("b", "2")).unwrap();
        let labels: Vec<_> = log
            .by_kind(EventKind::Zone)
            .map(|e| e.content["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, ["1", "2"]);
    }

    #[test]
    fn persisted_blob_matches_memory() {
        let mut log = EventLog::load(MemoryBlobStore::new());
        log.append(zone_event("a", "1")).unwrap();
        log.append(zone_event("b", "2")).unwrap();
        let blob = log.store().get(DEFAULT_LOG_KEY).unwrap();
        let persisted: Vec<Event> = serde_json::from_str(blob).unwrap();
        assert_eq!(persisted, log.events());
    }

    #[test]
    fn corrupt_blob_resets_to_empty() {
        let mut store = MemoryBlobStore::new();
        store.insert(DEFAULT_LOG_KEY, "{not json");
        let log = EventLog::load(store);
        assert!(log.is_empty());
    }

    #[test]
    fn failed_persist_keeps_event_and_skips_observers() {
        let seen = Rc::new(RefCell::new(0_usize));
        let counter = Rc::clone(&seen);
        let mut log = EventLog::load(MemoryBlobStore::with_quota(10));
        log.subscribe(move |_: &Event| *counter.borrow_mut() += 1);

        let err = log.append(zone_event("a", "1")).unwrap_err();
        assert!(matches!(
            err,
            EventLogError::Persist(StoreError::QuotaExceeded { .. })
        ));
        assert_eq!(log.len(), 1);
        assert_eq!(*seen.borrow(), 0);
        assert!(log.store().get(DEFAULT_LOG_KEY).is_none());
    }

    #[test]
    fn observers_see_each_append() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut log = EventLog::load(MemoryBlobStore::new());
        log.subscribe(move |e: &Event| sink.borrow_mut().push(e.id));

        log.append(zone_event("a", "1")).unwrap();
        log.append(zone_event("b", "2")).unwrap();
        let ids: Vec<_> = log.events().iter().map(|e| e.id).collect();
        assert_eq!(*seen.borrow(), ids);
    }

    /// Store whose reads always fail; counts write attempts.
    #[derive(Debug, Default)]
    struct UnreadableStore {
        writes: usize,
    }

    impl BlobStore for UnreadableStore {
        fn read_blob(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("device offline")))
        }

        fn write_blob(&mut self, _key: &str, _blob: &str) -> Result<(), StoreError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn unreadable_store_is_never_overwritten() {
        let seen = Rc::new(RefCell::new(0_usize));
        let counter = Rc::clone(&seen);
        let mut log = EventLog::load(UnreadableStore::default());
        log.subscribe(move |_: &Event| *counter.borrow_mut() += 1);
        assert!(log.is_empty());
        assert!(log.is_degraded());

        let err = log.append(zone_event("a", "1")).unwrap_err();
        assert!(matches!(err, EventLogError::Degraded { .. }));
        assert_eq!(log.len(), 1);
        assert_eq!(log.store().writes, 0);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn corrupt_blob_is_not_degraded() {
        let mut store = MemoryBlobStore::new();
        store.insert(DEFAULT_LOG_KEY, "[{");
        let mut log = EventLog::load(store);
        assert!(!log.is_degraded());
        log.append(zone_event("a", "1")).unwrap();
        assert_eq!(log.len(), 1);
    }
}
