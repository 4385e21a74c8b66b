//! Append observer that mirrors the event log into the tracing output.
//!
//! Registered on the [`EventLog`](wayfarer_events::EventLog) at startup so
//! every persisted event shows up in the engine log with its kind and tags.

use tracing::info;
use wayfarer_events::AppendObserver;
use wayfarer_types::Event;

/// Logs each persisted event and keeps a running count.
#[derive(Debug, Default)]
pub struct EventLogObserver {
    appended: usize,
}

impl EventLogObserver {
    /// Create an observer with a zero count.
    pub const fn new() -> Self {
        Self { appended: 0 }
    }
}

impl AppendObserver for EventLogObserver {
    fn on_append(&mut self, event: &Event) {
        self.appended = self.appended.saturating_add(1);
        let tags: Vec<String> = event
            .tags
            .iter()
            .map(|t| format!("{}={}", t.key(), t.value()))
            .collect();
        info!(
            kind = %event.kind,
            id = %event.id,
            tags = %tags.join(","),
            session_total = self.appended,
            "Event persisted"
        );
    }
}
