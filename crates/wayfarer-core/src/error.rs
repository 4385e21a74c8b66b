//! Error types for the `wayfarer-core` crate.
//!
//! Placement exhaustion is reported through
//! [`PlacementOutcome`](crate::coordinator::PlacementOutcome), not here.

use wayfarer_events::EventLogError;

/// Errors raised by zone coordination and journal operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Appending to the event log failed.
    #[error("event log error: {0}")]
    EventLog(#[from] EventLogError),

    /// A stored Zone event does not hold a valid zone record.
    #[error("zone '{zone_id}' has an unreadable record: {source}")]
    ZoneRecord {
        /// The zone whose record failed to parse.
        zone_id: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Event content could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Zone identifiers must be non-empty.
    #[error("zone id must not be empty")]
    EmptyZoneId,
}
