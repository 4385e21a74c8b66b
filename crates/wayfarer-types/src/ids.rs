//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Event identifiers are random (UUID v4) opaque tokens. They carry no
//! ordering information: the position of an event in the log is the only
//! authority on temporal order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for an event in the event log.
///
/// Serialized as the canonical hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_string() {
        let id = EventId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{id}\"")));
        let restored: Result<EventId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(id));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = EventId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
