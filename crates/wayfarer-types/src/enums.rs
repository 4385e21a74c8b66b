//! Enumeration types for the Wayfarer world-state engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Wire code for [`EventKind::Zone`].
pub const KIND_ZONE: u32 = 30001;
/// Wire code for [`EventKind::Persona`].
pub const KIND_PERSONA: u32 = 30002;
/// Wire code for [`EventKind::Dialog`].
pub const KIND_DIALOG: u32 = 30003;
/// Wire code for [`EventKind::Portal`].
pub const KIND_PORTAL: u32 = 30004;
/// Wire code for [`EventKind::Trace`].
pub const KIND_TRACE: u32 = 30005;

/// Category of a domain event in the event log.
///
/// Serialized as its integer wire code. The codes live in the `3000x`
/// range so they do not collide with unrelated numeric kinds that other
/// tools may write into the same log. Unknown codes survive a round trip
/// as [`EventKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum EventKind {
    /// A zone was created (procedurally or from an authored description).
    Zone,
    /// A persona is present in a zone.
    Persona,
    /// A line of dialog was spoken by a persona.
    Dialog,
    /// A portal links one zone to another.
    Portal,
    /// A zone was visited.
    Trace,
    /// A kind this engine does not interpret.
    Other(u32),
}

impl EventKind {
    /// Return the integer wire code.
    pub const fn code(self) -> u32 {
        match self {
            Self::Zone => KIND_ZONE,
            Self::Persona => KIND_PERSONA,
            Self::Dialog => KIND_DIALOG,
            Self::Portal => KIND_PORTAL,
            Self::Trace => KIND_TRACE,
            Self::Other(code) => code,
        }
    }

    /// Map an integer wire code to a kind.
    pub const fn from_code(code: u32) -> Self {
        match code {
            KIND_ZONE => Self::Zone,
            KIND_PERSONA => Self::Persona,
            KIND_DIALOG => Self::Dialog,
            KIND_PORTAL => Self::Portal,
            KIND_TRACE => Self::Trace,
            other => Self::Other(other),
        }
    }
}

impl From<u32> for EventKind {
    fn from(code: u32) -> Self {
        Self::from_code(code)
    }
}

impl From<EventKind> for u32 {
    fn from(kind: EventKind) -> Self {
        kind.code()
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Zone => write!(f, "zone"),
            Self::Persona => write!(f, "persona"),
            Self::Dialog => write!(f, "dialog"),
            Self::Portal => write!(f, "portal"),
            Self::Trace => write!(f, "trace"),
            Self::Other(code) => write!(f, "kind:{code}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity roles
// ---------------------------------------------------------------------------

/// Whether a placeable entity is scenery or a character.
///
/// Set once when the entity is constructed. Placement uses the role to
/// pick the buffer distance that keeps other entities away from it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    /// Static scenery: trees, rocks, structures.
    #[default]
    Prop,
    /// A non-player character.
    Character,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_round_trip() {
        for kind in [
            EventKind::Zone,
            EventKind::Persona,
            EventKind::Dialog,
            EventKind::Portal,
            EventKind::Trace,
            EventKind::Other(1),
        ] {
            assert_eq!(EventKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn kind_serializes_as_integer() {
        let json = serde_json::to_string(&EventKind::Portal).ok();
        assert_eq!(json.as_deref(), Some("30004"));
        let parsed: Option<EventKind> = serde_json::from_str("30001").ok();
        assert_eq!(parsed, Some(EventKind::Zone));
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let parsed: Option<EventKind> = serde_json::from_str("1").ok();
        assert_eq!(parsed, Some(EventKind::Other(1)));
        assert_eq!(parsed.map(EventKind::code), Some(1));
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&EntityRole::Character).ok();
        assert_eq!(json.as_deref(), Some("\"character\""));
    }
}
