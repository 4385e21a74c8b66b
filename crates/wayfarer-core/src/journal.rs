//! Portals, visits, personas, and dialog recorded in the event log.
//!
//! These are thin, tagged wrappers over [`EventLog::append`] plus the read
//! queries that recover them. Every written event carries `("zone", id)`.

use serde_json::json;
use tracing::debug;
use wayfarer_events::{BlobStore, EventLog};
use wayfarer_types::{Event, EventKind, PersonaDescriptor, Tag};

use crate::coordinator::TAG_ZONE;
use crate::error::CoreError;

/// Tag key carrying a portal's destination zone.
pub const TAG_PORTAL: &str = "portal";
/// Tag key carrying a persona name.
pub const TAG_PERSONA: &str = "persona";

/// Record a portal from `from` to `to` unless one already exists.
///
/// Returns `true` if a Portal event was appended.
///
/// # Errors
///
/// Returns [`CoreError::EventLog`] if the append fails.
pub fn ensure_portal<S: BlobStore>(
    log: &mut EventLog<S>,
    from: &str,
    to: &str,
) -> Result<bool, CoreError> {
    if log
        .by_tag(EventKind::Portal, TAG_ZONE, from)
        .any(|e| e.has_tag(TAG_PORTAL, to))
    {
        debug!(from, to, "Portal already recorded");
        return Ok(false);
    }
    log.append(Event::new(
        EventKind::Portal,
        json!({ "from": from, "to": to }),
        vec![Tag::new(TAG_ZONE, from), Tag::new(TAG_PORTAL, to)],
    ))?;
    Ok(true)
}

/// Record that the player entered `zone_id`.
///
/// # Errors
///
/// Returns [`CoreError::EventLog`] if the append fails.
pub fn record_visit<S: BlobStore>(log: &mut EventLog<S>, zone_id: &str) -> Result<(), CoreError> {
    log.append(Event::new(
        EventKind::Trace,
        json!({ "zone": zone_id }),
        vec![Tag::new(TAG_ZONE, zone_id)],
    ))?;
    Ok(())
}

/// Record a persona living in `zone_id`.
///
/// # Errors
///
/// Returns [`CoreError::Serialization`] if the persona cannot be encoded,
/// or [`CoreError::EventLog`] if the append fails.
pub fn record_persona<S: BlobStore>(
    log: &mut EventLog<S>,
    zone_id: &str,
    persona: &PersonaDescriptor,
) -> Result<(), CoreError> {
    log.append(Event::new(
        EventKind::Persona,
        serde_json::to_value(persona)?,
        vec![Tag::new(TAG_ZONE, zone_id), Tag::new(TAG_PERSONA, &persona.name)],
    ))?;
    Ok(())
}

/// Record a line of dialog spoken by `persona` in `zone_id`.
///
/// # Errors
///
/// Returns [`CoreError::EventLog`] if the append fails.
pub fn record_dialog<S: BlobStore>(
    log: &mut EventLog<S>,
    zone_id: &str,
    persona: &str,
    line: &str,
) -> Result<(), CoreError> {
    log.append(Event::new(
        EventKind::Dialog,
        json!({ "persona": persona, "line": line }),
        vec![Tag::new(TAG_ZONE, zone_id), Tag::new(TAG_PERSONA, persona)],
    ))?;
    Ok(())
}

/// Destinations of portals leaving `zone_id`, in the order they were made.
pub fn portals_from<S: BlobStore>(log: &EventLog<S>, zone_id: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for target in log
        .by_tag(EventKind::Portal, TAG_ZONE, zone_id)
        .filter_map(|e| e.tag_value(TAG_PORTAL))
    {
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_owned());
        }
    }
    targets
}

/// Zones with at least one visit, in first-visit order.
pub fn visited_zones<S: BlobStore>(log: &EventLog<S>) -> Vec<String> {
    let mut zones: Vec<String> = Vec::new();
    for zone in log
        .by_kind(EventKind::Trace)
        .filter_map(|e| e.tag_value(TAG_ZONE))
    {
        if !zones.iter().any(|z| z == zone) {
            zones.push(zone.to_owned());
        }
    }
    zones
}

/// Dialog lines spoken by `persona` in `zone_id`, oldest first.
pub fn dialog_lines<S: BlobStore>(log: &EventLog<S>, zone_id: &str, persona: &str) -> Vec<String> {
    log.by_tag(EventKind::Dialog, TAG_ZONE, zone_id)
        .filter(|e| e.has_tag(TAG_PERSONA, persona))
        .filter_map(|e| e.content.get("line").and_then(serde_json::Value::as_str))
        .map(str::to_owned)
        .collect()
}
