//! Core structs for the Wayfarer world-state engine.
//!
//! Covers the persisted [`Event`] record and its [`Tag`]s, the ground-plane
//! geometry types ([`Vec3`], [`GroundPoint`], [`Footprint`],
//! [`TerrainSize`]), the transient [`PlaceableEntity`] descriptor, and the
//! zone payload types stored inside Zone events.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::enums::{EntityRole, EventKind};
use crate::ids::EventId;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A `(key, value)` label attached to an event.
///
/// Serialized as a two-element string array, e.g. `["zone", "abc123"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tag(pub String, pub String);

impl Tag {
    /// Create a tag from a key and a value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(key.into(), value.into())
    }

    /// The tag key.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// The tag value.
    pub fn value(&self) -> &str {
        &self.1
    }

    /// Whether this tag has exactly the given key and value.
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.0 == key && self.1 == value
    }
}

/// An immutable domain event.
///
/// Once appended to the log an event is never modified. The order of events
/// in the log is their causal order; `created_at` is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Globally unique random identifier.
    pub id: EventId,
    /// Event category, serialized as its integer wire code.
    #[ts(as = "u32")]
    pub kind: EventKind,
    /// Unix timestamp in seconds.
    pub created_at: i64,
    /// Kind-specific payload.
    pub content: serde_json::Value,
    /// Ordered `(key, value)` labels used for lookups.
    pub tags: Vec<Tag>,
}

impl Event {
    /// Create a new event stamped with a fresh id and the current time.
    pub fn new(kind: EventKind, content: serde_json::Value, tags: Vec<Tag>) -> Self {
        Self {
            id: EventId::new(),
            kind,
            created_at: Utc::now().timestamp(),
            content,
            tags,
        }
    }

    /// Whether the event carries a tag with the given key and value.
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tags.iter().any(|t| t.matches(key, value))
    }

    /// Return the value of the first tag with the given key.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|t| t.key() == key).map(Tag::value)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point or scale vector in world space. `y` is up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// East-west axis.
    pub x: f64,
    /// Vertical axis. Ignored by overlap tests.
    pub y: f64,
    /// North-south axis.
    pub z: f64,
}

impl Vec3 {
    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The unit scale `(1, 1, 1)`.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
}

/// A point on the ground plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GroundPoint {
    /// East-west coordinate.
    pub x: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl GroundPoint {
    /// Create a ground point.
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Axis-aligned rectangle occupied by an entity on the ground plane.
///
/// Invariant: `min.x <= max.x` and `min.z <= max.z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Footprint {
    /// Lower corner.
    pub min: GroundPoint,
    /// Upper corner.
    pub max: GroundPoint,
}

impl Footprint {
    /// Build a footprint of the given width and depth centered on `(x, z)`.
    ///
    /// Negative extents are treated as their absolute value so the corner
    /// invariant always holds.
    pub fn centered(x: f64, z: f64, width: f64, depth: f64) -> Self {
        let half_w = width.abs() / 2.0;
        let half_d = depth.abs() / 2.0;
        Self {
            min: GroundPoint::new(x - half_w, z - half_d),
            max: GroundPoint::new(x + half_w, z + half_d),
        }
    }

    /// Extent along the x axis.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along the z axis.
    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    /// Inflate outward by `buffer` on both axes. Negative buffers are
    /// treated as zero.
    #[must_use]
    pub fn expanded(&self, buffer: f64) -> Self {
        let b = buffer.max(0.0);
        Self {
            min: GroundPoint::new(self.min.x - b, self.min.z - b),
            max: GroundPoint::new(self.max.x + b, self.max.z + b),
        }
    }
}

/// World-space extents of a square or rectangular terrain patch centered on
/// the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TerrainSize {
    /// Extent along the x axis.
    pub width: f64,
    /// Extent along the z axis.
    pub depth: f64,
}

impl TerrainSize {
    /// Create a terrain size.
    pub const fn new(width: f64, depth: f64) -> Self {
        Self { width, depth }
    }
}

impl Default for TerrainSize {
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

// ---------------------------------------------------------------------------
// Placeable entities
// ---------------------------------------------------------------------------

/// A generated entity awaiting placement and scene construction.
///
/// The placement solver only ever mutates `position`. Once placed the
/// descriptor is handed to the scene collaborator.
///
/// Deserializing classifies the entity the same way [`PlaceableEntity::new`]
/// and the naming builders do, so descriptors without a `role` field still
/// come out as characters when their category, name, or appearance says so.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlaceableEntity {
    /// World position. `y` is preserved by placement.
    pub position: Vec3,
    /// Category or preset discriminator (e.g. `"tree"`, `"npc_plain"`).
    pub category: String,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Ring radius for ring-shaped categories.
    #[serde(default)]
    pub radius: Option<f64>,
    /// Per-entity override of the solver's path-avoidance option.
    #[serde(default)]
    pub avoid_paths: Option<bool>,
    /// Scenery or character.
    #[serde(default)]
    pub role: EntityRole,
    /// Place as-is without searching for a free slot.
    #[serde(default)]
    pub skip_safety_checks: bool,
    /// Display name, for characters.
    #[serde(default)]
    pub name: Option<String>,
    /// Appearance descriptor, for characters.
    #[serde(default)]
    pub appearance: Option<String>,
}

impl PlaceableEntity {
    /// Create an entity of the given category at the origin with unit scale.
    ///
    /// Categories containing `"npc"` are characters; everything else starts
    /// as a prop.
    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        let role = classify(&category, false, None);
        Self {
            position: Vec3::default(),
            category,
            scale: Vec3::ONE,
            radius: None,
            avoid_paths: None,
            role,
            skip_safety_checks: false,
            name: None,
            appearance: None,
        }
    }

    /// Set the position.
    #[must_use]
    pub const fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Set the scale.
    #[must_use]
    pub const fn with_scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.scale = Vec3::new(x, y, z);
        self
    }

    /// Set the ring radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Override path avoidance for this entity.
    #[must_use]
    pub const fn with_avoid_paths(mut self, avoid: bool) -> Self {
        self.avoid_paths = Some(avoid);
        self
    }

    /// Give the entity a name. Named entities are characters.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.role = EntityRole::Character;
        self
    }

    /// Give the entity an appearance. Entities with an appearance are
    /// characters.
    #[must_use]
    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = Some(appearance.into());
        self.role = EntityRole::Character;
        self
    }

    /// Mark the entity to be placed as-is.
    #[must_use]
    pub const fn skipping_safety_checks(mut self) -> Self {
        self.skip_safety_checks = true;
        self
    }

    /// Whether this entity is a character.
    pub const fn is_character(&self) -> bool {
        matches!(self.role, EntityRole::Character)
    }
}

/// Role implied by an entity's category, whether it is named or dressed,
/// and any explicitly declared role.
fn classify(category: &str, named: bool, declared: Option<EntityRole>) -> EntityRole {
    if named || category.contains("npc") || declared == Some(EntityRole::Character) {
        EntityRole::Character
    } else {
        EntityRole::Prop
    }
}

/// Wire shape of a [`PlaceableEntity`] before classification.
#[derive(Deserialize)]
struct EntityDescriptor {
    position: Vec3,
    category: String,
    scale: Vec3,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    avoid_paths: Option<bool>,
    #[serde(default)]
    role: Option<EntityRole>,
    #[serde(default)]
    skip_safety_checks: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    appearance: Option<String>,
}

impl From<EntityDescriptor> for PlaceableEntity {
    fn from(raw: EntityDescriptor) -> Self {
        let named = raw.name.is_some() || raw.appearance.is_some();
        Self {
            role: classify(&raw.category, named, raw.role),
            position: raw.position,
            category: raw.category,
            scale: raw.scale,
            radius: raw.radius,
            avoid_paths: raw.avoid_paths,
            skip_safety_checks: raw.skip_safety_checks,
            name: raw.name,
            appearance: raw.appearance,
        }
    }
}

impl<'de> Deserialize<'de> for PlaceableEntity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        EntityDescriptor::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// A generated non-player character living in a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PersonaDescriptor {
    /// Display name.
    pub name: String,
    /// Role in the zone (e.g. `"merchant"`).
    pub role: String,
    /// Tint color as `#rrggbb`.
    pub color: String,
    /// Where the persona stands.
    pub position: Vec3,
}

impl PersonaDescriptor {
    /// Build the placeable entity the scene collaborator renders for this
    /// persona.
    pub fn to_entity(&self) -> PlaceableEntity {
        PlaceableEntity::new("npc_plain")
            .with_position(self.position.x, self.position.y, self.position.z)
            .with_name(self.name.clone())
            .with_appearance(self.color.clone())
    }
}

/// Content payload of a Zone event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneRecord {
    /// The zone identifier, also used as its tag value.
    pub zone_id: String,
    /// Seed the zone was generated from.
    pub seed: String,
    /// Extents of the zone's terrain.
    pub terrain_size: TerrainSize,
    /// Scattered scenery.
    pub props: Vec<PlaceableEntity>,
    /// Characters living in the zone.
    pub personas: Vec<PersonaDescriptor>,
}

impl ZoneRecord {
    /// All entity descriptors for scene construction: props first, then
    /// persona characters.
    pub fn entities(&self) -> Vec<PlaceableEntity> {
        self.props
            .iter()
            .cloned()
            .chain(self.personas.iter().map(PersonaDescriptor::to_entity))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_wire_format() {
        let event = Event::new(
            EventKind::Zone,
            serde_json::json!({ "name": "meadow" }),
            vec![Tag::new("zone", "abc123")],
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], 30001);
        assert_eq!(value["tags"], serde_json::json!([["zone", "abc123"]]));
        assert_eq!(value["id"], serde_json::json!(event.id.to_string()));
        assert!(value["created_at"].is_i64());
    }

    #[test]
    fn event_round_trips() {
        let event = Event::new(
            EventKind::Trace,
            serde_json::json!({ "zone": "z" }),
            vec![Tag::new("zone", "z"), Tag::new("extra", "1")],
        );
        let json = serde_json::to_string(&event).unwrap();
        let restored: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn tag_lookup() {
        let event = Event::new(
            EventKind::Portal,
            serde_json::Value::Null,
            vec![Tag::new("zone", "a"), Tag::new("portal", "b")],
        );
        assert!(event.has_tag("portal", "b"));
        assert!(!event.has_tag("portal", "a"));
        assert_eq!(event.tag_value("zone"), Some("a"));
        assert_eq!(event.tag_value("missing"), None);
    }

    #[test]
    fn npc_category_is_character() {
        assert!(PlaceableEntity::new("npc_plain").is_character());
        assert!(!PlaceableEntity::new("tree").is_character());
        assert!(PlaceableEntity::new("tree").with_name("Ent").is_character());
        assert!(PlaceableEntity::new("statue").with_appearance("red").is_character());
    }

    #[test]
    fn centered_footprint_normalizes_negative_extents() {
        let fp = Footprint::centered(1.0, 1.0, -2.0, 4.0);
        assert_eq!(fp.min, GroundPoint::new(0.0, -1.0));
        assert_eq!(fp.max, GroundPoint::new(2.0, 3.0));
        assert_eq!(fp.width(), 2.0);
        assert_eq!(fp.depth(), 4.0);
    }

    #[test]
    fn entity_deserializes_with_missing_optionals() {
        let json = r#"{"position":{"x":1,"y":0,"z":2},"category":"tree","scale":{"x":1,"y":1,"z":1}}"#;
        let entity: PlaceableEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.role, EntityRole::Prop);
        assert!(entity.radius.is_none());
        assert!(!entity.skip_safety_checks);
    }

    #[test]
    fn deserialized_entity_is_classified() {
        let npc: PlaceableEntity = serde_json::from_str(
            r#"{"position":{"x":0,"y":0,"z":0},"category":"npc_plain","scale":{"x":1,"y":1,"z":1}}"#,
        )
        .unwrap();
        assert_eq!(npc.role, EntityRole::Character);

        let named: PlaceableEntity = serde_json::from_str(
            r#"{"position":{"x":0,"y":0,"z":0},"category":"statue","scale":{"x":1,"y":1,"z":1},"name":"Oda"}"#,
        )
        .unwrap();
        assert!(named.is_character());

        let dressed: PlaceableEntity = serde_json::from_str(
            r##"{"position":{"x":0,"y":0,"z":0},"category":"statue","scale":{"x":1,"y":1,"z":1},"appearance":"#112233"}"##,
        )
        .unwrap();
        assert!(dressed.is_character());

        let declared: PlaceableEntity = serde_json::from_str(
            r#"{"position":{"x":0,"y":0,"z":0},"category":"statue","scale":{"x":1,"y":1,"z":1},"role":"character"}"#,
        )
        .unwrap();
        assert!(declared.is_character());
    }

    #[test]
    fn entity_round_trips_with_role() {
        let persona = PlaceableEntity::new("npc_plain")
            .with_name("Ilsa")
            .with_position(1.0, 0.0, 2.0);
        let json = serde_json::to_string(&persona).unwrap();
        let restored: PlaceableEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, persona);
    }

    #[test]
    fn zone_entities_put_personas_last() {
        let record = ZoneRecord {
            zone_id: "z".to_owned(),
            seed: "z".to_owned(),
            terrain_size: TerrainSize::default(),
            props: vec![PlaceableEntity::new("tree")],
            personas: vec![PersonaDescriptor {
                name: "Ilsa".to_owned(),
                role: "guard".to_owned(),
                color: "#aabbcc".to_owned(),
                position: Vec3::new(3.0, 0.0, 4.0),
            }],
        };
        let entities = record.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].category, "npc_plain");
        assert_eq!(entities[1].name.as_deref(), Some("Ilsa"));
        assert!(entities[1].is_character());
    }

    #[test]
    fn footprint_expands_outward() {
        let fp = Footprint::centered(0.0, 0.0, 2.0, 4.0).expanded(1.0);
        assert_eq!(fp.min, GroundPoint::new(-2.0, -3.0));
        assert_eq!(fp.max, GroundPoint::new(2.0, 3.0));
        assert_eq!(Footprint::centered(1.0, 1.0, 2.0, 2.0).expanded(-5.0).width(), 2.0);
    }
}
