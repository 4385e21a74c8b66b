//! Zone lifecycle on top of the event log.
//!
//! A zone exists once its Zone event is in the log. [`ZoneStateCoordinator`]
//! either recovers that event or generates the zone from its id, hands the
//! contents to the scene, and appends the event. Because the seed is the
//! zone id, regenerating a zone whose event was lost yields the same
//! contents.
//!
//! ```text
//! Unknown --ensure_zone--> Generated (one Zone event appended)
//! Unknown --ensure_zone--> AlreadyExists (log already had it)
//! ```

use tracing::{info, warn};
use wayfarer_events::{BlobStore, EventLog};
use wayfarer_types::{Event, EventId, EventKind, PlaceableEntity, Tag, ZoneRecord};
use wayfarer_world::{PathMask, PlacementOptions, ScatterSettings, SeededSequence, placement};

use crate::config::WayfarerConfig;
use crate::error::CoreError;
use crate::scene::SceneBuilder;

/// Tag key carrying the zone id.
pub const TAG_ZONE: &str = "zone";
/// Tag key carrying the generation seed.
pub const TAG_SEED: &str = "seed";

/// How [`ZoneStateCoordinator::ensure_zone`] obtained the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneStatus {
    /// Generated now and appended to the log.
    Generated,
    /// Recovered from an existing Zone event; nothing was appended.
    AlreadyExists,
}

/// A zone as known to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneHandle {
    /// How the zone was obtained.
    pub status: ZoneStatus,
    /// The zone's stored record.
    pub record: ZoneRecord,
    /// Id of the Zone event holding the record.
    pub event_id: EventId,
    /// When the Zone event was created, in unix seconds.
    pub created_at: i64,
}

impl ZoneHandle {
    /// The zone identifier.
    pub fn zone_id(&self) -> &str {
        &self.record.zone_id
    }
}

/// Result of inserting an authored entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementOutcome {
    /// Placed at a collision-free position.
    Placed {
        /// Chosen x.
        x: f64,
        /// Chosen z.
        z: f64,
    },
    /// Attempts ran out; placed anyway without a collision guarantee.
    Fallback {
        /// Chosen x.
        x: f64,
        /// Chosen z.
        z: f64,
    },
    /// Attempts ran out; the entity was not moved.
    Exhausted,
}

impl PlacementOutcome {
    /// Whether the entity ended up with a new position.
    pub const fn is_placed(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// Creates, recovers, and places zone contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStateCoordinator {
    placement: PlacementOptions,
    scatter: ScatterSettings,
    /// Candidate generator for authored inserts, advanced by every call.
    authored_rng: SeededSequence,
}

impl Default for ZoneStateCoordinator {
    fn default() -> Self {
        Self::new(PlacementOptions::default(), ScatterSettings::default())
    }
}

impl ZoneStateCoordinator {
    /// Create a coordinator with explicit options.
    pub fn new(placement: PlacementOptions, scatter: ScatterSettings) -> Self {
        let authored_rng = SeededSequence::new(&placement.seed);
        Self {
            placement,
            scatter,
            authored_rng,
        }
    }

    /// Create a coordinator from loaded configuration.
    pub fn from_config(config: &WayfarerConfig) -> Self {
        Self::new(config.placement_options(), config.scatter_settings())
    }

    /// Options used by [`insert_authored`](Self::insert_authored).
    pub const fn placement_options(&self) -> &PlacementOptions {
        &self.placement
    }

    /// Settings used for zone generation.
    pub const fn scatter_settings(&self) -> &ScatterSettings {
        &self.scatter
    }

    /// Recover `zone_id` from the latest matching Zone event, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZoneRecord`] if the latest Zone event for the id
    /// does not parse.
    pub fn find_zone<S: BlobStore>(
        log: &EventLog<S>,
        zone_id: &str,
    ) -> Result<Option<ZoneHandle>, CoreError> {
        let Some(event) = log.latest_by_tag(EventKind::Zone, TAG_ZONE, zone_id) else {
            return Ok(None);
        };
        let record = serde_json::from_value(event.content.clone()).map_err(|source| {
            CoreError::ZoneRecord {
                zone_id: zone_id.to_owned(),
                source,
            }
        })?;
        Ok(Some(ZoneHandle {
            status: ZoneStatus::AlreadyExists,
            record,
            event_id: event.id,
            created_at: event.created_at,
        }))
    }

    /// Make sure `zone_id` exists, generating and logging it at most once.
    ///
    /// An existing zone is returned as [`ZoneStatus::AlreadyExists`] without
    /// touching the scene or the log; call [`materialize`](Self::materialize)
    /// to rebuild it. A new zone is generated from its id, handed to `scene`,
    /// and appended as one Zone event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyZoneId`] for an empty id,
    /// [`CoreError::ZoneRecord`] if a stored record is unreadable, or
    /// [`CoreError::EventLog`] if the append fails. In the last case the
    /// event is still held in memory, so the zone counts as existing for the
    /// rest of the session.
    pub fn ensure_zone<S, B>(
        &self,
        log: &mut EventLog<S>,
        scene: &mut B,
        zone_id: &str,
        persona_hint: Option<&str>,
    ) -> Result<ZoneHandle, CoreError>
    where
        S: BlobStore,
        B: SceneBuilder + ?Sized,
    {
        if zone_id.is_empty() {
            return Err(CoreError::EmptyZoneId);
        }

        if let Some(handle) = Self::find_zone(log, zone_id)? {
            return Ok(handle);
        }

        let contents = wayfarer_world::scatter_zone(zone_id, persona_hint, &self.scatter);
        let record = ZoneRecord {
            zone_id: zone_id.to_owned(),
            seed: zone_id.to_owned(),
            terrain_size: self.scatter.terrain_size,
            props: contents.props,
            personas: contents.personas,
        };

        scene.build_zone(zone_id, &record.entities());

        let event = Event::new(
            EventKind::Zone,
            serde_json::to_value(&record)?,
            vec![Tag::new(TAG_ZONE, zone_id), Tag::new(TAG_SEED, zone_id)],
        );
        let (event_id, created_at) = (event.id, event.created_at);
        log.append(event)?;

        info!(
            zone_id,
            props = record.props.len(),
            personas = record.personas.len(),
            "Generated zone"
        );

        Ok(ZoneHandle {
            status: ZoneStatus::Generated,
            record,
            event_id,
            created_at,
        })
    }

    /// Hand a zone's stored entities to `scene` again.
    pub fn materialize<B: SceneBuilder + ?Sized>(&self, handle: &ZoneHandle, scene: &mut B) {
        scene.build_zone(handle.zone_id(), &handle.record.entities());
    }

    /// Find a collision-free spot for an authored entity.
    ///
    /// Candidates come from one generator seeded from the configured
    /// placement seed and shared by every call, so a given sequence of
    /// inserts always yields the same positions while later inserts keep
    /// drawing fresh candidates. Entities marked `skip_safety_checks` are
    /// accepted where they stand.
    pub fn insert_authored(
        &mut self,
        entity: &mut PlaceableEntity,
        existing: &[PlaceableEntity],
        mask: Option<&PathMask>,
    ) -> PlacementOutcome {
        if entity.skip_safety_checks {
            return PlacementOutcome::Placed {
                x: entity.position.x,
                z: entity.position.z,
            };
        }

        let rng = &mut self.authored_rng;
        if placement::place_with(entity, existing, &self.placement, mask, rng) {
            return PlacementOutcome::Placed {
                x: entity.position.x,
                z: entity.position.z,
            };
        }

        if self.placement.allow_unsafe_fallback {
            let (x, z) = placement::sample_position(rng, &self.placement);
            entity.position.x = x;
            entity.position.z = z;
            warn!(
                category = %entity.category,
                x,
                z,
                "Authored placement exhausted, using unsafe fallback position"
            );
            return PlacementOutcome::Fallback { x, z };
        }

        warn!(
            category = %entity.category,
            max_attempts = self.placement.max_attempts,
            "Authored placement exhausted"
        );
        PlacementOutcome::Exhausted
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use serde_json::json;
    use wayfarer_events::MemoryBlobStore;

    use super::*;
    use crate::scene::SceneManifest;

    #[test]
    fn generates_then_recovers() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        let mut scene = SceneManifest::new();

        let first = coordinator
            .ensure_zone(&mut log, &mut scene, "abc123", None)
            .unwrap();
        assert_eq!(first.status, ZoneStatus::Generated);
        assert_eq!(scene.builds.len(), 1);

        let second = coordinator
            .ensure_zone(&mut log, &mut scene, "abc123", None)
            .unwrap();
        assert_eq!(second.status, ZoneStatus::AlreadyExists);
        assert_eq!(second.record, first.record);
        assert_eq!(second.event_id, first.event_id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(log.by_kind(EventKind::Zone).count(), 1);
        assert_eq!(scene.builds.len(), 1);
    }

    #[test]
    fn zone_event_is_tagged() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        coordinator
            .ensure_zone(&mut log, &mut SceneManifest::new(), "meadow", None)
            .unwrap();
        let event = log.latest_by_tag(EventKind::Zone, TAG_ZONE, "meadow").unwrap();
        assert!(event.has_tag(TAG_SEED, "meadow"));
        assert_eq!(event.content["zone_id"], "meadow");
    }

    #[test]
    fn scene_receives_props_then_personas() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        let mut scene = SceneManifest::new();
        let handle = coordinator
            .ensure_zone(&mut log, &mut scene, "harbor", Some("ferryman"))
            .unwrap();
        let built = scene.latest("harbor").unwrap();
        let props = handle.record.props.len();
        assert_eq!(built.len(), props + handle.record.personas.len());
        assert!(built[..props].iter().all(|e| !e.is_character()));
        assert!(built[props..].iter().all(PlaceableEntity::is_character));
        assert_eq!(handle.record.personas[0].role, "ferryman");
    }

    #[test]
    fn materialize_rebuilds_existing_zone() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        let mut scene = SceneManifest::new();
        coordinator
            .ensure_zone(&mut log, &mut scene, "vale", None)
            .unwrap();
        let existing = coordinator
            .ensure_zone(&mut log, &mut scene, "vale", None)
            .unwrap();
        coordinator.materialize(&existing, &mut scene);
        assert_eq!(scene.builds.len(), 2);
        assert_eq!(scene.builds[0], scene.builds[1]);
    }

    #[test]
    fn empty_zone_id_is_rejected() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        let result = coordinator.ensure_zone(&mut log, &mut SceneManifest::new(), "", None);
        assert!(matches!(result, Err(CoreError::EmptyZoneId)));
        assert!(log.is_empty());
    }

    #[test]
    fn unreadable_record_is_an_error() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::new());
        log.append(Event::new(
            EventKind::Zone,
            json!({ "unexpected": true }),
            vec![Tag::new(TAG_ZONE, "broken")],
        ))
        .unwrap();
        let result = coordinator.ensure_zone(&mut log, &mut SceneManifest::new(), "broken", None);
        assert!(matches!(result, Err(CoreError::ZoneRecord { .. })));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn failed_append_still_counts_for_session() {
        let coordinator = ZoneStateCoordinator::default();
        let mut log = EventLog::load(MemoryBlobStore::with_quota(16));
        let mut scene = SceneManifest::new();
        let result = coordinator.ensure_zone(&mut log, &mut scene, "cliff", None);
        assert!(matches!(result, Err(CoreError::EventLog(_))));
        let again = coordinator
            .ensure_zone(&mut log, &mut scene, "cliff", None)
            .unwrap();
        assert_eq!(again.status, ZoneStatus::AlreadyExists);
    }

    #[test]
    fn authored_insert_places_or_reports() {
        let mut coordinator = ZoneStateCoordinator::default();
        let mut well = PlaceableEntity::new("well");
        let outcome = coordinator.insert_authored(&mut well, &[], None);
        assert!(outcome.is_placed());
        assert_eq!(
            outcome,
            PlacementOutcome::Placed {
                x: well.position.x,
                z: well.position.z
            }
        );

        let blocker = PlaceableEntity::new("tree").with_scale(20.0, 1.0, 20.0);
        let mut hut = PlaceableEntity::new("hut").with_position(1.0, 0.0, 2.0);
        let outcome = coordinator.insert_authored(&mut hut, &[blocker], None);
        assert_eq!(outcome, PlacementOutcome::Exhausted);
        assert_eq!((hut.position.x, hut.position.z), (1.0, 2.0));
    }

    #[test]
    fn authored_insert_fallback() {
        let options = PlacementOptions {
            max_attempts: 2,
            allow_unsafe_fallback: true,
            ..PlacementOptions::default()
        };
        let mut coordinator = ZoneStateCoordinator::new(options, ScatterSettings::default());
        let blocker = PlaceableEntity::new("tree").with_scale(20.0, 1.0, 20.0);
        let mut hut = PlaceableEntity::new("hut");
        let outcome = coordinator.insert_authored(&mut hut, &[blocker], None);
        assert!(matches!(outcome, PlacementOutcome::Fallback { .. }));
        assert!(hut.position.x.abs() <= 20.0);
    }

    #[test]
    fn authored_inserts_keep_drawing_new_candidates() {
        let options = PlacementOptions {
            terrain_size: wayfarer_types::TerrainSize::new(50.0, 50.0),
            npc_buffer_distance: 0.0,
            object_buffer_distance: 0.0,
            ..PlacementOptions::default()
        };
        let mut coordinator = ZoneStateCoordinator::new(options, ScatterSettings::default());
        let mut placed: Vec<PlaceableEntity> = Vec::new();
        for _ in 0..80 {
            let mut pebble = PlaceableEntity::new("pebble").with_scale(0.01, 1.0, 0.01);
            let outcome = coordinator.insert_authored(&mut pebble, &placed, None);
            assert!(outcome.is_placed());
            placed.push(pebble);
        }
        assert_eq!(placed.len(), 80);
        for (i, a) in placed.iter().enumerate() {
            assert!(!placement::check_collision(a, &placed[i + 1..], coordinator.placement_options()));
        }
    }

    #[test]
    fn authored_inserts_are_reproducible() {
        let run = || {
            let mut coordinator = ZoneStateCoordinator::default();
            let mut placed: Vec<PlaceableEntity> = Vec::new();
            for category in ["well", "hut", "shrine"] {
                let mut entity = PlaceableEntity::new(category);
                coordinator.insert_authored(&mut entity, &placed, None);
                placed.push(entity);
            }
            placed
        };
        assert_eq!(run(), run());
    }
}
