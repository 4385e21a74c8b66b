//! Collision-aware placement of generated entities.
//!
//! The solver draws seeded random candidate positions inside the terrain
//! (minus a keep-out margin) and accepts the first candidate whose
//! footprint clears every already-placed entity's buffered footprint. The
//! search is bounded by [`PlacementOptions::max_attempts`]; exhausting the
//! budget is reported, never hidden.
//!
//! # Buffers
//!
//! Characters keep other entities further away than props do. For each
//! pairwise check the solver inflates the *existing* entity's footprint by
//! a buffer chosen by [`BufferRule`]. The default,
//! [`BufferRule::ExistingOnly`], uses only the existing entity's role: a
//! prop may be placed close to another prop even when the newcomer is a
//! character, while established characters keep their wider clearance.
//!
//! # Batches
//!
//! [`place_all`] is greedy and sequential. Entities are placed in input
//! order and each success becomes an obstacle for the rest. Order is the
//! caller's responsibility; there is no backtracking.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wayfarer_types::{EntityRole, Footprint, PlaceableEntity, TerrainSize};

use crate::bounds;
use crate::overlap;
use crate::path_mask::{self, PathMask};
use crate::seeded::{Seed, SeededSequence};

/// Default attempt budget per entity.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
/// Default keep-out border from the terrain edge.
pub const DEFAULT_MARGIN: f64 = 5.0;
/// Default clearance around characters.
pub const DEFAULT_NPC_BUFFER: f64 = 3.0;
/// Default clearance around props.
pub const DEFAULT_OBJECT_BUFFER: f64 = 1.0;

/// How the candidate's and the existing entity's buffers combine into the
/// single inflation applied to the existing footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferRule {
    /// Use the existing entity's buffer only.
    #[default]
    ExistingOnly,
    /// Use the candidate's buffer only.
    CandidateOnly,
    /// Use the larger of the two buffers.
    Larger,
    /// Add both buffers.
    Sum,
}

impl BufferRule {
    /// Combine the two per-role buffers into one inflation distance.
    pub fn combine(self, existing: f64, candidate: f64) -> f64 {
        match self {
            Self::ExistingOnly => existing,
            Self::CandidateOnly => candidate,
            Self::Larger => existing.max(candidate),
            Self::Sum => existing + candidate,
        }
    }
}

/// Tunables for one placement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementOptions {
    /// Candidate positions tried per entity.
    pub max_attempts: u32,
    /// Extents of the terrain, centered on the origin.
    pub terrain_size: TerrainSize,
    /// Keep-out border from the terrain edge.
    pub margin: f64,
    /// Clearance around characters.
    pub npc_buffer_distance: f64,
    /// Clearance around props.
    pub object_buffer_distance: f64,
    /// Reject candidates on paths unless the entity overrides it.
    pub avoid_paths: bool,
    /// Seed for candidate sampling.
    pub seed: Seed,
    /// Buffer combination rule.
    pub buffer_rule: BufferRule,
    /// On exhaustion, place at a random position without any collision
    /// guarantee instead of failing.
    pub allow_unsafe_fallback: bool,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            terrain_size: TerrainSize::default(),
            margin: DEFAULT_MARGIN,
            npc_buffer_distance: DEFAULT_NPC_BUFFER,
            object_buffer_distance: DEFAULT_OBJECT_BUFFER,
            avoid_paths: true,
            seed: Seed::default(),
            buffer_rule: BufferRule::default(),
            allow_unsafe_fallback: false,
        }
    }
}

impl PlacementOptions {
    /// Clearance associated with an entity role.
    pub const fn buffer_for(&self, role: EntityRole) -> f64 {
        match role {
            EntityRole::Character => self.npc_buffer_distance,
            EntityRole::Prop => self.object_buffer_distance,
        }
    }

    /// Inflation applied to `existing` when testing `candidate` against it.
    pub fn pair_buffer(&self, candidate: &PlaceableEntity, existing: &PlaceableEntity) -> f64 {
        self.buffer_rule
            .combine(self.buffer_for(existing.role), self.buffer_for(candidate.role))
    }

    /// Half-extents `(x, z)` of the sampling square. Never negative.
    pub fn sampling_half_extent(&self) -> (f64, f64) {
        (
            (self.terrain_size.width / 2.0 - self.margin).max(0.0),
            (self.terrain_size.depth / 2.0 - self.margin).max(0.0),
        )
    }
}

/// Result of a [`place_all`] batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlacement {
    /// Entities that were placed, in input order.
    pub placed: Vec<PlaceableEntity>,
    /// Entities that exhausted their attempts and were dropped.
    pub failed: Vec<PlaceableEntity>,
    /// How many of `placed` came from the unsafe fallback.
    pub fallbacks: usize,
}

/// Whether `candidate`, at its current position, collides with any of
/// `existing` under the buffers in `options`.
pub fn check_collision(
    candidate: &PlaceableEntity,
    existing: &[PlaceableEntity],
    options: &PlacementOptions,
) -> bool {
    collides(&bounds::resolve(candidate), candidate, existing, options)
}

/// Search for a free position for `entity`.
///
/// On success the entity's x/z are updated (y is preserved) and `true` is
/// returned. On exhaustion the entity is left untouched and `false` is
/// returned. Sampling is seeded from `options.seed`.
pub fn place(
    entity: &mut PlaceableEntity,
    existing: &[PlaceableEntity],
    options: &PlacementOptions,
    mask: Option<&PathMask>,
) -> bool {
    let mut rng = SeededSequence::new(&options.seed);
    place_with(entity, existing, options, mask, &mut rng)
}

/// [`place`] drawing candidates from a caller-owned generator.
pub fn place_with(
    entity: &mut PlaceableEntity,
    existing: &[PlaceableEntity],
    options: &PlacementOptions,
    mask: Option<&PathMask>,
    rng: &mut SeededSequence,
) -> bool {
    for attempt in 0..options.max_attempts {
        let (x, z) = sample_position(rng, options);

        if mask.is_some_and(|m| !path_allows(entity, options, m, x, z)) {
            continue;
        }

        let footprint = bounds::resolve_at(entity, x, z);
        if !collides(&footprint, entity, existing, options) {
            entity.position.x = x;
            entity.position.z = z;
            debug!(
                category = %entity.category,
                attempt,
                x,
                z,
                "Placed entity"
            );
            return true;
        }
    }
    false
}

/// Place a batch in order, growing the obstacle set as entities succeed.
///
/// Entities marked with `skip_safety_checks` keep their position and still
/// become obstacles. One generator seeded from `options.seed` is shared
/// across the whole batch.
pub fn place_all(
    entities: Vec<PlaceableEntity>,
    existing: &[PlaceableEntity],
    options: &PlacementOptions,
    mask: Option<&PathMask>,
) -> BatchPlacement {
    let mut rng = SeededSequence::new(&options.seed);
    let mut obstacles: Vec<PlaceableEntity> = existing.to_vec();
    let first_placed = obstacles.len();
    let mut failed = Vec::new();
    let mut fallbacks: usize = 0;

    for mut entity in entities {
        if entity.skip_safety_checks {
            obstacles.push(entity);
            continue;
        }

        if place_with(&mut entity, &obstacles, options, mask, &mut rng) {
            obstacles.push(entity);
        } else if options.allow_unsafe_fallback {
            let (x, z) = sample_position(&mut rng, options);
            entity.position.x = x;
            entity.position.z = z;
            warn!(
                category = %entity.category,
                max_attempts = options.max_attempts,
                x,
                z,
                "Placement exhausted, using unsafe fallback position"
            );
            fallbacks = fallbacks.saturating_add(1);
            obstacles.push(entity);
        } else {
            warn!(
                category = %entity.category,
                max_attempts = options.max_attempts,
                "Placement exhausted, dropping entity"
            );
            failed.push(entity);
        }
    }

    let placed = obstacles.split_off(first_placed);
    BatchPlacement {
        placed,
        failed,
        fallbacks,
    }
}

/// Draw an unconstrained candidate position inside the sampling square.
pub fn sample_position(rng: &mut SeededSequence, options: &PlacementOptions) -> (f64, f64) {
    let (hx, hz) = options.sampling_half_extent();
    let x = rng.next_range(-hx, hx);
    let z = rng.next_range(-hz, hz);
    (x, z)
}

/// Whether the path mask allows `entity` to stand at `(x, z)`.
fn path_allows(
    entity: &PlaceableEntity,
    options: &PlacementOptions,
    mask: &PathMask,
    x: f64,
    z: f64,
) -> bool {
    let on_path = mask.is_on_path(x, z);
    if path_mask::prefers_paths(&entity.category) {
        return on_path;
    }
    let avoid = entity.avoid_paths.unwrap_or(options.avoid_paths);
    !(avoid && on_path)
}

fn collides(
    footprint: &Footprint,
    candidate: &PlaceableEntity,
    existing: &[PlaceableEntity],
    options: &PlacementOptions,
) -> bool {
    existing.iter().any(|other| {
        let buffer = options.pair_buffer(candidate, other);
        overlap::overlaps_buffered(footprint, &bounds::resolve(other), buffer)
    })
}
