//! Deterministic spatial layer for the Wayfarer world-state engine.
//!
//! This crate turns seeds into reproducible sequences, entities into
//! ground-plane footprints, and candidate positions into collision-free
//! placements. Nothing here touches storage or the event log.
//!
//! # Modules
//!
//! - [`seeded`] -- [`Seed`] reduction and the [`SeededSequence`] linear
//!   congruential generator.
//! - [`bounds`] -- Category footprint table and footprint resolution.
//! - [`overlap`] -- Strict rectangle intersection with buffer inflation.
//! - [`path_mask`] -- Alpha raster lookups for walkways.
//! - [`placement`] -- Bounded-retry collision-aware placement, single and
//!   batch.
//! - [`scatter`] -- Seeded procedural zone props and personas.
//! - [`error`] -- Error types for raster construction.

pub mod bounds;
pub mod error;
pub mod overlap;
pub mod path_mask;
pub mod placement;
pub mod scatter;
pub mod seeded;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use path_mask::PathMask;
pub use placement::{BatchPlacement, BufferRule, PlacementOptions, check_collision, place, place_all};
pub use scatter::{ScatterSettings, ZoneContents, scatter_zone};
pub use seeded::{Seed, SeededSequence};
