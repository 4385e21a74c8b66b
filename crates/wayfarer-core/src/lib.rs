//! Zone coordination and configuration for the Wayfarer world-state engine.
//!
//! This crate ties the spatial layer to the event log. Zones are generated
//! once from their id, stored as Zone events, and recovered from the log on
//! every later request. Portals, visits, personas, and dialog are journaled
//! the same way.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `wayfarer-config.yaml` into
//!   strongly-typed structs.
//! - [`coordinator`] -- [`ZoneStateCoordinator`]: idempotent zone creation,
//!   re-materialization, and authored placement.
//! - [`journal`] -- Portal, visit, persona, and dialog events and their
//!   queries.
//! - [`scene`] -- The [`SceneBuilder`] collaborator trait.
//! - [`error`] -- Error types for coordination.
//!
//! [`SceneBuilder`]: scene::SceneBuilder

pub mod config;
pub mod coordinator;
pub mod error;
pub mod journal;
pub mod scene;

// Re-export primary types at crate root.
pub use config::{ConfigError, WayfarerConfig};
pub use coordinator::{PlacementOutcome, ZoneHandle, ZoneStateCoordinator, ZoneStatus};
pub use error::CoreError;
pub use scene::{NoOpScene, SceneBuilder, SceneManifest};
