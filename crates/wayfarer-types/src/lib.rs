//! Shared type definitions for the Wayfarer world-state engine.
//!
//! This crate is the single source of truth for the types exchanged between
//! the event log, the placement solver, and the browser host. Types flow to
//! `TypeScript` via `ts-rs` so the scene layer reads the same shapes.
//!
//! # Modules
//!
//! - [`ids`] -- Random UUID wrapper for event identifiers
//! - [`enums`] -- Event kinds with their integer wire codes, entity roles
//! - [`structs`] -- Events and tags, ground-plane geometry, placeable
//!   entities, and zone payloads

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EntityRole, EventKind, KIND_DIALOG, KIND_PERSONA, KIND_PORTAL, KIND_TRACE, KIND_ZONE,
};
pub use ids::EventId;
pub use structs::{
    Event, Footprint, GroundPoint, PersonaDescriptor, PlaceableEntity, Tag, TerrainSize, Vec3,
    ZoneRecord,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings when export_all is called. The files
        // land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::EventId::export_all();
        let _ = crate::enums::EntityRole::export_all();
        let _ = crate::structs::Tag::export_all();
        let _ = crate::structs::Event::export_all();
        let _ = crate::structs::Vec3::export_all();
        let _ = crate::structs::GroundPoint::export_all();
        let _ = crate::structs::Footprint::export_all();
        let _ = crate::structs::TerrainSize::export_all();
        let _ = crate::structs::PlaceableEntity::export_all();
        let _ = crate::structs::PersonaDescriptor::export_all();
        let _ = crate::structs::ZoneRecord::export_all();
    }
}
