//! Headless scene builder.
//!
//! The engine has no renderer. [`TracingScene`] stands in for one by
//! logging what would be built, grouped by category.

use std::collections::BTreeMap;

use tracing::{debug, info};
use wayfarer_core::SceneBuilder;
use wayfarer_types::PlaceableEntity;

/// Scene builder that logs a per-category summary of each zone.
#[derive(Debug, Default)]
pub struct TracingScene {
    zones_built: usize,
}

impl TracingScene {
    /// Number of build requests received.
    pub const fn zones_built(&self) -> usize {
        self.zones_built
    }
}

impl SceneBuilder for TracingScene {
    fn build_zone(&mut self, zone_id: &str, entities: &[PlaceableEntity]) {
        self.zones_built = self.zones_built.saturating_add(1);

        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for entity in entities {
            let count = by_category.entry(entity.category.as_str()).or_default();
            *count = count.saturating_add(1);
        }
        let characters = entities.iter().filter(|e| e.is_character()).count();

        info!(
            zone_id,
            entities = entities.len(),
            characters,
            categories = ?by_category,
            "Scene built"
        );
        for entity in entities.iter().filter(|e| e.is_character()) {
            debug!(
                zone_id,
                name = entity.name.as_deref().unwrap_or("unnamed"),
                x = entity.position.x,
                z = entity.position.z,
                "Character placed"
            );
        }
    }
}
