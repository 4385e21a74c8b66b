//! The scene-construction collaborator.
//!
//! The coordinator never renders anything. It hands finished entity
//! descriptors to a [`SceneBuilder`], which may be a renderer, a network
//! bridge to the browser host, or a test double.

use wayfarer_types::PlaceableEntity;

/// Receives the entities of a zone for scene construction.
pub trait SceneBuilder {
    /// Build (or rebuild) the scene for `zone_id` from `entities`.
    fn build_zone(&mut self, zone_id: &str, entities: &[PlaceableEntity]);
}

/// A scene builder that records every build request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneManifest {
    /// `(zone_id, entities)` per build call, in call order.
    pub builds: Vec<(String, Vec<PlaceableEntity>)>,
}

impl SceneManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities of the most recent build for `zone_id`.
    pub fn latest(&self, zone_id: &str) -> Option<&[PlaceableEntity]> {
        self.builds
            .iter()
            .rev()
            .find(|(id, _)| id == zone_id)
            .map(|(_, entities)| entities.as_slice())
    }
}

impl SceneBuilder for SceneManifest {
    fn build_zone(&mut self, zone_id: &str, entities: &[PlaceableEntity]) {
        self.builds.push((zone_id.to_owned(), entities.to_vec()));
    }
}

/// A scene builder that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpScene;

impl SceneBuilder for NoOpScene {
    fn build_zone(&mut self, _zone_id: &str, _entities: &[PlaceableEntity]) {}
}
