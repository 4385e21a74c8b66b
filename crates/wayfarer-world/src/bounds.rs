//! Ground-plane footprints for placeable entities.
//!
//! Every category maps to a base `(width, depth)` in world units:
//!
//! | Category                                            | Base footprint   |
//! |-----------------------------------------------------|------------------|
//! | anything unlisted                                   | 2 x 2            |
//! | `tree`, `pine`, `oak`, `birch`, `bush`              | 3 x 3            |
//! | `hut`, `well`, `shrine`, `tent`                     | 4 x 4            |
//! | `tower`                                             | 5 x 5            |
//! | `house`                                             | 6 x 5            |
//! | `hall`, `temple`                                    | 8 x 6            |
//! | `stone_circle`, `stone_circle_thin`, `ring`, `portal_ring` | `2r x 2r` |
//!
//! Ring categories default to `r = 2.5` when no radius is given. The base is
//! multiplied by the entity's x/z scale and centered on its x/z position.
//! Unknown categories are not an error.

use wayfarer_types::{Footprint, PlaceableEntity};

/// Footprint for categories missing from the table.
pub const DEFAULT_FOOTPRINT: (f64, f64) = (2.0, 2.0);

/// Radius used by ring categories that do not declare one.
pub const DEFAULT_RING_RADIUS: f64 = 2.5;

/// Base `(category, width, depth)` table.
const FOOTPRINT_TABLE: &[(&str, f64, f64)] = &[
    ("tree", 3.0, 3.0),
    ("pine", 3.0, 3.0),
    ("oak", 3.0, 3.0),
    ("birch", 3.0, 3.0),
    ("bush", 3.0, 3.0),
    ("hut", 4.0, 4.0),
    ("well", 4.0, 4.0),
    ("shrine", 4.0, 4.0),
    ("tent", 4.0, 4.0),
    ("tower", 5.0, 5.0),
    ("house", 6.0, 5.0),
    ("hall", 8.0, 6.0),
    ("temple", 8.0, 6.0),
];

/// Categories whose footprint is derived from a radius.
const RING_CATEGORIES: &[&str] = &["stone_circle", "stone_circle_thin", "ring", "portal_ring"];

/// Whether the category is ring-shaped.
pub fn is_ring_category(category: &str) -> bool {
    RING_CATEGORIES.contains(&category)
}

/// Unscaled `(width, depth)` for a category.
pub fn base_footprint(category: &str, radius: Option<f64>) -> (f64, f64) {
    if is_ring_category(category) {
        let diameter = 2.0 * radius.unwrap_or(DEFAULT_RING_RADIUS);
        return (diameter, diameter);
    }
    FOOTPRINT_TABLE
        .iter()
        .find(|(name, _, _)| *name == category)
        .map_or(DEFAULT_FOOTPRINT, |&(_, w, d)| (w, d))
}

/// Resolve the footprint of an entity at its current position.
pub fn resolve(entity: &PlaceableEntity) -> Footprint {
    resolve_at(entity, entity.position.x, entity.position.z)
}

/// Resolve the footprint the entity would have if it stood at `(x, z)`.
pub fn resolve_at(entity: &PlaceableEntity, x: f64, z: f64) -> Footprint {
    let (width, depth) = base_footprint(&entity.category, entity.radius);
    Footprint::centered(x, z, width * entity.scale.x, depth * entity.scale.z)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use wayfarer_types::GroundPoint;

    use super::*;

    #[test]
    fn unknown_category_uses_default() {
        assert_eq!(base_footprint("lantern", None), DEFAULT_FOOTPRINT);
        assert_eq!(base_footprint("npc_plain", None), DEFAULT_FOOTPRINT);
    }

    #[test]
    fn trees_are_three_by_three() {
        assert_eq!(base_footprint("tree", None), (3.0, 3.0));
        assert_eq!(base_footprint("pine", Some(10.0)), (3.0, 3.0));
    }

    #[test]
    fn large_structures() {
        assert_eq!(base_footprint("hall", None), (8.0, 6.0));
        assert_eq!(base_footprint("hut", None), (4.0, 4.0));
    }

    #[test]
    fn ring_uses_radius() {
        assert_eq!(base_footprint("stone_circle_thin", Some(1.0)), (2.0, 2.0));
        assert_eq!(base_footprint("stone_circle", None), (5.0, 5.0));
    }

    #[test]
    fn resolve_centers_and_scales() {
        let entity = PlaceableEntity::new("tree")
            .with_position(10.0, 3.0, -4.0)
            .with_scale(2.0, 9.0, 1.0);
        let fp = resolve(&entity);
        assert_eq!(fp.min, GroundPoint::new(7.0, -5.5));
        assert_eq!(fp.max, GroundPoint::new(13.0, -2.5));
    }

    #[test]
    fn resolve_at_ignores_current_position() {
        let entity = PlaceableEntity::new("hall").with_position(100.0, 0.0, 100.0);
        let fp = resolve_at(&entity, 0.0, 0.0);
        assert_eq!(fp.min, GroundPoint::new(-4.0, -3.0));
        assert_eq!(fp.max, GroundPoint::new(4.0, 3.0));
    }

    #[test]
    fn negative_scale_keeps_invariant() {
        let entity = PlaceableEntity::new("tree").with_scale(-1.0, 1.0, -2.0);
        let fp = resolve(&entity);
        assert!(fp.min.x <= fp.max.x);
        assert!(fp.min.z <= fp.max.z);
        assert_eq!(fp.width(), 3.0);
        assert_eq!(fp.depth(), 6.0);
    }
}
