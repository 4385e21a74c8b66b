//! Procedural zone contents.
//!
//! A zone's props and personas are drawn from a [`SeededSequence`] seeded
//! with the zone id, so the same id always produces the same zone. Props are
//! scattered without collision checks; placement with clearance is the
//! business of [`placement`](crate::placement).
//!
//! Draw order is part of the output contract and must not change:
//!
//! 1. prop count;
//! 2. per prop: category, x, z, scale;
//! 3. persona count;
//! 4. per persona: role, name, color, x, z.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wayfarer_types::{PersonaDescriptor, PlaceableEntity, TerrainSize, Vec3};

use crate::placement::DEFAULT_MARGIN;
use crate::seeded::{Seed, SeededSequence};

/// Prop categories a generated zone draws from.
pub const PROP_CATEGORIES: &[&str] = &[
    "tree", "pine", "oak", "birch", "bush", "rock", "stump", "flower", "mushroom", "hut", "well",
    "shrine",
];

/// Persona roles a generated zone draws from.
pub const PERSONA_ROLES: &[&str] = &[
    "wanderer", "merchant", "scholar", "guard", "hermit", "bard", "smith", "herbalist",
];

const NAME_PREFIXES: &[&str] = &["Al", "Bri", "Cor", "Da", "El", "Fen", "Gar", "Hal", "Isa", "Jor"];
const NAME_SUFFIXES: &[&str] = &["dric", "wen", "mir", "tha", "ric", "lin", "vo", "sa", "nor", "ek"];

/// Largest 24-bit RGB value.
const MAX_COLOR: u32 = 0x00ff_ffff;

/// Tunables for zone generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSettings {
    /// Extents of the zone terrain.
    pub terrain_size: TerrainSize,
    /// Keep-out border from the terrain edge.
    pub margin: f64,
    /// Inclusive lower bound on props per zone.
    pub min_props: u32,
    /// Inclusive upper bound on props per zone.
    pub max_props: u32,
    /// Inclusive lower bound on personas per zone.
    pub min_personas: u32,
    /// Inclusive upper bound on personas per zone.
    pub max_personas: u32,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            terrain_size: TerrainSize::default(),
            margin: DEFAULT_MARGIN,
            min_props: 20,
            max_props: 39,
            min_personas: 2,
            max_personas: 3,
        }
    }
}

/// Everything generated for one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneContents {
    /// Scattered props.
    pub props: Vec<PlaceableEntity>,
    /// Generated personas.
    pub personas: Vec<PersonaDescriptor>,
}

/// Generate the contents of `zone_id`.
///
/// When `persona_hint` is given it becomes the first persona's role; the
/// role draw still happens so the rest of the sequence is unaffected.
pub fn scatter_zone(
    zone_id: &str,
    persona_hint: Option<&str>,
    settings: &ScatterSettings,
) -> ZoneContents {
    let mut rng = SeededSequence::new(&Seed::from(zone_id));
    let hx = (settings.terrain_size.width / 2.0 - settings.margin).max(0.0);
    let hz = (settings.terrain_size.depth / 2.0 - settings.margin).max(0.0);

    let prop_count = rng.next_int(settings.min_props, settings.max_props);
    let props: Vec<PlaceableEntity> = (0..prop_count)
        .map(|_| {
            let category = rng.pick(PROP_CATEGORIES).copied().unwrap_or("rock");
            let x = rng.next_range(-hx, hx);
            let z = rng.next_range(-hz, hz);
            let s = rng.next_range(0.8, 1.4);
            PlaceableEntity::new(category)
                .with_position(x, 0.0, z)
                .with_scale(s, s, s)
        })
        .collect();

    let persona_count = rng.next_int(settings.min_personas, settings.max_personas);
    let personas: Vec<PersonaDescriptor> = (0..persona_count)
        .map(|index| {
            let drawn_role = rng.pick(PERSONA_ROLES).copied().unwrap_or("wanderer");
            let role = match persona_hint {
                Some(hint) if index == 0 => hint,
                _ => drawn_role,
            };
            let prefix = rng.pick(NAME_PREFIXES).copied().unwrap_or_default();
            let suffix = rng.pick(NAME_SUFFIXES).copied().unwrap_or_default();
            let color = format!("#{:06x}", rng.next_int(0, MAX_COLOR));
            let x = rng.next_range(-hx, hx);
            let z = rng.next_range(-hz, hz);
            PersonaDescriptor {
                name: format!("{prefix}{suffix}"),
                role: role.to_owned(),
                color,
                position: Vec3::new(x, 0.0, z),
            }
        })
        .collect();

    debug!(
        zone_id,
        props = props.len(),
        personas = personas.len(),
        "Scattered zone contents"
    );

    ZoneContents { props, personas }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn same_zone_same_contents() {
        let settings = ScatterSettings::default();
        assert_eq!(
            scatter_zone("abc123", None, &settings),
            scatter_zone("abc123", None, &settings)
        );
    }

    #[test]
    fn different_zones_differ() {
        let settings = ScatterSettings::default();
        assert_ne!(
            scatter_zone("abc123", None, &settings).props,
            scatter_zone("xyz789", None, &settings).props
        );
    }

    #[test]
    fn counts_within_bounds() {
        let settings = ScatterSettings::default();
        for id in ["a", "b", "meadow", "old-forest", "zone-42", ""] {
            let zone = scatter_zone(id, None, &settings);
            assert!((20..=39).contains(&zone.props.len()), "{id}");
            assert!((2..=3).contains(&zone.personas.len()), "{id}");
        }
    }

    #[test]
    fn props_stay_inside_margin() {
        let zone = scatter_zone("bounds", None, &ScatterSettings::default());
        for prop in &zone.props {
            assert!(prop.position.x.abs() <= 20.0);
            assert!(prop.position.z.abs() <= 20.0);
            assert!(PROP_CATEGORIES.contains(&prop.category.as_str()));
            assert!(!prop.is_character());
        }
    }

    #[test]
    fn hint_sets_first_role_only() {
        let settings = ScatterSettings::default();
        let plain = scatter_zone("harbor", None, &settings);
        let hinted = scatter_zone("harbor", Some("ferryman"), &settings);
        assert_eq!(hinted.personas[0].role, "ferryman");
        assert_eq!(hinted.personas[0].name, plain.personas[0].name);
        assert_eq!(hinted.props, plain.props);
        assert_eq!(hinted.personas[1..], plain.personas[1..]);
    }

    #[test]
    fn colors_are_hex() {
        let zone = scatter_zone("palette", None, &ScatterSettings::default());
        for persona in &zone.personas {
            assert_eq!(persona.color.len(), 7);
            assert!(persona.color.starts_with('#'));
            assert!(persona.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
