//! Footprint intersection tests.
//!
//! Two footprints overlap unless one lies entirely to one side of the other
//! on either axis. Footprints that only share an edge do NOT overlap.

use wayfarer_types::Footprint;

/// Whether two footprints intersect with positive area.
pub fn overlaps(a: &Footprint, b: &Footprint) -> bool {
    let separated = a.max.x <= b.min.x
        || a.min.x >= b.max.x
        || a.max.z <= b.min.z
        || a.min.z >= b.max.z;
    !separated
}

/// Whether `candidate` overlaps `existing` after inflating `existing` by
/// `buffer`.
pub fn overlaps_buffered(candidate: &Footprint, existing: &Footprint, buffer: f64) -> bool {
    overlaps(candidate, &existing.expanded(buffer))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use wayfarer_types::GroundPoint;

    use super::*;

    fn fp(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Footprint {
        Footprint {
            min: GroundPoint::new(min_x, min_z),
            max: GroundPoint::new(max_x, max_z),
        }
    }

    #[test]
    fn disjoint_boxes() {
        assert!(!overlaps(&fp(0.0, 0.0, 1.0, 1.0), &fp(5.0, 5.0, 6.0, 6.0)));
    }

    #[test]
    fn nested_boxes_overlap() {
        assert!(overlaps(&fp(0.0, 0.0, 10.0, 10.0), &fp(4.0, 4.0, 5.0, 5.0)));
    }

    #[test]
    fn touching_edge_is_not_overlap() {
        let a = fp(0.0, 0.0, 2.0, 2.0);
        let right = fp(2.0, 0.0, 4.0, 2.0);
        let above = fp(0.0, 2.0, 2.0, 4.0);
        let corner = fp(2.0, 2.0, 4.0, 4.0);
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &above));
        assert!(!overlaps(&a, &corner));
    }

    #[test]
    fn buffer_turns_touching_into_overlap() {
        let a = fp(0.0, 0.0, 2.0, 2.0);
        let b = fp(2.0, 0.0, 4.0, 2.0);
        assert!(overlaps_buffered(&a, &b, 0.5));
        assert!(!overlaps_buffered(&a, &b, 0.0));
        assert!(!overlaps_buffered(&a, &b, -3.0));
    }

    #[test]
    fn overlap_is_symmetric() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            assert_eq!(overlaps(&a, &b), overlaps(&b, &a), "{a:?} vs {b:?}");
        }
    }

    fn random_box(rng: &mut SmallRng) -> Footprint {
        // Snap to a coarse grid so shared edges come up often.
        let x = f64::from(rng.random_range(-10_i32..10));
        let z = f64::from(rng.random_range(-10_i32..10));
        let w = f64::from(rng.random_range(0_i32..6));
        let d = f64::from(rng.random_range(0_i32..6));
        fp(x, z, x + w, z + d)
    }
}
