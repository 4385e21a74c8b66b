//! Raster lookup for authored walkways.
//!
//! A [`PathMask`] is the alpha channel of an image laid over the terrain.
//! Pixel `(0, 0)` covers the terrain corner at `(-width/2, -depth/2)`;
//! x grows with the column and z with the row. A ground point is on a path
//! when the alpha under it is at least [`PATH_ALPHA_THRESHOLD`]. Points
//! outside the covered terrain are off-path.

use wayfarer_types::TerrainSize;

use crate::error::WorldError;

/// Minimum alpha value counted as path.
pub const PATH_ALPHA_THRESHOLD: u8 = 128;

/// Categories that only belong on a path.
const PATH_PREFERRING_CATEGORIES: &[&str] = &["lamp_post", "signpost", "bench", "path_marker"];

/// Whether entities of this category must land on a path.
pub fn prefers_paths(category: &str) -> bool {
    PATH_PREFERRING_CATEGORIES.contains(&category)
}

/// Read-only alpha raster covering a terrain patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    terrain: TerrainSize,
}

impl PathMask {
    /// Build a mask from one alpha byte per pixel, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyPathMask`] for a zero dimension,
    /// [`WorldError::PathMaskSize`] if `alpha.len() != width * height`, or
    /// [`WorldError::InvalidTerrain`] for a non-positive terrain size.
    pub fn from_alpha(
        width: u32,
        height: u32,
        alpha: Vec<u8>,
        terrain: TerrainSize,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyPathMask { width, height });
        }
        let expected = u64::from(width).saturating_mul(u64::from(height));
        if u64::try_from(alpha.len()).ok() != Some(expected) {
            return Err(WorldError::PathMaskSize {
                expected,
                actual: alpha.len(),
            });
        }
        if !(terrain.width > 0.0 && terrain.depth > 0.0) {
            return Err(WorldError::InvalidTerrain {
                width: terrain.width,
                depth: terrain.depth,
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
            terrain,
        })
    }

    /// Build a mask from RGBA pixel data, keeping only the alpha channel.
    ///
    /// # Errors
    ///
    /// Same as [`PathMask::from_alpha`]; the RGBA buffer must hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: &[u8],
        terrain: TerrainSize,
    ) -> Result<Self, WorldError> {
        let expected = u64::from(width)
            .saturating_mul(u64::from(height))
            .saturating_mul(4);
        if u64::try_from(rgba.len()).ok() != Some(expected) {
            return Err(WorldError::PathMaskSize {
                expected,
                actual: rgba.len(),
            });
        }
        let alpha = rgba.chunks_exact(4).filter_map(|px| px.get(3).copied()).collect();
        Self::from_alpha(width, height, alpha, terrain)
    }

    /// Raster width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Terrain extents the raster covers.
    pub const fn terrain(&self) -> TerrainSize {
        self.terrain
    }

    /// Alpha under the ground point, or `None` outside the covered terrain.
    pub fn alpha_at(&self, x: f64, z: f64) -> Option<u8> {
        let column = to_pixel(x, self.terrain.width, self.width)?;
        let row = to_pixel(z, self.terrain.depth, self.height)?;
        let index = u64::from(row)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(column))?;
        self.alpha.get(usize::try_from(index).ok()?).copied()
    }

    /// Whether the ground point lies on a path.
    pub fn is_on_path(&self, x: f64, z: f64) -> bool {
        self.alpha_at(x, z)
            .is_some_and(|a| a >= PATH_ALPHA_THRESHOLD)
    }
}

/// Map a world coordinate on an axis of length `extent` (centered on the
/// origin) to a pixel index in `[0, pixels)`.
fn to_pixel(coord: f64, extent: f64, pixels: u32) -> Option<u32> {
    let t = (coord + extent / 2.0) / extent;
    if !(0.0..1.0).contains(&t) {
        return None;
    }
    // t is in [0, 1), so the product is in [0, pixels).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (t * f64::from(pixels)).floor() as u32;
    Some(index.min(pixels.saturating_sub(1)))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    /// 4x4 mask over a 40x40 terrain with a path along the second column
    /// (x in [-10, 0)).
    fn column_mask() -> PathMask {
        let mut alpha = vec![0_u8; 16];
        for row in 0..4 {
            alpha[row * 4 + 1] = 255;
        }
        PathMask::from_alpha(4, 4, alpha, TerrainSize::new(40.0, 40.0)).unwrap()
    }

    #[test]
    fn samples_path_column() {
        let mask = column_mask();
        assert!(mask.is_on_path(-5.0, 0.0));
        assert!(mask.is_on_path(-9.9, 19.0));
        assert!(!mask.is_on_path(5.0, 0.0));
        assert!(!mask.is_on_path(-15.0, 0.0));
    }

    #[test]
    fn outside_terrain_is_off_path() {
        let mask = column_mask();
        assert_eq!(mask.alpha_at(-5.0, 20.0), None);
        assert_eq!(mask.alpha_at(-25.0, 0.0), None);
        assert!(!mask.is_on_path(-5.0, -20.1));
    }

    #[test]
    fn threshold_is_inclusive() {
        let terrain = TerrainSize::new(2.0, 2.0);
        let on = PathMask::from_alpha(1, 1, vec![PATH_ALPHA_THRESHOLD], terrain).unwrap();
        let off = PathMask::from_alpha(1, 1, vec![PATH_ALPHA_THRESHOLD - 1], terrain).unwrap();
        assert!(on.is_on_path(0.0, 0.0));
        assert!(!off.is_on_path(0.0, 0.0));
    }

    #[test]
    fn rgba_keeps_alpha_channel() {
        let rgba = [10, 20, 30, 200, 1, 2, 3, 4];
        let mask = PathMask::from_rgba(2, 1, &rgba, TerrainSize::new(2.0, 2.0)).unwrap();
        assert_eq!(mask.alpha_at(-0.5, 0.0), Some(200));
        assert_eq!(mask.alpha_at(0.5, 0.0), Some(4));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let terrain = TerrainSize::new(10.0, 10.0);
        assert!(matches!(
            PathMask::from_alpha(0, 4, vec![], terrain),
            Err(WorldError::EmptyPathMask { .. })
        ));
        assert!(matches!(
            PathMask::from_alpha(2, 2, vec![0; 3], terrain),
            Err(WorldError::PathMaskSize { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            PathMask::from_rgba(2, 2, &[0; 15], terrain),
            Err(WorldError::PathMaskSize { expected: 16, .. })
        ));
        assert!(matches!(
            PathMask::from_alpha(1, 1, vec![0], TerrainSize::new(0.0, 10.0)),
            Err(WorldError::InvalidTerrain { .. })
        ));
    }

    #[test]
    fn path_preferring_categories() {
        assert!(prefers_paths("lamp_post"));
        assert!(!prefers_paths("tree"));
    }
}
