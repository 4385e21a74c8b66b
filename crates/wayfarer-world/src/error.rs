//! Error types for the `wayfarer-world` crate.
//!
//! Placement exhaustion is not an error: the solver reports it through its
//! return value. The only fallible operation here is building a
//! [`PathMask`](crate::path_mask::PathMask) from raw raster data.

/// Errors that can occur while constructing world inputs.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The raster has a zero width or height.
    #[error("path mask must be non-empty (got {width}x{height})")]
    EmptyPathMask {
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
    },

    /// The pixel buffer does not match the declared dimensions.
    #[error("path mask buffer has {actual} bytes, expected {expected}")]
    PathMaskSize {
        /// Expected byte length.
        expected: u64,
        /// Actual byte length.
        actual: usize,
    },

    /// The terrain size covered by the mask is not strictly positive.
    #[error("path mask terrain size must be positive (got {width} x {depth})")]
    InvalidTerrain {
        /// Terrain width.
        width: f64,
        /// Terrain depth.
        depth: f64,
    },
}
