//! Asteroid Maze - tile maps and collision for a screen-wrapping survival game
//!
//! Core modules:
//! - `sim`: Shapes, collision tests and the wrap-around play field
//! - `map`: Procedural tile grid generation (walls, door, spacing rules)
//! - `scaling`: Prefab-to-tile scaling for level transitions
//! - `level`: Level transition orchestrator
//! - `settings`: Data-driven configuration

pub mod level;
pub mod map;
pub mod scaling;
pub mod settings;
pub mod sim;

pub use level::LevelManager;
pub use map::{Grid, LevelType, MapGenerator, Tile, WallReport};
pub use settings::Settings;
pub use sim::{BoundedPlane, Shape, ShapeKind, Viewport, overlaps, point_in};

/// Game configuration constants
pub mod consts {
    /// Map height used when the requested one is too small
    pub const DEFAULT_MAP_HEIGHT: i32 = 16;
    /// Smallest map height the generator accepts
    pub const MIN_MAP_HEIGHT: i32 = 3;
    /// Largest map height the generator accepts
    pub const MAX_MAP_HEIGHT: i32 = 1024;
    /// Smallest map width (leaves one interior column for the door)
    pub const MIN_MAP_WIDTH: usize = 3;
    /// Largest map width, for very wide viewports
    pub const MAX_MAP_WIDTH: usize = 4096;
    /// Maps narrower than this get no wall segments
    pub const MIN_WALL_MAP_WIDTH: usize = 5;

    /// Rejection-sampling budget when looking for a free wall start cell
    pub const WALL_PLACEMENT_ATTEMPTS: u32 = 2000;

    /// The difficulty-introduction level
    pub const WALL_INTRO_LEVEL: u32 = 2;
    /// Row of the full-width wall on the introduction level
    pub const WALL_INTRO_ROW: usize = 3;
    /// Door row on the introduction level
    pub const WALL_INTRO_DOOR_ROW: usize = 2;
    /// Lowest spawn row on the introduction level
    pub const WALL_INTRO_SPAWN_ROW: usize = 4;

    /// Map height bounds used by level progression
    pub const PROGRESSION_MIN_HEIGHT: i32 = 7;
    pub const PROGRESSION_MAX_HEIGHT: i32 = 20;

    /// Extent substituted for zero or non-finite shape sizes
    pub const DEFAULT_EXTENT: f32 = 0.5;

    /// Default world-space half extents of the camera view
    pub const DEFAULT_VIEW_HALF_WIDTH: f32 = 8.888_889;
    pub const DEFAULT_VIEW_HALF_HEIGHT: f32 = 5.0;
}

/// Replace a size that must be strictly positive.
///
/// Negative values keep their magnitude, zero and non-finite values fall back.
#[inline]
pub fn positive_or(value: f32, fallback: f32) -> f32 {
    if !value.is_finite() || value == 0.0 {
        fallback
    } else {
        value.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_or() {
        assert_eq!(positive_or(2.0, 1.0), 2.0);
        assert_eq!(positive_or(-3.0, 1.0), 3.0);
        assert_eq!(positive_or(0.0, 1.0), 1.0);
        assert_eq!(positive_or(f32::NAN, 1.0), 1.0);
        assert_eq!(positive_or(f32::INFINITY, 1.0), 1.0);
    }
}
