//! Prefab-to-tile scaling
//!
//! Every level has its own tile size, so each prefab's sprite scale and
//! collision radius are recomputed on level transitions. The ratios live in
//! a [`ScaleProfile`] and the authored sprite sizes in a [`PrefabCatalog`];
//! [`PrefabScales::for_tile`] combines both for one tile size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::positive_or;
use crate::sim::Shape;

/// Authored size of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteMetrics {
    /// Collision radius set on the prefab. Positive means "measure the
    /// sprite", zero means unset, negative is taken by magnitude.
    pub authored_radius: f32,
    /// Sprite bounds at unit scale
    pub native_size: Vec2,
    /// Whether the entity collides as a circle (otherwise a box)
    pub circle: bool,
}

impl SpriteMetrics {
    pub fn circle(authored_radius: f32, native_size: Vec2) -> Self {
        Self {
            authored_radius,
            native_size,
            circle: true,
        }
    }

    pub fn rect(authored_radius: f32, native_size: Vec2) -> Self {
        Self {
            authored_radius,
            native_size,
            circle: false,
        }
    }
}

impl Default for SpriteMetrics {
    fn default() -> Self {
        Self::rect(0.5, Vec2::ONE)
    }
}

/// Scale that makes a sprite span one tile of `tile_size` half extent
pub fn scale_to_tile(metrics: &SpriteMetrics, tile_size: f32) -> Vec2 {
    let tile_size = positive_or(tile_size, 1.0);

    let mut radius = metrics.authored_radius;
    if radius > 0.0 {
        radius = (metrics.native_size.x + metrics.native_size.y) * 0.5;
    } else if radius == 0.0 {
        radius = tile_size * 0.5;
    } else if radius < 0.0 {
        radius = radius.abs();
    }
    if !(radius > 0.0 && radius.is_finite()) {
        radius = 1.0;
    }

    Vec2::splat(2.0 * tile_size / radius)
}

/// Prefab size ratios relative to the tile size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleProfile {
    pub player: f32,
    /// Relative to the player
    pub bullet: f32,
    pub key: f32,
    /// Radius of the open door's collision circle
    pub open_door: f32,
    pub asteroid: f32,
    /// Small and chaser asteroids, relative to large ones
    pub small_asteroid: f32,
}

impl Default for ScaleProfile {
    fn default() -> Self {
        Self {
            player: 0.8,
            bullet: 0.35,
            key: 0.75,
            open_door: 0.2,
            asteroid: 1.3,
            small_asteroid: 0.34,
        }
    }
}

impl ScaleProfile {
    /// Replace non-positive or non-finite ratios with the defaults
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            player: positive_or(self.player, d.player),
            bullet: positive_or(self.bullet, d.bullet),
            key: positive_or(self.key, d.key),
            open_door: positive_or(self.open_door, d.open_door),
            asteroid: positive_or(self.asteroid, d.asteroid),
            small_asteroid: positive_or(self.small_asteroid, d.small_asteroid),
        }
    }
}

/// Sprite metrics for every prefab group
///
/// Groups with variants (floors, walls, asteroids) keep one entry per
/// variant, in the order the renderer picks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefabCatalog {
    pub floors: Vec<SpriteMetrics>,
    pub walls: Vec<SpriteMetrics>,
    pub door: SpriteMetrics,
    pub open_door: SpriteMetrics,
    pub key: SpriteMetrics,
    pub player: SpriteMetrics,
    pub bullet: SpriteMetrics,
    pub large_asteroids: Vec<SpriteMetrics>,
    pub small_asteroids: Vec<SpriteMetrics>,
    pub chaser_asteroids: Vec<SpriteMetrics>,
}

impl Default for PrefabCatalog {
    fn default() -> Self {
        let tile = SpriteMetrics::default();
        let round = SpriteMetrics::circle(0.5, Vec2::ONE);
        Self {
            floors: vec![tile],
            walls: vec![tile],
            door: tile,
            open_door: round,
            key: round,
            player: round,
            bullet: round,
            large_asteroids: vec![round],
            small_asteroids: vec![round],
            chaser_asteroids: vec![round],
        }
    }
}

/// Sprite scale and collision size of a prefab at the current tile size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledPrefab {
    pub scale: Vec2,
    /// Circle radius, or half extent of a square box
    pub radius: f32,
    pub circle: bool,
}

impl ScaledPrefab {
    fn new(metrics: &SpriteMetrics, scale: Vec2, radius: f32) -> Self {
        Self {
            scale,
            radius,
            circle: metrics.circle,
        }
    }

    /// Collision shape of an instance placed at `center`
    pub fn shape_at(&self, center: Vec2) -> Shape {
        if self.circle {
            Shape::circle(center, self.radius)
        } else {
            Shape::rect(center, Vec2::splat(self.radius))
        }
    }
}

/// All prefab scales for one tile size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabScales {
    pub units_per_tile: f32,
    pub floors: Vec<ScaledPrefab>,
    pub walls: Vec<ScaledPrefab>,
    pub door: ScaledPrefab,
    pub open_door: ScaledPrefab,
    pub key: ScaledPrefab,
    pub player: ScaledPrefab,
    pub bullet: ScaledPrefab,
    pub large_asteroids: Vec<ScaledPrefab>,
    pub small_asteroids: Vec<ScaledPrefab>,
    pub chaser_asteroids: Vec<ScaledPrefab>,
}

impl PrefabScales {
    pub fn for_tile(units_per_tile: f32, catalog: &PrefabCatalog, profile: &ScaleProfile) -> Self {
        let u = positive_or(units_per_tile, 1.0);
        let profile = profile.sanitized();

        // Sized relative to the tile by `ratio`, sprite scale and radius alike
        let relative = |metrics: &SpriteMetrics, ratio: f32| {
            ScaledPrefab::new(metrics, scale_to_tile(metrics, u) * ratio, u * ratio)
        };
        let tiles = |group: &[SpriteMetrics]| -> Vec<ScaledPrefab> {
            group.iter().map(|m| relative(m, 1.0)).collect()
        };
        let asteroids = |group: &[SpriteMetrics], ratio: f32| -> Vec<ScaledPrefab> {
            group.iter().map(|m| relative(m, ratio)).collect()
        };

        let key_size = u * profile.key;
        let bullet_ratio = profile.player * profile.bullet;
        let small_ratio = profile.asteroid * profile.small_asteroid;

        log::debug!("Rescaling prefabs for units_per_tile {}", u);

        Self {
            units_per_tile: u,
            floors: tiles(&catalog.floors),
            walls: tiles(&catalog.walls),
            door: relative(&catalog.door, 1.0),
            open_door: ScaledPrefab::new(
                &catalog.open_door,
                scale_to_tile(&catalog.open_door, u),
                u * profile.open_door,
            ),
            key: ScaledPrefab::new(&catalog.key, scale_to_tile(&catalog.key, key_size), key_size),
            player: relative(&catalog.player, profile.player),
            bullet: relative(&catalog.bullet, bullet_ratio),
            large_asteroids: asteroids(&catalog.large_asteroids, profile.asteroid),
            small_asteroids: asteroids(&catalog.small_asteroids, small_ratio),
            chaser_asteroids: asteroids(&catalog.chaser_asteroids, small_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn test_scale_measures_sprite_when_radius_set() {
        let m = SpriteMetrics::rect(0.5, Vec2::new(2.0, 4.0));
        // radius = mean size 3, scale = 2 * 1.5 / 3
        assert!(approx(scale_to_tile(&m, 1.5), Vec2::ONE));
    }

    #[test]
    fn test_scale_unset_radius_uses_half_tile() {
        let m = SpriteMetrics::rect(0.0, Vec2::new(9.0, 9.0));
        // radius = 1, scale = 2 * 2 / 1
        assert!(approx(scale_to_tile(&m, 2.0), Vec2::splat(4.0)));
    }

    #[test]
    fn test_scale_negative_radius_uses_magnitude() {
        let m = SpriteMetrics::circle(-2.0, Vec2::ONE);
        assert!(approx(scale_to_tile(&m, 2.0), Vec2::splat(2.0)));
    }

    #[test]
    fn test_scale_degenerate_sprite_falls_back() {
        let m = SpriteMetrics::circle(1.0, Vec2::ZERO);
        assert!(approx(scale_to_tile(&m, 0.5), Vec2::ONE));

        let m = SpriteMetrics::circle(1.0, Vec2::splat(f32::NAN));
        assert!(approx(scale_to_tile(&m, 0.5), Vec2::ONE));
    }

    #[test]
    fn test_profile_sanitized() {
        let p = ScaleProfile {
            player: 0.0,
            bullet: -0.5,
            key: f32::NAN,
            ..ScaleProfile::default()
        }
        .sanitized();
        assert_eq!(p.player, 0.8);
        assert_eq!(p.bullet, 0.5);
        assert_eq!(p.key, 0.75);
    }

    #[test]
    fn test_prefab_radii_follow_ratios() {
        let s = PrefabScales::for_tile(0.5, &PrefabCatalog::default(), &ScaleProfile::default());

        assert!((s.player.radius - 0.4).abs() < EPS);
        assert!((s.bullet.radius - 0.5 * 0.8 * 0.35).abs() < EPS);
        assert!((s.key.radius - 0.375).abs() < EPS);
        assert!((s.open_door.radius - 0.1).abs() < EPS);
        assert!((s.door.radius - 0.5).abs() < EPS);
        assert!((s.large_asteroids[0].radius - 0.65).abs() < EPS);
        assert!((s.small_asteroids[0].radius - 0.5 * 1.3 * 0.34).abs() < EPS);
        assert_eq!(s.small_asteroids, s.chaser_asteroids);
        assert_eq!(s.floors.len(), 1);
    }

    #[test]
    fn test_prefab_scales_follow_ratios() {
        let s = PrefabScales::for_tile(0.5, &PrefabCatalog::default(), &ScaleProfile::default());
        // Default sprites are 1x1 with a measured radius of 1: base scale is 2 * 0.5
        assert!(approx(s.walls[0].scale, Vec2::ONE));
        assert!(approx(s.player.scale, Vec2::splat(0.8)));
        assert!(approx(s.key.scale, Vec2::splat(0.75)));
        assert!(approx(s.large_asteroids[0].scale, Vec2::splat(1.3)));
    }

    #[test]
    fn test_shape_at_matches_bounds() {
        let s = PrefabScales::for_tile(1.0, &PrefabCatalog::default(), &ScaleProfile::default());

        let wall = s.walls[0].shape_at(Vec2::new(3.0, 1.0));
        assert!(!wall.is_circle());
        assert_eq!(wall.half_extents(), Vec2::ONE);

        let player = s.player.shape_at(Vec2::ZERO);
        assert!(player.is_circle());
        assert!((player.half_extents().x - 0.8).abs() < EPS);
    }

    #[test]
    fn test_bad_tile_size_is_repaired() {
        let s = PrefabScales::for_tile(f32::NAN, &PrefabCatalog::default(), &ScaleProfile::default());
        assert_eq!(s.units_per_tile, 1.0);
        assert!(s.player.radius.is_finite());
    }
}
