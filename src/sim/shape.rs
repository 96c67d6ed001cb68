//! Collision footprints attached to positioned entities
//!
//! A shape is either an axis-aligned box (center + half extents) or a circle
//! (center + radius). Sizes are always strictly positive; constructors and
//! setters repair bad input instead of rejecting it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_EXTENT;
use crate::positive_or;

/// Geometry of a shape, independent of where it sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Axis-aligned box
    Box { half_extents: Vec2 },
    /// Circle
    Circle { radius: f32 },
}

/// A positioned collision footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub center: Vec2,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            kind: ShapeKind::Circle {
                radius: positive_or(radius, DEFAULT_EXTENT),
            },
        }
    }

    pub fn rect(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            kind: ShapeKind::Box {
                half_extents: sanitize_extents(half_extents),
            },
        }
    }

    /// Box from a full width and height
    pub fn from_size(center: Vec2, width: f32, height: f32) -> Self {
        Self::rect(center, Vec2::new(width, height) * 0.5)
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        matches!(self.kind, ShapeKind::Circle { .. })
    }

    /// Half extents of the bounding box (a circle reports `(r, r)`)
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        match self.kind {
            ShapeKind::Box { half_extents } => half_extents,
            ShapeKind::Circle { radius } => Vec2::splat(radius),
        }
    }

    /// Bottom-left corner of the bounding box
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents()
    }

    /// Top-right corner of the bounding box
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents()
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Set the radius. A box becomes a square with that half extent.
    pub fn set_radius(&mut self, radius: f32) {
        let radius = positive_or(radius, DEFAULT_EXTENT);
        self.kind = match self.kind {
            ShapeKind::Circle { .. } => ShapeKind::Circle { radius },
            ShapeKind::Box { .. } => ShapeKind::Box {
                half_extents: Vec2::splat(radius),
            },
        };
    }

    /// Set the half extents. A circle takes the mean of the two components.
    pub fn set_half_extents(&mut self, half_extents: Vec2) {
        let half_extents = sanitize_extents(half_extents);
        self.kind = match self.kind {
            ShapeKind::Box { .. } => ShapeKind::Box { half_extents },
            ShapeKind::Circle { .. } => ShapeKind::Circle {
                radius: (half_extents.x + half_extents.y) * 0.5,
            },
        };
    }

    /// Multiply every extent by `factor` (used on level rescale)
    pub fn rescale(&mut self, factor: f32) {
        let factor = positive_or(factor, 1.0);
        self.kind = match self.kind {
            ShapeKind::Circle { radius } => ShapeKind::Circle {
                radius: radius * factor,
            },
            ShapeKind::Box { half_extents } => ShapeKind::Box {
                half_extents: half_extents * factor,
            },
        };
    }

    /// Same footprint moved to a new center
    #[inline]
    pub fn at(self, center: Vec2) -> Self {
        Self { center, ..self }
    }
}

fn sanitize_extents(half_extents: Vec2) -> Vec2 {
    Vec2::new(
        positive_or(half_extents.x, DEFAULT_EXTENT),
        positive_or(half_extents.y, DEFAULT_EXTENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_bounds() {
        let c = Shape::circle(Vec2::new(1.0, 2.0), 0.5);
        assert!(c.is_circle());
        assert_eq!(c.min(), Vec2::new(0.5, 1.5));
        assert_eq!(c.max(), Vec2::new(1.5, 2.5));
    }

    #[test]
    fn test_rect_from_size() {
        let b = Shape::from_size(Vec2::ZERO, 4.0, 2.0);
        assert!(!b.is_circle());
        assert_eq!(b.half_extents(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_invalid_extents_are_repaired() {
        let c = Shape::circle(Vec2::ZERO, -2.0);
        assert_eq!(c.kind, ShapeKind::Circle { radius: 2.0 });

        let c = Shape::circle(Vec2::ZERO, 0.0);
        assert_eq!(c.kind, ShapeKind::Circle { radius: DEFAULT_EXTENT });

        let b = Shape::rect(Vec2::ZERO, Vec2::new(0.0, f32::NAN));
        assert_eq!(b.half_extents(), Vec2::splat(DEFAULT_EXTENT));
    }

    #[test]
    fn test_setters_keep_kind() {
        let mut c = Shape::circle(Vec2::ZERO, 1.0);
        c.set_half_extents(Vec2::new(1.0, 3.0));
        assert_eq!(c.kind, ShapeKind::Circle { radius: 2.0 });

        let mut b = Shape::rect(Vec2::ZERO, Vec2::ONE);
        b.set_radius(0.25);
        assert_eq!(b.half_extents(), Vec2::splat(0.25));
        assert!(!b.is_circle());
    }

    #[test]
    fn test_rescale() {
        let mut b = Shape::rect(Vec2::ZERO, Vec2::new(1.0, 2.0));
        b.rescale(2.0);
        assert_eq!(b.half_extents(), Vec2::new(2.0, 4.0));

        // Zero factor is ignored
        b.rescale(0.0);
        assert_eq!(b.half_extents(), Vec2::new(2.0, 4.0));
    }
}
