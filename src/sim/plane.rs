//! Wrap-around play field
//!
//! The world is the rectangle the camera sees. World space is y-up:
//! `bottom` is the smallest y, `top` the largest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::consts::{DEFAULT_VIEW_HALF_HEIGHT, DEFAULT_VIEW_HALF_WIDTH};
use crate::positive_or;

/// What the camera sees, in world units
///
/// Extents are measured from the camera center, which is how the map
/// generator derives its tile size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Camera position
    pub center: Vec2,
    /// Distance from the center to the left/right screen edge
    pub half_width: f32,
    /// Distance from the center to the top/bottom screen edge
    pub half_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            half_width: DEFAULT_VIEW_HALF_WIDTH,
            half_height: DEFAULT_VIEW_HALF_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
        }
        .sanitized()
    }

    /// Replace non-positive or non-finite extents with the defaults
    pub fn sanitized(self) -> Self {
        Self {
            center: if self.center.is_finite() {
                self.center
            } else {
                Vec2::ZERO
            },
            half_width: positive_or(self.half_width, DEFAULT_VIEW_HALF_WIDTH),
            half_height: positive_or(self.half_height, DEFAULT_VIEW_HALF_HEIGHT),
        }
    }

    /// Bottom-left corner of the screen in world space
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.center - Vec2::new(self.half_width, self.half_height)
    }
}

/// The rectangle entities wrap around or get culled against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedPlane {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for BoundedPlane {
    fn default() -> Self {
        Self::from_viewport(&Viewport::default())
    }
}

impl BoundedPlane {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            top: bottom.max(top),
            bottom: bottom.min(top),
        }
    }

    pub fn from_viewport(viewport: &Viewport) -> Self {
        let mut plane = Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
        };
        plane.recompute_bounds(viewport);
        plane
    }

    /// Derive the bounds from the viewport (startup and on every resize)
    pub fn recompute_bounds(&mut self, viewport: &Viewport) {
        let viewport = viewport.sanitized();
        self.left = viewport.center.x - viewport.half_width;
        self.right = viewport.center.x + viewport.half_width;
        self.bottom = viewport.center.y - viewport.half_height;
        self.top = viewport.center.y + viewport.half_height;
        log::debug!(
            "Plane bounds: x [{}, {}], y [{}, {}]",
            self.left,
            self.right,
            self.bottom,
            self.top
        );
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Check if a point lies inside the plane (edges included)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }

    /// Teleport a position that left the plane to the opposite edge
    ///
    /// Each axis is corrected once by the overshoot amount. This is not a
    /// modulo: a position more than one plane width past an edge lands
    /// outside the plane again.
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        let mut wrapped = position;

        if position.x < self.left {
            wrapped.x = self.right - (self.left - position.x);
        } else if position.x > self.right {
            wrapped.x = self.left + (position.x - self.right);
        }

        if position.y < self.bottom {
            wrapped.y = self.top - (self.bottom - position.y);
        } else if position.y > self.top {
            wrapped.y = self.bottom + (position.y - self.top);
        }

        wrapped
    }

    /// Check if a shape lies entirely past one of the edges
    ///
    /// Used to despawn things that drifted off screen; shapes that only
    /// straddle an edge are still in bounds.
    pub fn is_out_of_bounds(&self, shape: &Shape) -> bool {
        let (min, max) = (shape.min(), shape.max());
        min.x > self.right || max.x < self.left || min.y > self.top || max.y < self.bottom
    }

    /// Center position that keeps a shape inside the plane
    ///
    /// Axes where the center is already inside are left alone; a center past
    /// an edge is pulled back so the shape rests against that edge.
    pub fn clamp_inside(&self, shape: &Shape) -> Vec2 {
        let half = shape.half_extents();
        let mut center = shape.center;

        if center.x < self.left {
            center.x = self.left + half.x;
        } else if center.x > self.right {
            center.x = self.right - half.x;
        }

        if center.y < self.bottom {
            center.y = self.bottom + half.y;
        } else if center.y > self.top {
            center.y = self.top - half.y;
        }

        center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn plane() -> BoundedPlane {
        BoundedPlane::new(-10.0, 10.0, -10.0, 10.0)
    }

    #[test]
    fn test_recompute_from_viewport() {
        let plane = BoundedPlane::from_viewport(&Viewport::new(Vec2::new(1.0, 2.0), 8.0, 5.0));
        assert_eq!(plane.left, -7.0);
        assert_eq!(plane.right, 9.0);
        assert_eq!(plane.bottom, -3.0);
        assert_eq!(plane.top, 7.0);
        assert_eq!(plane.width(), 16.0);
        assert_eq!(plane.height(), 10.0);
    }

    #[test]
    fn test_invalid_viewport_uses_defaults() {
        let vp = Viewport::new(Vec2::ZERO, -1.0, 0.0);
        assert_eq!(vp.half_width, 1.0);
        assert_eq!(vp.half_height, DEFAULT_VIEW_HALF_HEIGHT);
    }

    #[test]
    fn test_wrap_mirrors_across_plane() {
        let p = plane();

        let w = p.wrap(Vec2::new(-10.0 - EPS, 0.0));
        assert!((w.x - (10.0 - EPS)).abs() < 1e-5);
        assert_eq!(w.y, 0.0);

        let w = p.wrap(Vec2::new(10.5, 0.0));
        assert!((w.x - (-9.5)).abs() < 1e-5);

        let w = p.wrap(Vec2::new(3.0, -10.25));
        assert_eq!(w.x, 3.0);
        assert!((w.y - 9.75).abs() < 1e-5);

        let w = p.wrap(Vec2::new(3.0, 12.0));
        assert!((w.y - (-8.0)).abs() < 1e-5);
    }

    #[test]
    fn test_wrap_leaves_inside_points_alone() {
        let p = plane();
        let inside = Vec2::new(4.0, -7.0);
        assert_eq!(p.wrap(inside), inside);
        assert_eq!(p.wrap(Vec2::new(10.0, -10.0)), Vec2::new(10.0, -10.0));
    }

    #[test]
    fn test_wrap_is_single_step() {
        // 25 units past the right edge of a 20-wide plane stays outside
        let w = plane().wrap(Vec2::new(35.0, 0.0));
        assert_eq!(w.x, 15.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let p = plane();
        assert!(p.is_out_of_bounds(&Shape::circle(Vec2::new(0.0, 15.0), 1.0)));
        assert!(!p.is_out_of_bounds(&Shape::circle(Vec2::new(0.0, 9.0), 1.0)));
        // Straddling the left edge
        assert!(!p.is_out_of_bounds(&Shape::circle(Vec2::new(-10.5, 0.0), 1.0)));
        assert!(p.is_out_of_bounds(&Shape::rect(Vec2::new(-12.0, 0.0), Vec2::ONE)));
    }

    #[test]
    fn test_clamp_inside() {
        let p = plane();
        let key = Shape::circle(Vec2::new(11.0, -12.0), 0.5);
        assert_eq!(p.clamp_inside(&key), Vec2::new(9.5, -9.5));

        let inside = Shape::circle(Vec2::new(2.0, 3.0), 0.5);
        assert_eq!(p.clamp_inside(&inside), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_contains() {
        let p = plane();
        assert!(p.contains(Vec2::new(10.0, 10.0)));
        assert!(!p.contains(Vec2::new(10.1, 0.0)));
    }
}
