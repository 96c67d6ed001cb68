//! Overlap tests between shapes, points and rectangles
//!
//! Every gameplay interaction (player vs wall, bullet vs asteroid, player vs
//! key, ...) reduces to one of these boolean tests. Callers react to the
//! result themselves; nothing here resolves velocities.
//!
//! Box vs circle in either order goes through [`circle_rect_overlap`], so
//! there is exactly one implementation of the circle/rectangle test.

use glam::Vec2;

use super::shape::{Shape, ShapeKind};

/// Check whether two shapes overlap
///
/// Dispatches on the pair of kinds. The result is symmetric:
/// `overlaps(a, b) == overlaps(b, a)`.
pub fn overlaps(a: &Shape, b: &Shape) -> bool {
    match (a.kind, b.kind) {
        (ShapeKind::Box { half_extents: ha }, ShapeKind::Box { half_extents: hb }) => {
            aabb_overlap(a.center, ha, b.center, hb)
        }
        (ShapeKind::Circle { radius: ra }, ShapeKind::Circle { radius: rb }) => {
            circle_overlap(a.center, ra, b.center, rb)
        }
        (ShapeKind::Circle { radius }, ShapeKind::Box { half_extents }) => {
            circle_rect_overlap(a.center, radius, b.center, half_extents)
        }
        (ShapeKind::Box { half_extents }, ShapeKind::Circle { radius }) => {
            circle_rect_overlap(b.center, radius, a.center, half_extents)
        }
    }
}

/// Check whether a shape overlaps an axis-aligned rectangle given by its
/// center and full size
pub fn overlaps_rect(shape: &Shape, rect_center: Vec2, width: f32, height: f32) -> bool {
    let rect = Shape::from_size(rect_center, width, height);
    overlaps(shape, &rect)
}

/// Check whether a point lies inside a shape (boundary included)
pub fn point_in(point: Vec2, shape: &Shape) -> bool {
    match shape.kind {
        ShapeKind::Circle { radius } => point_in_circle(point, shape.center, radius),
        ShapeKind::Box { half_extents } => point_in_rect(point, shape.center, half_extents),
    }
}

/// Axis-aligned box test on open intervals
///
/// Boxes that only share an edge do not overlap.
#[inline]
pub fn aabb_overlap(a_center: Vec2, a_half: Vec2, b_center: Vec2, b_half: Vec2) -> bool {
    let (a_min, a_max) = (a_center - a_half, a_center + a_half);
    let (b_min, b_max) = (b_center - b_half, b_center + b_half);

    b_min.x < a_max.x && b_max.x > a_min.x && b_min.y < a_max.y && b_max.y > a_min.y
}

/// Circle vs circle on open intervals
///
/// Circles whose centers are exactly `ra + rb` apart do not overlap.
#[inline]
pub fn circle_overlap(a_center: Vec2, ra: f32, b_center: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a_center.distance_squared(b_center) < reach * reach
}

/// Circle vs axis-aligned rectangle
///
/// 1. Fold the circle center into the rectangle's first quadrant.
/// 2. Too far along either axis: no overlap.
/// 3. Center inside either extended band of the rectangle: overlap.
/// 4. Otherwise only the corner can touch; compare squared corner distance.
pub fn circle_rect_overlap(
    circle_center: Vec2,
    radius: f32,
    rect_center: Vec2,
    rect_half: Vec2,
) -> bool {
    let d = (circle_center - rect_center).abs();

    if d.x > rect_half.x + radius || d.y > rect_half.y + radius {
        return false;
    }

    if d.x <= rect_half.x || d.y <= rect_half.y {
        return true;
    }

    let corner = d - rect_half;
    corner.length_squared() <= radius * radius
}

/// Circle vs rectangle given by full width and height
#[inline]
pub fn circle_rect_overlap_sized(
    circle_center: Vec2,
    radius: f32,
    rect_center: Vec2,
    width: f32,
    height: f32,
) -> bool {
    circle_rect_overlap(
        circle_center,
        radius,
        rect_center,
        Vec2::new(width, height) * 0.5,
    )
}

#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

#[inline]
pub fn point_in_rect(point: Vec2, center: Vec2, half: Vec2) -> bool {
    let (min, max) = (center - half, center + half);
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}
