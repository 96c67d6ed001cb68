//! Geometry shared by every gameplay interaction
//!
//! This module must stay pure and deterministic:
//! - No hidden global state (bounds live in a `BoundedPlane` value)
//! - Boolean overlap answers only, no collision response
//! - No rendering or platform dependencies

pub mod collision;
pub mod plane;
pub mod shape;

pub use collision::{
    aabb_overlap, circle_overlap, circle_rect_overlap, circle_rect_overlap_sized, overlaps,
    overlaps_rect, point_in, point_in_circle, point_in_rect,
};
pub use plane::{BoundedPlane, Viewport};
pub use shape::{Shape, ShapeKind};
