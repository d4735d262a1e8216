// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile-space geometry and the algorithms used by rendered-feature queries.

mod intersection;
mod offset;
mod query;

pub use intersection::{
    distance_to_segment_squared, line_intersects_buffered_line, point_intersects_buffered_line,
    polygon_contains_point, polygon_intersects_buffered_multi_line,
};
pub use offset::offset_line;
pub use query::translate_query_geometry;

use crate::kurbo::{Point, Vec2};

/// A line or ring in tile units.
pub type GeometryCoordinates = Vec<Point>;

/// All lines or rings of a feature.
pub type GeometryCollection = Vec<GeometryCoordinates>;

/// `v` scaled to unit length, or zero for a zero-length vector.
pub fn unit(v: Vec2) -> Vec2 {
    let length = v.hypot();
    if length == 0.0 {
        Vec2::ZERO
    } else {
        v / length
    }
}

/// `v` rotated a quarter turn, `(-y, x)`.
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotates `v` counter-clockwise by `angle` radians.
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_of_zero_is_zero() {
        assert_eq!(unit(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(unit(Vec2::new(0.0, -4.0)), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn perp_turns_left() {
        assert_eq!(perp(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
        let r = rotate(Vec2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!((r - Vec2::new(0.0, 1.0)).hypot() < 1e-12);
    }
}
