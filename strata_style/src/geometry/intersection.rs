// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersection tests between query polygons and rendered lines.

use crate::kurbo::Point;

/// Squared distance from `p` to the segment `v`–`w`.
pub fn distance_to_segment_squared(p: Point, v: Point, w: Point) -> f64 {
    let segment = w - v;
    let length_squared = segment.hypot2();
    if length_squared == 0.0 {
        return (p - v).hypot2();
    }
    let t = (p - v).dot(segment) / length_squared;
    if t < 0.0 {
        return (p - v).hypot2();
    }
    if t > 1.0 {
        return (p - w).hypot2();
    }
    (p - v.lerp(w, t)).hypot2()
}

/// Ray-casting containment test. `polygon` may be open or closed.
pub fn polygon_contains_point(polygon: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut previous = match polygon.last() {
        Some(&last) => last,
        None => return false,
    };
    for &current in polygon {
        if (current.y > p.y) != (previous.y > p.y)
            && p.x < (previous.x - current.x) * (p.y - current.y) / (previous.y - current.y) + current.x
        {
            inside = !inside;
        }
        previous = current;
    }
    inside
}

/// Whether `p` lies strictly within `radius` of any segment of `line`.
pub fn point_intersects_buffered_line(p: Point, line: &[Point], radius: f64) -> bool {
    let radius_squared = radius * radius;
    match line {
        [] => false,
        [only] => (p - *only).hypot2() < radius_squared,
        _ => line
            .windows(2)
            .any(|s| distance_to_segment_squared(p, s[0], s[1]) < radius_squared),
    }
}

fn is_counter_clockwise(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

fn segments_intersect(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    is_counter_clockwise(a0, b0, b1) != is_counter_clockwise(a1, b0, b1)
        && is_counter_clockwise(a0, a1, b0) != is_counter_clockwise(a0, a1, b1)
}

fn lines_intersect(a: &[Point], b: &[Point]) -> bool {
    a.windows(2)
        .any(|sa| b.windows(2).any(|sb| segments_intersect(sa[0], sa[1], sb[0], sb[1])))
}

/// Whether `a` crosses `b`, or comes within `radius` of it.
pub fn line_intersects_buffered_line(a: &[Point], b: &[Point], radius: f64) -> bool {
    if a.len() > 1 && b.len() > 1 && lines_intersect(a, b) {
        return true;
    }
    b.iter().any(|&p| point_intersects_buffered_line(p, a, radius))
        || a.iter().any(|&p| point_intersects_buffered_line(p, b, radius))
}

/// Whether any line of `lines`, buffered by `radius`, touches `polygon`.
pub fn polygon_intersects_buffered_multi_line(
    polygon: &[Point],
    lines: &[Vec<Point>],
    radius: f64,
) -> bool {
    lines.iter().any(|line| {
        (polygon.len() >= 3 && line.iter().any(|&p| polygon_contains_point(polygon, p)))
            || line_intersects_buffered_line(polygon, line, radius)
    })
}
