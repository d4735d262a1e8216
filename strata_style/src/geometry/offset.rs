// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{perp, unit, GeometryCollection};
use crate::kurbo::Vec2;

/// Joins sharper than this are not miter-scaled.
const MIN_COS_HALF_ANGLE: f64 = 1e-6;

/// Offsets every ring of `rings` perpendicular to its direction by `offset`,
/// using miter joins so the offset distance holds on both sides of each vertex.
///
/// Returns `None` when `offset` is zero, meaning the input is unchanged.
pub fn offset_line(rings: &GeometryCollection, offset: f64) -> Option<GeometryCollection> {
    if offset == 0.0 {
        return None;
    }

    let offset_rings = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .enumerate()
                .map(|(i, &p)| {
                    let a_to_b = match i.checked_sub(1) {
                        Some(prev) => perp(unit(p - ring[prev])),
                        None => Vec2::ZERO,
                    };
                    let b_to_c = match ring.get(i + 1) {
                        Some(&next) => perp(unit(next - p)),
                        None => Vec2::ZERO,
                    };
                    // At ring ends only one side is defined; measure against that one.
                    let reference = if b_to_c == Vec2::ZERO { a_to_b } else { b_to_c };

                    let mut extrude = unit(a_to_b + b_to_c);
                    if extrude == Vec2::ZERO {
                        // The line doubles back on itself.
                        extrude = reference;
                    }

                    let cos_half_angle = extrude.dot(reference);
                    if cos_half_angle.abs() > MIN_COS_HALF_ANGLE {
                        extrude /= cos_half_angle;
                    } else if reference != Vec2::ZERO {
                        log::warn!("Degenerate join at {p:?}, offsetting without miter scale");
                    }

                    p + extrude * offset
                })
                .collect()
        })
        .collect();

    Some(offset_rings)
}
