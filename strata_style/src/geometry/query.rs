// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{rotate, GeometryCoordinates};
use crate::kurbo::{Point, Vec2};
use crate::TranslateAnchor;

/// Moves a query polygon into the space of geometry drawn with a paint translate.
///
/// `translate` is in pixels, `bearing` in radians. Viewport-anchored translations
/// follow the screen, so they are rotated back into map space first. Returns
/// `None` when there is no translation.
pub fn translate_query_geometry(
    query: &[Point],
    translate: [f32; 2],
    anchor: TranslateAnchor,
    bearing: f64,
    pixels_to_tile_units: f64,
) -> Option<GeometryCoordinates> {
    if translate == [0.0, 0.0] {
        return None;
    }
    let mut offset = Vec2::new(f64::from(translate[0]), f64::from(translate[1]));
    if anchor == TranslateAnchor::Viewport {
        offset = rotate(offset, -bearing);
    }
    let offset = offset * pixels_to_tile_units;
    Some(query.iter().map(|&p| p - offset).collect())
}
