// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing of uploaded line buckets.

use strata_style::geometry::rotate;
use strata_style::kurbo::Vec2;
use strata_style::TranslateAnchor;

use crate::gl::{ColorMode, Context, DepthMode, DrawMode, StencilMode};
use crate::{
    Error, LineBucket, LineLayer, LineProgram, LineUniforms, OverscaledTileId, RenderPass, Result,
};

/// View state a tile is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParameters {
    /// Tile units to clip space for the tile being drawn, column-major.
    pub matrix: [f32; 16],
    pub zoom: f64,
    /// Map rotation in radians.
    pub bearing: f64,
    /// Viewport size in pixels.
    pub viewport_size: [f32; 2],
}

/// Draws every segment of `bucket` as styled by `layer`.
///
/// Layers which render nothing this frame are skipped. Fails with
/// [`Error::NotUploaded`] when the bucket or its paint data has not been
/// uploaded.
pub fn draw_line(
    context: &mut Context,
    program: &mut LineProgram,
    bucket: &mut LineBucket,
    layer: &LineLayer,
    tile_id: OverscaledTileId,
    parameters: &RenderParameters,
) -> Result<()> {
    if layer.render_pass() == RenderPass::None {
        return Ok(());
    }
    let (Some(vertex_buffer), Some(index_buffer)) = (&bucket.vertex_buffer, &bucket.index_buffer)
    else {
        return Err(Error::NotUploaded);
    };

    let paint = layer.evaluated_paint();
    let pixels_to_tile_units = tile_id.pixels_to_tile_units(1.0, parameters.zoom);
    let [width, height] = parameters.viewport_size;
    let uniforms = LineUniforms {
        matrix: translated_matrix(
            &parameters.matrix,
            paint.translate,
            paint.translate_anchor,
            parameters.bearing,
            pixels_to_tile_units,
        ),
        ratio: (1.0 / pixels_to_tile_units) as f32,
        width: paint.width,
        gl_units_to_pixels: [width / 2.0, -height / 2.0],
    };
    let paint_attribute_values = bucket.paint_data.attribute_values()?;

    program.draw(
        context,
        DrawMode::Triangles,
        DepthMode::read_only([0.0, 1.0]),
        StencilMode::Disabled,
        ColorMode::alpha_blended(),
        &uniforms,
        vertex_buffer,
        index_buffer,
        &mut bucket.segments,
        &paint_attribute_values,
    )
}

/// `matrix` followed by the paint translation, converted from pixels to tile
/// units.
fn translated_matrix(
    matrix: &[f32; 16],
    translate: [f32; 2],
    anchor: TranslateAnchor,
    bearing: f64,
    pixels_to_tile_units: f64,
) -> [f32; 16] {
    if translate == [0.0, 0.0] {
        return *matrix;
    }
    let mut offset = Vec2::new(f64::from(translate[0]), f64::from(translate[1]));
    if anchor == TranslateAnchor::Viewport {
        offset = rotate(offset, -bearing);
    }
    let (x, y) = (
        (offset.x * pixels_to_tile_units) as f32,
        (offset.y * pixels_to_tile_units) as f32,
    );
    let mut translated = *matrix;
    for row in 0..4 {
        translated[12 + row] = matrix[row] * x + matrix[4 + row] * y + matrix[12 + row];
    }
    translated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{Command, UniformValue};
    use crate::{BucketParameters, CanonicalTileId, ProgramParameters};
    use strata_style::geometry::GeometryCollection;
    use strata_style::kurbo::Point;
    use strata_style::{
        CascadeParameters, Feature, FeatureType, GeometryTileLayer, LinearFeatureIndex,
        PropertyEvaluationParameters, PropertyValue, Transitionable, Value,
    };

    const IDENTITY: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    struct Street;

    impl Feature for Street {
        fn feature_type(&self) -> FeatureType {
            FeatureType::LineString
        }

        fn value(&self, _: &str) -> Option<Value> {
            None
        }

        fn geometries(&self) -> GeometryCollection {
            vec![vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]]
        }
    }

    fn parameters() -> RenderParameters {
        RenderParameters {
            matrix: IDENTITY,
            zoom: 14.0,
            bearing: 0.0,
            viewport_size: [800.0, 600.0],
        }
    }

    fn layer(width: f32) -> LineLayer {
        let mut layer = LineLayer::new("streets", "transportation");
        layer.paint.width = Transitionable::new(PropertyValue::from(width));
        layer.cascade(&CascadeParameters::default());
        layer.evaluate(&PropertyEvaluationParameters::new(14.0));
        layer
    }

    struct Streets;

    impl GeometryTileLayer for Streets {
        fn name(&self) -> &str {
            "transportation"
        }

        fn feature_count(&self) -> usize {
            1
        }

        fn feature(&self, index: usize) -> Option<&dyn Feature> {
            (index == 0).then_some(&Street as &dyn Feature)
        }
    }

    fn bucket(layer: &LineLayer) -> LineBucket {
        layer.create_bucket(BucketParameters {
            tile_id: tile(),
            layer: &Streets,
            feature_index: &mut LinearFeatureIndex::new(),
        })
    }

    fn tile() -> OverscaledTileId {
        CanonicalTileId { z: 14, x: 0, y: 0 }.into()
    }

    #[test]
    fn translation_moves_the_origin() {
        let translated = translated_matrix(&IDENTITY, [3.0, 4.0], TranslateAnchor::Map, 1.0, 2.0);
        assert_eq!(translated[12..], [6.0, 8.0, 0.0, 1.0]);
        assert_eq!(translated[..12], IDENTITY[..12]);
        assert_eq!(
            translated_matrix(&IDENTITY, [0.0, 0.0], TranslateAnchor::Viewport, 1.0, 2.0),
            IDENTITY
        );

        let rotated = translated_matrix(
            &IDENTITY,
            [0.0, 4.0],
            TranslateAnchor::Viewport,
            std::f64::consts::FRAC_PI_2,
            1.0,
        );
        assert!((rotated[12] - 4.0).abs() < 1e-6);
        assert!(rotated[13].abs() < 1e-6);
    }

    #[test]
    fn invisible_layers_draw_nothing() {
        let mut context = Context::default();
        let mut program = LineProgram::new(&mut context, &ProgramParameters::default()).unwrap();
        let layer = layer(0.0);
        let mut bucket = bucket(&layer);
        bucket.upload(&mut context).unwrap();
        draw_line(&mut context, &mut program, &mut bucket, &layer, tile(), &parameters()).unwrap();
        assert_eq!(
            context
                .recording()
                .count(|c| matches!(c, Command::DrawElements { .. })),
            0
        );
    }

    #[test]
    fn buckets_must_be_uploaded() {
        let mut context = Context::default();
        let mut program = LineProgram::new(&mut context, &ProgramParameters::default()).unwrap();
        let layer = layer(2.0);
        let mut bucket = bucket(&layer);
        let result = draw_line(&mut context, &mut program, &mut bucket, &layer, tile(), &parameters());
        assert_eq!(result, Err(Error::NotUploaded));
    }

    #[test]
    fn draws_segments_with_line_uniforms() {
        let mut context = Context::default();
        let mut program = LineProgram::new(&mut context, &ProgramParameters::default()).unwrap();
        let layer = layer(2.0);
        let mut bucket = bucket(&layer);
        bucket.upload(&mut context).unwrap();
        context.take_recording();

        draw_line(&mut context, &mut program, &mut bucket, &layer, tile(), &parameters()).unwrap();
        let recording = context.take_recording();
        assert!(recording.iter().any(|c| *c
            == Command::DrawElements {
                mode: DrawMode::Triangles,
                index_offset: 0,
                index_length: 6,
            }));
        assert!(recording.iter().any(|c| *c
            == Command::Uniform {
                location: 2,
                value: UniformValue::Float(2.0),
            }));
        // At the tile's own zoom a pixel is 16 tile units.
        assert!(recording.iter().any(|c| *c
            == Command::Uniform {
                location: 1,
                value: UniformValue::Float(1.0 / 16.0),
            }));
        assert!(recording.iter().any(|c| *c
            == Command::Uniform {
                location: 3,
                value: UniformValue::Vec2([400.0, -300.0]),
            }));
        assert!(recording.iter().any(|c| *c == Command::SetColorMode(ColorMode::alpha_blended())));

        // Nothing changed, so the second frame only draws.
        draw_line(&mut context, &mut program, &mut bucket, &layer, tile(), &parameters()).unwrap();
        let recording = context.take_recording();
        assert_eq!(recording.len(), 1);
        assert!(matches!(recording.iter().next(), Some(Command::DrawElements { .. })));
    }
}
