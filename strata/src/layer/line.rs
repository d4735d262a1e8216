// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use strata_style::geometry::{
    offset_line, polygon_intersects_buffered_multi_line, translate_query_geometry,
    GeometryCollection,
};
use strata_style::kurbo::Point;
use strata_style::{
    each_filtered_feature, CascadeParameters, Color, Filter, PropertyEvaluationParameters,
};

use super::line_properties::TransitioningLinePaint;
use super::{BucketParameters, RenderPass};
use crate::{
    EvaluatedLineLayout, EvaluatedLinePaint, LineBucket, LineLayoutProperties,
    LinePaintProperties, PaintBinder, PaintData, PaintPropertyBinder, LINE_PAINT_ATTRIBUTES,
};

/// A style layer drawing the line strings and polygon outlines of one source
/// layer.
///
/// Each frame, [`cascade`](Self::cascade) picks up edits to [`paint`](Self::paint)
/// and [`evaluate`](Self::evaluate) resolves the properties at the current zoom.
/// The evaluated state then drives bucket construction, drawing and queries.
#[derive(Debug)]
pub struct LineLayer {
    id: String,
    source_layer: String,
    filter: Filter,
    pub layout: LineLayoutProperties,
    pub paint: LinePaintProperties,
    transitioning: TransitioningLinePaint,
    evaluated_layout: EvaluatedLineLayout,
    evaluated: EvaluatedLinePaint,
    render_pass: RenderPass,
}

impl LineLayer {
    pub fn new(id: impl Into<String>, source_layer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_layer: source_layer.into(),
            filter: Filter::all(),
            layout: LineLayoutProperties::default(),
            paint: LinePaintProperties::default(),
            transitioning: TransitioningLinePaint::default(),
            evaluated_layout: EvaluatedLineLayout::default(),
            evaluated: EvaluatedLinePaint::default(),
            render_pass: RenderPass::None,
        }
    }

    /// Only features accepted by `filter` are drawn.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_layer(&self) -> &str {
        &self.source_layer
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn cascade(&mut self, parameters: &CascadeParameters) {
        self.transitioning.cascade(&self.paint, parameters);
    }

    /// Resolves the layer's properties at `parameters`.
    ///
    /// Returns whether a transition is still running, in which case the layer
    /// needs evaluating again next frame.
    pub fn evaluate(&mut self, parameters: &PropertyEvaluationParameters) -> bool {
        self.evaluated_layout = self.layout.evaluate(parameters);
        self.evaluated = self.transitioning.evaluate(parameters);

        let paint = &self.evaluated;
        let visible = paint.opacity.evaluated_value_or(1.0) > 0.0
            && paint.color.evaluated_value_or(Color::BLACK).components[3] > 0.0
            && paint.width > 0.0;
        self.render_pass = if visible {
            RenderPass::Translucent
        } else {
            RenderPass::None
        };

        self.transitioning.has_transition()
    }

    pub fn render_pass(&self) -> RenderPass {
        self.render_pass
    }

    pub fn evaluated_paint(&self) -> &EvaluatedLinePaint {
        &self.evaluated
    }

    /// Layout at the zoom of the last evaluation. Buckets evaluate the layout at
    /// their tile's zoom instead.
    pub fn evaluated_layout(&self) -> &EvaluatedLineLayout {
        &self.evaluated_layout
    }

    /// Tessellates every feature of the tile accepted by the filter, indexing
    /// each for queries.
    pub fn create_bucket(&self, parameters: BucketParameters<'_>) -> LineBucket {
        let BucketParameters {
            tile_id,
            layer,
            feature_index,
        } = parameters;
        let layout = self
            .layout
            .evaluate(&PropertyEvaluationParameters::new(f32::from(tile_id.overscaled_z)));
        let mut bucket = LineBucket::new(layout, self.paint_data(), tile_id.overscale_factor());

        let mut features = 0_usize;
        each_filtered_feature(layer, &self.filter, |feature, index, layer_name| {
            let geometries = feature.geometries();
            bucket.add_feature(feature, &geometries);
            feature_index.insert(&geometries, index, layer_name, &self.id);
            features += 1;
        });
        log::debug!(
            "Created bucket for line layer '{}': {} features, {} vertices",
            self.id,
            features,
            bucket.vertices().len()
        );
        bucket
    }

    fn paint_data(&self) -> PaintData {
        let paint = &self.evaluated;
        let [color, blur, opacity, gap_width, offset] = LINE_PAINT_ATTRIBUTES;
        let binders: Vec<Box<dyn PaintBinder>> = vec![
            Box::new(PaintPropertyBinder::new(color, paint.color.clone(), Color::BLACK)),
            Box::new(PaintPropertyBinder::new(blur, paint.blur.clone(), 0.0)),
            Box::new(PaintPropertyBinder::new(opacity, paint.opacity.clone(), 1.0)),
            Box::new(PaintPropertyBinder::new(gap_width, paint.gap_width.clone(), 0.0)),
            Box::new(PaintPropertyBinder::new(offset, paint.offset.clone(), 0.0)),
        ];
        PaintData::new(binders)
    }

    /// The full width of the line in pixels: two strokes and the gap between
    /// them when there is a gap.
    pub fn line_width(&self) -> f32 {
        let width = self.evaluated.width;
        let gap_width = self.evaluated.gap_width.evaluated_value_or(0.0);
        if gap_width > 0.0 {
            gap_width + 2.0 * width
        } else {
            width
        }
    }

    /// How far from a query, in pixels, a line can be and still be hit.
    pub fn query_radius(&self) -> f64 {
        let [x, y] = self.evaluated.translate;
        let offset = self.evaluated.offset.evaluated_value_or(0.0);
        f64::from(self.line_width()) / 2.0
            + f64::from(offset).abs()
            + f64::from(x).hypot(f64::from(y))
    }

    /// Whether the query polygon touches `geometry` as drawn, with its width,
    /// offset and translation.
    ///
    /// `query` and `geometry` are in tile units; `bearing` is in radians.
    pub fn query_intersects_geometry(
        &self,
        query: &[Point],
        geometry: &GeometryCollection,
        bearing: f64,
        pixels_to_tile_units: f64,
    ) -> bool {
        let paint = &self.evaluated;
        let translated = translate_query_geometry(
            query,
            paint.translate,
            paint.translate_anchor,
            bearing,
            pixels_to_tile_units,
        );
        let query = translated.as_deref().unwrap_or(query);

        let half_width = f64::from(self.line_width()) / 2.0 * pixels_to_tile_units;
        let offset = f64::from(paint.offset.evaluated_value_or(0.0)) * pixels_to_tile_units;
        let offset_geometry = offset_line(geometry, offset);
        let lines = offset_geometry.as_ref().unwrap_or(geometry);

        polygon_intersects_buffered_multi_line(query, lines, half_width)
    }
}
