// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};
use static_assertions::{assert_impl_all, const_assert_eq};
use strata_style::geometry::{perp, unit, GeometryCollection};
use strata_style::kurbo::{Point, Vec2};
use strata_style::{Feature, FeatureType, LineCap, LineJoin};

use crate::gl::{
    AttributeType, Context, IndexBuffer, Segment, SegmentVector, Vertex, VertexAttribute,
    VertexBuffer,
};
use crate::{EvaluatedLineLayout, PaintData, Result};

/// Extrusion vectors are stored in a byte, scaled by this and biased by 128.
const EXTRUDE_SCALE: f64 = 63.0;

/// Line distance is stored in 16 bits at this resolution and wraps around.
const LINE_DISTANCE_SCALE: f64 = 0.5;

/// Indices are 16 bits relative to their segment.
const MAX_SEGMENT_VERTICES: usize = u16::MAX as usize;

/// A point emits at most two vertex pairs, at a bevel join.
const MAX_VERTICES_PER_POINT: usize = 4;

const MIN_COS_HALF_ANGLE: f64 = 1e-6;

/// Vertex of a tessellated line.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LineLayoutVertex {
    /// Position in tile units.
    pub a_pos: [i16; 2],
    /// Extrusion x and y, then the low and high byte of the line distance.
    pub a_data: [u8; 4],
}

const_assert_eq!(std::mem::size_of::<LineLayoutVertex>(), 8);

impl Vertex for LineLayoutVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            name: "a_pos",
            kind: AttributeType::I16,
            components: 2,
            offset: 0,
        },
        VertexAttribute {
            name: "a_data",
            kind: AttributeType::U8,
            components: 4,
            offset: 4,
        },
    ];
}

impl LineLayoutVertex {
    pub fn new(position: Point, extrude: Vec2, line_distance: f64) -> Self {
        let coordinate = |v: f64| v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        let extrusion = |v: f64| (v * EXTRUDE_SCALE + 128.0).round().clamp(0.0, 255.0) as u8;
        let distance = ((line_distance * LINE_DISTANCE_SCALE) as u64 & 0xffff) as u16;
        let [low, high] = distance.to_le_bytes();
        Self {
            a_pos: [coordinate(position.x), coordinate(position.y)],
            a_data: [extrusion(extrude.x), extrusion(extrude.y), low, high],
        }
    }

    /// The extrusion vector, in units of half the line width.
    pub fn extrude(&self) -> Vec2 {
        Vec2::new(
            (f64::from(self.a_data[0]) - 128.0) / EXTRUDE_SCALE,
            (f64::from(self.a_data[1]) - 128.0) / EXTRUDE_SCALE,
        )
    }
}

/// The two most recent vertices of a triangle strip, relative to the segment.
type Strip = [Option<u16>; 2];

/// Tessellated lines of one layer in one tile.
#[derive(Debug)]
pub struct LineBucket {
    layout: EvaluatedLineLayout,
    overscaling: u32,
    pub(crate) vertices: Vec<LineLayoutVertex>,
    pub(crate) triangles: Vec<[u16; 3]>,
    pub(crate) segments: SegmentVector,
    pub(crate) paint_data: PaintData,
    pub(crate) vertex_buffer: Option<VertexBuffer<LineLayoutVertex>>,
    pub(crate) index_buffer: Option<IndexBuffer>,
}

// Buckets are filled on worker threads and uploaded on the GPU thread.
assert_impl_all!(LineBucket: Send);

impl LineBucket {
    pub fn new(layout: EvaluatedLineLayout, paint_data: PaintData, overscaling: u32) -> Self {
        Self {
            layout,
            overscaling,
            vertices: Vec::new(),
            triangles: Vec::new(),
            segments: SegmentVector::new(),
            paint_data,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn layout(&self) -> &EvaluatedLineLayout {
        &self.layout
    }

    /// How many times the source tile is magnified.
    pub fn overscaling(&self) -> u32 {
        self.overscaling
    }

    pub fn vertices(&self) -> &[LineLayoutVertex] {
        &self.vertices
    }

    /// Triangles, indexed relative to their segment's vertex offset.
    pub fn triangles(&self) -> &[[u16; 3]] {
        &self.triangles
    }

    pub fn segments(&self) -> &SegmentVector {
        &self.segments
    }

    pub fn paint_data(&self) -> &PaintData {
        &self.paint_data
    }

    pub fn has_data(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Tessellates the lines of `feature`.
    ///
    /// Polygon rings are closed and joined all the way round; other lines get caps.
    pub fn add_feature(&mut self, feature: &dyn Feature, geometries: &GeometryCollection) {
        let polygon = feature.feature_type() == FeatureType::Polygon;
        for line in geometries {
            self.add_line(line, polygon);
        }
        self.paint_data
            .populate_vertex_vectors(feature, self.vertices.len());
    }

    fn add_line(&mut self, line: &[Point], polygon: bool) {
        let mut points: Vec<Point> = Vec::with_capacity(line.len() + 1);
        for &p in line {
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        if polygon && points.len() > 2 && points.first() != points.last() {
            points.push(points[0]);
        }
        if points.len() < 2 {
            return;
        }
        let closed = polygon && points.len() > 3 && points.first() == points.last();

        let max_points = MAX_SEGMENT_VERTICES / MAX_VERTICES_PER_POINT;
        if points.len() <= max_points {
            self.add_line_part(&points, closed, None, None, 0.0);
            return;
        }
        log::warn!(
            "Line of {} points does not fit in one segment, splitting it",
            points.len()
        );
        // Parts share their seam point, which is joined to the neighbouring
        // points on both sides rather than capped.
        let mut start = 0;
        let mut distance = 0.0;
        while start + 1 < points.len() {
            let end = (start + max_points).min(points.len());
            let before = start.checked_sub(1).map(|i| points[i]);
            let after = points.get(end).copied();
            distance = self.add_line_part(&points[start..end], false, before, after, distance);
            start = end - 1;
        }
    }

    /// Tessellates `points`, with `before` and `after` continuing the line past
    /// either end. Returns the line distance at the last point.
    fn add_line_part(
        &mut self,
        points: &[Point],
        closed: bool,
        before: Option<Point>,
        after: Option<Point>,
        start_distance: f64,
    ) -> f64 {
        let needed = points.len() * MAX_VERTICES_PER_POINT;
        let fits = self
            .segments
            .last_mut()
            .is_some_and(|segment| segment.vertex_length + needed <= MAX_SEGMENT_VERTICES);
        if !fits {
            self.segments
                .push(Segment::new(self.vertices.len(), self.triangles.len() * 3));
        }
        let Some(segment) = self.segments.last_mut() else {
            return start_distance;
        };
        let base = segment.vertex_offset();
        let first_vertex = self.vertices.len();
        let first_triangle = self.triangles.len();

        let len = points.len();
        let mut strip: Strip = [None, None];
        let mut distance = start_distance;
        for (i, &current) in points.iter().enumerate() {
            let previous = match i {
                0 if closed => Some(points[len - 2]),
                0 => before,
                _ => Some(points[i - 1]),
            };
            let next = match points.get(i + 1) {
                Some(&next) => Some(next),
                None if closed => Some(points[1]),
                None => after,
            };
            if i > 0 {
                distance += (current - points[i - 1]).hypot();
            }

            let incoming = previous.map(|p| unit(current - p));
            let outgoing = next.map(|n| unit(n - current));
            match (incoming, outgoing) {
                (None, Some(outgoing)) => {
                    let normal = perp(outgoing);
                    let back = self.cap_extension(outgoing);
                    self.add_extruded(
                        base,
                        &mut strip,
                        current,
                        normal - back,
                        -normal - back,
                        distance,
                    );
                }
                (Some(incoming), None) => {
                    let normal = perp(incoming);
                    let forward = self.cap_extension(incoming);
                    self.add_extruded(
                        base,
                        &mut strip,
                        current,
                        normal + forward,
                        -normal + forward,
                        distance,
                    );
                }
                (Some(incoming), Some(outgoing)) => {
                    self.add_join(base, &mut strip, current, incoming, outgoing, distance);
                }
                (None, None) => {}
            }
        }

        let vertex_count = self.vertices.len() - first_vertex;
        let index_count = (self.triangles.len() - first_triangle) * 3;
        if let Some(segment) = self.segments.last_mut() {
            segment.vertex_length += vertex_count;
            segment.index_length += index_count;
        }
        distance
    }

    /// Square and round caps reach half the line width past the end point.
    fn cap_extension(&self, direction: Vec2) -> Vec2 {
        match self.layout.cap {
            LineCap::Butt => Vec2::ZERO,
            LineCap::Round | LineCap::Square => direction,
        }
    }

    fn add_join(
        &mut self,
        base: usize,
        strip: &mut Strip,
        p: Point,
        incoming: Vec2,
        outgoing: Vec2,
        distance: f64,
    ) {
        let incoming_normal = perp(incoming);
        let outgoing_normal = perp(outgoing);
        let join_normal = unit(incoming_normal + outgoing_normal);
        let cos_half_angle = join_normal.dot(outgoing_normal);
        let miter_length = if cos_half_angle > MIN_COS_HALF_ANGLE {
            1.0 / cos_half_angle
        } else {
            f64::INFINITY
        };
        let limit = match self.layout.join {
            LineJoin::Miter => self.layout.miter_limit,
            // Nearly straight joins look the same whatever the join type.
            LineJoin::Bevel | LineJoin::Round => self.layout.round_limit,
        };
        if miter_length <= f64::from(limit) {
            self.add_pair(base, strip, p, join_normal * miter_length, distance);
        } else {
            self.add_pair(base, strip, p, incoming_normal, distance);
            self.add_pair(base, strip, p, outgoing_normal, distance);
        }
    }

    fn add_pair(&mut self, base: usize, strip: &mut Strip, p: Point, extrude: Vec2, distance: f64) {
        self.add_extruded(base, strip, p, extrude, -extrude, distance);
    }

    /// Adds the left and right vertices of one cross-section of the line.
    fn add_extruded(
        &mut self,
        base: usize,
        strip: &mut Strip,
        p: Point,
        left: Vec2,
        right: Vec2,
        distance: f64,
    ) {
        self.add_vertex(base, strip, LineLayoutVertex::new(p, left, distance));
        self.add_vertex(base, strip, LineLayoutVertex::new(p, right, distance));
    }

    fn add_vertex(&mut self, base: usize, strip: &mut Strip, vertex: LineLayoutVertex) {
        // In range: segments are split before they outgrow 16-bit indices.
        let index = (self.vertices.len() - base) as u16;
        self.vertices.push(vertex);
        if let [Some(a), Some(b)] = *strip {
            self.triangles.push([a, b, index]);
        }
        *strip = [strip[1], Some(index)];
    }

    /// Moves the tessellated geometry and the paint data into GPU buffers.
    pub fn upload(&mut self, context: &mut Context) -> Result<()> {
        if self.is_uploaded() {
            log::warn!("Line bucket is already uploaded");
            return Ok(());
        }
        let vertex_buffer = context.create_vertex_buffer(&self.vertices)?;
        let index_buffer = context.create_index_buffer(&self.triangles)?;
        self.paint_data.upload(context)?;
        log::debug!(
            "Uploaded line bucket: {} vertices, {} triangles, {} segments",
            self.vertices.len(),
            self.triangles.len(),
            self.segments.len()
        );
        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        Ok(())
    }
}
