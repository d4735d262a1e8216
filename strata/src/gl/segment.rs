// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{AttributeLocation, AttributeValue, AttributeValues, BufferId, Context, UniqueVertexArray};
use crate::Result;

/// Where a segment starts inside its bucket's buffers. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentRange {
    pub vertex_offset: usize,
    pub index_offset: usize,
}

/// What a segment last bound, so unchanged bindings are not reissued.
#[derive(Debug, Default)]
struct BindingCache {
    vertex_array: Option<UniqueVertexArray>,
    index_buffer: Option<BufferId>,
    attribute_values: Option<AttributeValues>,
}

/// A range of a bucket's vertices and indices drawn with one draw call.
///
/// Indices are relative to the segment's vertex offset, which keeps them within
/// 16 bits however large the bucket grows.
#[derive(Debug)]
pub struct Segment {
    range: SegmentRange,
    pub vertex_length: usize,
    pub index_length: usize,
    cache: BindingCache,
}

impl Segment {
    pub fn new(vertex_offset: usize, index_offset: usize) -> Self {
        Self {
            range: SegmentRange {
                vertex_offset,
                index_offset,
            },
            vertex_length: 0,
            index_length: 0,
            cache: BindingCache::default(),
        }
    }

    pub fn range(&self) -> SegmentRange {
        self.range
    }

    pub fn vertex_offset(&self) -> usize {
        self.range.vertex_offset
    }

    pub fn index_offset(&self) -> usize {
        self.range.index_offset
    }

    /// Makes this segment's vertex array current with the given bindings.
    ///
    /// The vertex array is created on first use. The element buffer and the
    /// attributes are only rebound when they differ from the last call.
    pub fn bind(
        &mut self,
        context: &mut Context,
        index_buffer: BufferId,
        locations: &[AttributeLocation],
        values: &[AttributeValue],
    ) -> Result<()> {
        let vertex_array = match &self.cache.vertex_array {
            Some(vertex_array) => vertex_array.id(),
            None => {
                let vertex_array = context.create_vertex_array()?;
                let id = vertex_array.id();
                log::trace!("Created vertex array {id:?} for segment {:?}", self.range);
                self.cache.vertex_array = Some(vertex_array);
                id
            }
        };
        context.bind_vertex_array(Some(vertex_array));

        if self.cache.index_buffer != Some(index_buffer) {
            log::trace!("Binding element buffer {index_buffer:?} for segment {:?}", self.range);
            self.cache.index_buffer = Some(index_buffer);
            context.invalidate_element_buffer();
            context.bind_element_buffer(Some(index_buffer));
        }

        if self.cache.attribute_values.as_deref() != Some(values) {
            log::trace!("Binding {} attributes for segment {:?}", values.len(), self.range);
            for (location, value) in locations.iter().zip(values) {
                context.bind_attribute(*location, value, self.range.vertex_offset);
            }
            self.cache.attribute_values = Some(values.into());
        }
        Ok(())
    }
}

/// The segments of a bucket, in draw order. Segments are only ever appended.
#[derive(Debug, Default)]
pub struct SegmentVector {
    segments: Vec<Segment>,
}

impl SegmentVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_mut(&mut self) -> Option<&mut Segment> {
        self.segments.last_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Segment> {
        self.segments.iter_mut()
    }
}

impl<'a> IntoIterator for &'a SegmentVector {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut SegmentVector {
    type Item = &'a mut Segment;
    type IntoIter = std::slice::IterMut<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{AttributeBinding, AttributeType, Command};

    fn binding(buffer: BufferId) -> AttributeValue {
        AttributeValue::Variable(AttributeBinding {
            buffer,
            kind: AttributeType::I16,
            components: 2,
            offset: 0,
            stride: 8,
        })
    }

    fn count(context: &Context, f: impl Fn(&Command) -> bool) -> usize {
        context.recording().count(f)
    }

    #[test]
    fn repeated_binds_are_cached() {
        let mut context = Context::default();
        let vertices = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let indices = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let values = [binding(vertices.id()), AttributeValue::Constant([1.0, 0.0, 0.0, 1.0])];

        let mut segment = Segment::new(4, 6);
        for _ in 0..2 {
            segment.bind(&mut context, indices.id(), &[0, 1], &values).unwrap();
        }

        assert_eq!(count(&context, |c| matches!(c, Command::CreateVertexArray(_))), 1);
        assert_eq!(count(&context, |c| matches!(c, Command::BindVertexArray(_))), 1);
        assert_eq!(count(&context, |c| matches!(c, Command::BindElementBuffer(_))), 1);
        assert_eq!(count(&context, |c| matches!(c, Command::AttributePointer { .. })), 1);
        assert_eq!(count(&context, |c| matches!(c, Command::ConstantAttribute { .. })), 1);
    }

    #[test]
    fn attribute_pointers_start_at_the_segment() {
        let mut context = Context::default();
        let vertices = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let indices = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let mut segment = Segment::new(10, 0);
        segment
            .bind(&mut context, indices.id(), &[3], &[binding(vertices.id())])
            .unwrap();
        assert!(context.recording().iter().any(|c| matches!(
            c,
            Command::AttributePointer {
                location: 3,
                offset: 80,
                ..
            }
        )));
    }

    #[test]
    fn changed_values_are_rebound() {
        let mut context = Context::default();
        let a = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let b = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let mut segment = Segment::new(0, 0);

        segment.bind(&mut context, a.id(), &[0], &[binding(a.id())]).unwrap();
        segment.bind(&mut context, b.id(), &[0], &[binding(b.id())]).unwrap();
        assert_eq!(count(&context, |c| matches!(c, Command::BindElementBuffer(_))), 2);
        assert_eq!(count(&context, |c| matches!(c, Command::AttributePointer { .. })), 2);
    }

    #[test]
    fn segments_own_separate_vertex_arrays() {
        let mut context = Context::default();
        let indices = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        let mut segments = SegmentVector::new();
        segments.push(Segment::new(0, 0));
        segments.push(Segment::new(100, 300));
        for segment in &mut segments {
            segment.bind(&mut context, indices.id(), &[], &[]).unwrap();
        }
        assert_eq!(count(&context, |c| matches!(c, Command::CreateVertexArray(_))), 2);
        // The element buffer belongs to each vertex array, so both bind it.
        assert_eq!(count(&context, |c| matches!(c, Command::BindElementBuffer(_))), 2);
        assert_eq!(segments.iter().map(Segment::index_offset).collect::<Vec<_>>(), vec![0, 300]);
    }
}
