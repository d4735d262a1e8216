// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::marker::PhantomData;

use super::{AttributeBinding, AttributeValue, BufferId, UniqueBuffer, Vertex};

/// Uploaded vertices of type `V`.
#[derive(Debug)]
pub struct VertexBuffer<V> {
    pub(crate) buffer: UniqueBuffer,
    pub(crate) vertex_count: usize,
    pub(crate) _vertex: PhantomData<fn() -> V>,
}

impl<V: Vertex> VertexBuffer<V> {
    pub fn id(&self) -> BufferId {
        self.buffer.id()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Every attribute of `V`, bound to this buffer.
    pub fn attribute_values(&self) -> impl Iterator<Item = AttributeValue> + '_ {
        let stride = std::mem::size_of::<V>() as u32;
        V::ATTRIBUTES.iter().map(move |attribute| {
            AttributeValue::Variable(AttributeBinding {
                buffer: self.id(),
                kind: attribute.kind,
                components: attribute.components,
                offset: attribute.offset,
                stride,
            })
        })
    }
}

/// Uploaded triangle indices.
#[derive(Debug)]
pub struct IndexBuffer {
    pub(crate) buffer: UniqueBuffer,
    pub(crate) index_count: usize,
}

impl IndexBuffer {
    pub fn id(&self) -> BufferId {
        self.buffer.id()
    }

    /// Number of indices, three per triangle.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}
