// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

use super::BufferId;

/// Index of a vertex attribute in a linked program.
pub type AttributeLocation = u32;

/// Component type of a vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    I16,
    U8,
    F32,
}

/// Static description of one attribute of a vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub kind: AttributeType,
    pub components: u8,
    /// Byte offset within the vertex.
    pub offset: u32,
}

/// A vertex type which can be uploaded to a vertex buffer.
pub trait Vertex: bytemuck::Pod {
    const ATTRIBUTES: &'static [VertexAttribute];
}

/// Where an attribute is read from inside a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    pub buffer: BufferId,
    pub kind: AttributeType,
    pub components: u8,
    /// Byte offset of the attribute within a vertex.
    pub offset: u32,
    /// Size of a whole vertex in bytes.
    pub stride: u32,
}

impl AttributeBinding {
    /// Byte offset of the attribute of vertex `vertex_offset`.
    pub fn offset_at(&self, vertex_offset: usize) -> usize {
        self.offset as usize + self.stride as usize * vertex_offset
    }
}

/// The value a program attribute is bound to for a draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeValue {
    /// The same value for every vertex. Unused trailing components are ignored.
    Constant([f32; 4]),
    /// Per-vertex values read from a buffer.
    Variable(AttributeBinding),
}

/// Attribute values in program attribute order.
pub type AttributeValues = SmallVec<[AttributeValue; 8]>;
