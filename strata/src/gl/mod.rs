// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPU boundary: a recording GL-style context and the objects drawn with it.

mod attribute;
mod buffer;
mod context;
mod recording;
mod segment;
mod state;
mod types;
mod uniform;

pub use attribute::{
    AttributeBinding, AttributeLocation, AttributeType, AttributeValue, AttributeValues, Vertex,
    VertexAttribute,
};
pub use buffer::{IndexBuffer, VertexBuffer};
pub use context::{Context, ContextOptions, UniqueBuffer, UniqueProgram, UniqueVertexArray};
pub use recording::{BufferId, BufferTarget, Command, ProgramId, Recording, ResourceId, VertexArrayId};
pub use segment::{Segment, SegmentRange, SegmentVector};
pub use state::State;
pub use types::{BlendFunction, ColorMode, DepthFunction, DepthMode, DrawMode, StencilMode};
pub use uniform::{UniformLocation, UniformValue, Uniforms};
