// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::marker::PhantomData;
use std::sync::mpsc::{channel, Receiver, Sender};

use super::{
    AttributeLocation, AttributeValue, BufferId, BufferTarget, ColorMode, Command, DepthMode,
    DrawMode, IndexBuffer, ProgramId, Recording, State, StencilMode, UniformLocation,
    UniformValue, Vertex, VertexArrayId, VertexBuffer,
};
use crate::{Error, Result};

/// Options for creating a [`Context`].
#[derive(Clone, Debug, Default)]
pub struct ContextOptions {
    /// Upper bound on the bytes held by live buffers. Allocations beyond it fail
    /// with [`Error::OutOfMemory`].
    pub memory_budget: Option<u64>,
}

/// Objects released by their owners, waiting for [`Context::perform_cleanup`].
#[derive(Debug)]
enum Abandoned {
    VertexArray(VertexArrayId),
    Buffer(BufferId, u64),
    Program(ProgramId),
}

/// A GL-style context which records commands instead of executing them.
///
/// The context owns the current-binding caches, so redundant state changes never
/// reach the recording. It must only be used from the thread that owns the GPU.
#[derive(Debug)]
pub struct Context {
    options: ContextOptions,
    recording: Recording,
    allocated: u64,
    lost: bool,
    vertex_array: State<Option<VertexArrayId>>,
    element_buffer: State<Option<BufferId>>,
    program: State<Option<ProgramId>>,
    depth_mode: State<DepthMode>,
    stencil_mode: State<StencilMode>,
    color_mode: State<ColorMode>,
    abandon_sender: Sender<Abandoned>,
    abandoned: Receiver<Abandoned>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextOptions::default())
    }
}

impl Context {
    pub fn new(options: ContextOptions) -> Self {
        let (abandon_sender, abandoned) = channel();
        Self {
            options,
            recording: Recording::default(),
            allocated: 0,
            lost: false,
            vertex_array: State::default(),
            element_buffer: State::default(),
            program: State::default(),
            depth_mode: State::default(),
            stencil_mode: State::default(),
            color_mode: State::default(),
            abandon_sender,
            abandoned,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Hands the commands recorded so far to the caller.
    pub fn take_recording(&mut self) -> Recording {
        std::mem::take(&mut self.recording)
    }

    /// Bytes held by buffers which have not been cleaned up.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated
    }

    /// Marks the context as lost. Every later resource creation fails with
    /// [`Error::ContextLost`].
    pub fn mark_lost(&mut self) {
        self.lost = true;
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    fn check_lost(&self) -> Result<()> {
        if self.lost {
            Err(Error::ContextLost)
        } else {
            Ok(())
        }
    }

    pub fn create_vertex_array(&mut self) -> Result<UniqueVertexArray> {
        self.check_lost()?;
        let id = VertexArrayId::next();
        self.recording.push(Command::CreateVertexArray(id));
        Ok(UniqueVertexArray {
            id,
            abandon: self.abandon_sender.clone(),
        })
    }

    fn create_buffer(&mut self, target: BufferTarget, data: Vec<u8>) -> Result<UniqueBuffer> {
        self.check_lost()?;
        let size = data.len() as u64;
        if let Some(budget) = self.options.memory_budget {
            let available = budget.saturating_sub(self.allocated);
            if size > available {
                return Err(Error::OutOfMemory {
                    requested: size,
                    available,
                });
            }
        }
        let id = BufferId::next();
        self.allocated += size;
        self.recording.push(Command::CreateBuffer { id, target, data });
        Ok(UniqueBuffer {
            id,
            size,
            abandon: self.abandon_sender.clone(),
        })
    }

    pub fn create_vertex_buffer<V: Vertex>(&mut self, vertices: &[V]) -> Result<VertexBuffer<V>> {
        let buffer = self.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(vertices).to_vec())?;
        Ok(VertexBuffer {
            buffer,
            vertex_count: vertices.len(),
            _vertex: PhantomData,
        })
    }

    /// Uploads raw vertex data with a layout known only at run time.
    pub(crate) fn create_raw_vertex_buffer(&mut self, data: &[f32]) -> Result<UniqueBuffer> {
        self.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(data).to_vec())
    }

    pub fn create_index_buffer(&mut self, triangles: &[[u16; 3]]) -> Result<IndexBuffer> {
        let buffer = self.create_buffer(BufferTarget::Index, bytemuck::cast_slice(triangles).to_vec())?;
        Ok(IndexBuffer {
            buffer,
            index_count: triangles.len() * 3,
        })
    }

    pub fn create_program(
        &mut self,
        vertex_source: String,
        fragment_source: String,
        attributes: &[&'static str],
        uniforms: &[&'static str],
    ) -> Result<UniqueProgram> {
        self.check_lost()?;
        let id = ProgramId::next();
        log::debug!(
            "Compiling program {id:?} with {} attributes and {} uniforms",
            attributes.len(),
            uniforms.len()
        );
        self.recording.push(Command::CompileProgram {
            id,
            vertex_source,
            fragment_source,
            attributes: attributes.to_vec(),
            uniforms: uniforms.to_vec(),
        });
        Ok(UniqueProgram {
            id,
            abandon: self.abandon_sender.clone(),
        })
    }

    /// Records deletion of every object whose owner has been dropped.
    pub fn perform_cleanup(&mut self) {
        while let Ok(abandoned) = self.abandoned.try_recv() {
            match abandoned {
                Abandoned::VertexArray(id) => {
                    if *self.vertex_array.get() == Some(id) {
                        self.vertex_array.set_dirty();
                    }
                    self.recording.push(Command::DeleteVertexArray(id));
                }
                Abandoned::Buffer(id, size) => {
                    if *self.element_buffer.get() == Some(id) {
                        self.element_buffer.set_dirty();
                    }
                    self.allocated = self.allocated.saturating_sub(size);
                    self.recording.push(Command::DeleteBuffer(id));
                }
                Abandoned::Program(id) => {
                    if *self.program.get() == Some(id) {
                        self.program.set_dirty();
                    }
                    self.recording.push(Command::DeleteProgram(id));
                }
            }
        }
    }

    pub fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) {
        if self.vertex_array.set(id) {
            self.recording.push(Command::BindVertexArray(id));
        }
    }

    pub fn bind_element_buffer(&mut self, id: Option<BufferId>) {
        if self.element_buffer.set(id) {
            self.recording.push(Command::BindElementBuffer(id));
        }
    }

    /// Forgets the cached element buffer binding.
    ///
    /// The element buffer belongs to the bound vertex array, so the cache goes
    /// stale whenever a different vertex array is bound.
    pub fn invalidate_element_buffer(&mut self) {
        self.element_buffer.set_dirty();
    }

    pub fn use_program(&mut self, id: Option<ProgramId>) {
        if self.program.set(id) {
            self.recording.push(Command::UseProgram(id));
        }
    }

    pub fn set_depth_mode(&mut self, mode: DepthMode) {
        if self.depth_mode.set(mode) {
            self.recording.push(Command::SetDepthMode(mode));
        }
    }

    pub fn set_stencil_mode(&mut self, mode: StencilMode) {
        if self.stencil_mode.set(mode) {
            self.recording.push(Command::SetStencilMode(mode));
        }
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.color_mode.set(mode) {
            self.recording.push(Command::SetColorMode(mode));
        }
    }

    /// Binds one attribute of the current vertex array.
    ///
    /// Buffer-backed attributes start reading at vertex `vertex_offset`.
    pub fn bind_attribute(
        &mut self,
        location: AttributeLocation,
        value: &AttributeValue,
        vertex_offset: usize,
    ) {
        log::trace!("Binding attribute {location} to {value:?} at vertex {vertex_offset}");
        let command = match *value {
            AttributeValue::Constant(value) => Command::ConstantAttribute { location, value },
            AttributeValue::Variable(binding) => Command::AttributePointer {
                location,
                binding,
                offset: binding.offset_at(vertex_offset),
            },
        };
        self.recording.push(command);
    }

    pub fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.recording.push(Command::Uniform { location, value });
    }

    pub fn draw_elements(&mut self, mode: DrawMode, index_offset: usize, index_length: usize) {
        self.recording.push(Command::DrawElements {
            mode,
            index_offset,
            index_length,
        });
    }
}

macro_rules! unique_resources {
    ($($(#[$attr:meta])* $name:ident($id:ident) => $variant:ident;)*) => {
        $(
            $(#[$attr])*
            #[derive(Debug)]
            pub struct $name {
                id: $id,
                abandon: Sender<Abandoned>,
            }

            impl $name {
                pub fn id(&self) -> $id {
                    self.id
                }
            }

            impl Drop for $name {
                fn drop(&mut self) {
                    // The context may already be gone, and the object with it.
                    let _ = self.abandon.send(Abandoned::$variant(self.id));
                }
            }
        )*
    };
}

unique_resources! {
    /// An owned vertex array, deleted by the next [`Context::perform_cleanup`]
    /// after it is dropped.
    UniqueVertexArray(VertexArrayId) => VertexArray;
    /// An owned linked program.
    UniqueProgram(ProgramId) => Program;
}

/// An owned buffer, released from the memory budget once cleaned up.
#[derive(Debug)]
pub struct UniqueBuffer {
    id: BufferId,
    size: u64,
    abandon: Sender<Abandoned>,
}

impl UniqueBuffer {
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for UniqueBuffer {
    fn drop(&mut self) {
        let _ = self.abandon.send(Abandoned::Buffer(self.id, self.size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redundant_state_changes_are_not_recorded() {
        let mut context = Context::default();
        context.set_color_mode(ColorMode::alpha_blended());
        context.set_color_mode(ColorMode::alpha_blended());
        context.set_stencil_mode(StencilMode::Disabled);
        assert_eq!(
            context.recording().commands,
            vec![Command::SetColorMode(ColorMode::alpha_blended())]
        );
    }

    #[test]
    fn element_buffer_rebinds_after_invalidation() {
        let mut context = Context::default();
        let buffer = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        context.take_recording();

        context.bind_element_buffer(Some(buffer.id()));
        context.bind_element_buffer(Some(buffer.id()));
        context.invalidate_element_buffer();
        context.bind_element_buffer(Some(buffer.id()));
        let binds = context
            .recording()
            .count(|c| matches!(c, Command::BindElementBuffer(_)));
        assert_eq!(binds, 2);
    }

    #[test]
    fn allocations_respect_the_budget() {
        let mut context = Context::new(ContextOptions {
            memory_budget: Some(16),
        });
        let first = context.create_index_buffer(&[[0, 1, 2]]).unwrap();
        assert_eq!(context.allocated_bytes(), 6);

        let error = context.create_index_buffer(&[[0, 1, 2], [2, 1, 3]]).unwrap_err();
        assert_eq!(
            error,
            Error::OutOfMemory {
                requested: 12,
                available: 10
            }
        );

        drop(first);
        // Memory is only reclaimed once the deletion is recorded.
        assert_eq!(context.allocated_bytes(), 6);
        context.perform_cleanup();
        assert_eq!(context.allocated_bytes(), 0);
        assert!(context.create_index_buffer(&[[0, 1, 2], [2, 1, 3]]).is_ok());
    }

    #[test]
    fn dropped_objects_are_deleted_on_cleanup() {
        let mut context = Context::default();
        let vertex_array = context.create_vertex_array().unwrap();
        let id = vertex_array.id();
        context.bind_vertex_array(Some(id));
        drop(vertex_array);
        context.perform_cleanup();
        assert_eq!(
            context.recording().commands.last(),
            Some(&Command::DeleteVertexArray(id))
        );
        // The binding cache no longer trusts the deleted object.
        context.bind_vertex_array(Some(id));
        assert_eq!(
            context.recording().commands.last(),
            Some(&Command::BindVertexArray(Some(id)))
        );
    }

    #[test]
    fn lost_contexts_refuse_new_objects() {
        let mut context = Context::default();
        context.mark_lost();
        assert!(context.is_lost());
        assert_eq!(context.create_vertex_array().unwrap_err(), Error::ContextLost);
        assert_eq!(
            context.create_index_buffer(&[[0, 1, 2]]).unwrap_err(),
            Error::ContextLost
        );
    }
}
