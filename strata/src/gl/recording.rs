// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{
    AttributeBinding, AttributeLocation, ColorMode, DepthMode, DrawMode, StencilMode,
    UniformLocation, UniformValue,
};

/// Process-unique identifier of a GPU object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub NonZeroU64);

impl ResourceId {
    pub fn next() -> Self {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(NonZeroU64::MIN.saturating_add(ID_COUNTER.fetch_add(1, Ordering::Relaxed)))
    }
}

macro_rules! resource_ids {
    ($($(#[$attr:meta])* $name:ident;)*) => {
        $(
            $(#[$attr])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub ResourceId);

            impl $name {
                pub(crate) fn next() -> Self {
                    Self(ResourceId::next())
                }
            }
        )*
    };
}

resource_ids! {
    /// Handle of a vertex array object.
    VertexArrayId;
    /// Handle of a vertex or index buffer.
    BufferId;
    /// Handle of a linked shader program.
    ProgramId;
}

/// Which binding point a buffer is created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// List of [`Command`]s for a backend to execute in order.
#[derive(Debug, Default)]
pub struct Recording {
    pub commands: Vec<Command>,
}

/// Single command inside a [`Recording`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    /// Creates a buffer initialised with `data`.
    CreateBuffer {
        id: BufferId,
        target: BufferTarget,
        data: Vec<u8>,
    },
    DeleteBuffer(BufferId),
    /// Compiles and links a program. Attribute and uniform locations are the
    /// indices of their names.
    CompileProgram {
        id: ProgramId,
        vertex_source: String,
        fragment_source: String,
        attributes: Vec<&'static str>,
        uniforms: Vec<&'static str>,
    },
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    BindVertexArray(Option<VertexArrayId>),
    BindElementBuffer(Option<BufferId>),
    /// Sources an attribute from a vertex buffer, starting `offset` bytes in.
    AttributePointer {
        location: AttributeLocation,
        binding: AttributeBinding,
        offset: usize,
    },
    /// Disables the attribute array and uses the same value for every vertex.
    ConstantAttribute {
        location: AttributeLocation,
        value: [f32; 4],
    },
    Uniform {
        location: UniformLocation,
        value: UniformValue,
    },
    SetDepthMode(DepthMode),
    SetStencilMode(StencilMode),
    SetColorMode(ColorMode),
    /// Draws `index_length` indices starting at `index_offset`, both counted in
    /// indices rather than bytes.
    DrawElements {
        mode: DrawMode,
        index_offset: usize,
        index_length: usize,
    },
}

impl Recording {
    /// Appends a [`Command`] to the back of the [`Recording`].
    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl<'a> IntoIterator for &'a Recording {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
