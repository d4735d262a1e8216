// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Primitive type of a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Lines,
    Triangles,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthFunction {
    Never,
    Less,
    LessEqual,
    #[default]
    Always,
}

/// Depth test configuration of a draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthMode {
    pub func: DepthFunction,
    /// Whether passing fragments write their depth.
    pub write: bool,
    pub range: [f32; 2],
}

impl DepthMode {
    pub fn disabled() -> Self {
        Self {
            func: DepthFunction::Always,
            write: false,
            range: [0.0, 1.0],
        }
    }

    /// Tests against, but never writes, the depth buffer.
    pub fn read_only(range: [f32; 2]) -> Self {
        Self {
            func: DepthFunction::LessEqual,
            write: false,
            range,
        }
    }
}

impl Default for DepthMode {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Stencil test configuration of a draw call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StencilMode {
    #[default]
    Disabled,
    /// Passes where `stencil & mask == reference & mask`, used for tile clipping.
    Equal { reference: u8, mask: u8 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendFunction {
    /// Source replaces destination.
    #[default]
    Replace,
    /// Premultiplied source-over.
    Alpha,
}

/// Blending and write mask of a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorMode {
    pub blend: BlendFunction,
    /// Writes of the red, green, blue and alpha channels.
    pub mask: [bool; 4],
}

impl ColorMode {
    pub fn unblended() -> Self {
        Self {
            blend: BlendFunction::Replace,
            mask: [true; 4],
        }
    }

    pub fn alpha_blended() -> Self {
        Self {
            blend: BlendFunction::Alpha,
            mask: [true; 4],
        }
    }
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::unblended()
    }
}
