// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Program, ProgramParameters};
use crate::gl::{Context, UniformValue, Uniforms};
use crate::{LineLayoutVertex, LineShaders, Result};

/// Paint attributes of the line program, in binding order.
pub const LINE_PAINT_ATTRIBUTES: [&str; 5] =
    ["a_color", "a_blur", "a_opacity", "a_gap_width", "a_offset"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineUniforms {
    /// Tile to clip space, including the paint translation.
    pub matrix: [f32; 16],
    /// Pixels per tile unit.
    pub ratio: f32,
    pub width: f32,
    pub gl_units_to_pixels: [f32; 2],
}

impl Uniforms for LineUniforms {
    const NAMES: &'static [&'static str] = &["u_matrix", "u_ratio", "u_width", "u_gl_units_to_pixels"];

    fn values(&self) -> Vec<UniformValue> {
        vec![
            UniformValue::Mat4(self.matrix),
            UniformValue::Float(self.ratio),
            UniformValue::Float(self.width),
            UniformValue::Vec2(self.gl_units_to_pixels),
        ]
    }
}

pub type LineProgram = Program<LineShaders, LineLayoutVertex, LineUniforms>;

impl LineProgram {
    pub fn new(context: &mut Context, parameters: &ProgramParameters) -> Result<Self> {
        Self::with_paint_attributes(context, parameters, &LINE_PAINT_ATTRIBUTES)
    }
}
