// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Index of a uniform in a linked program.
pub type UniformLocation = u32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

/// The uniform block of a program.
pub trait Uniforms {
    /// Uniform names; a uniform's location is its index here.
    const NAMES: &'static [&'static str];

    /// Values in the order of [`NAMES`](Self::NAMES).
    fn values(&self) -> Vec<UniformValue>;
}
