// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Shader source templates of a program.
///
/// Templates are completed by [`Program`](crate::Program), which prepends the
/// `DEVICE_PIXEL_RATIO` define and optionally enables the overdraw inspector.
pub trait Shaders {
    const NAME: &'static str;
    const VERTEX_SOURCE: &'static str;
    const FRAGMENT_SOURCE: &'static str;
}

/// Antialiased, data-driven lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineShaders;

impl Shaders for LineShaders {
    const NAME: &'static str = "line";
    const VERTEX_SOURCE: &'static str = include_str!("../shader/line.vertex.glsl");
    const FRAGMENT_SOURCE: &'static str = include_str!("../shader/line.fragment.glsl");
}
