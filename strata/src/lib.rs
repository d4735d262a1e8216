// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata turns evaluated map style properties and tessellated tile geometry into
//! GPU draw calls.
//!
//! The pipeline for a layer runs in three stages:
//!
//! 1. A style layer such as [`LineLayer`] is [cascaded](LineLayer::cascade) and
//!    [evaluated](LineLayer::evaluate) once per frame, which resolves its
//!    [`strata_style`] properties at the current zoom.
//! 2. For every tile, [`LineLayer::create_bucket`] tessellates the tile's features
//!    into a [`LineBucket`]. This is CPU-only work and may run on worker threads.
//! 3. On the thread owning the GPU [`Context`], buckets are
//!    [uploaded](LineBucket::upload) and drawn with a [`Program`], see [`draw_line`].
//!
//! The GPU boundary is a [`Context`] which records GL-style commands into a
//! [`Recording`](gl::Recording) instead of calling a driver. A backend replays the
//! recording; tests inspect it.
//!
//! Rendered-feature queries reuse the evaluated paint state through
//! [`LineLayer::query_radius`] and [`LineLayer::query_intersects_geometry`].

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]

mod bucket;
pub mod gl;
mod layer;
mod program;
mod render;
mod shaders;
mod tile;

pub use bucket::{LineBucket, LineLayoutVertex};
pub use gl::{Context, ContextOptions, Uniforms};
pub use layer::{
    BucketParameters, EvaluatedLineLayout, EvaluatedLinePaint, LineLayer, LineLayoutProperties,
    LinePaintProperties, RenderPass,
};
pub use program::{
    LineProgram, LineUniforms, PaintBinder, PaintData, PaintPropertyBinder, PaintValue, Program,
    ProgramParameters, LINE_PAINT_ATTRIBUTES,
};
pub use render::{draw_line, RenderParameters};
pub use shaders::{LineShaders, Shaders};
pub use tile::{CanonicalTileId, OverscaledTileId, EXTENT, TILE_SIZE};

pub use strata_style;

use thiserror::Error;

/// Errors that can occur in Strata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Overdraw inspection was requested for a shader which does not support it.
    ///
    /// The fragment shader template has to contain an `#ifdef OVERDRAW_INSPECTOR`
    /// block for the inspector define to have any effect.
    #[error("Shader '{shader}' has no OVERDRAW_INSPECTOR block")]
    MissingOverdrawMarker {
        /// Name of the offending shader.
        shader: &'static str,
    },
    /// A GPU allocation would exceed the context's memory budget.
    #[error("Out of GPU memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Size of the failed allocation, in bytes.
        requested: u64,
        /// Bytes left in the budget.
        available: u64,
    },
    /// The GPU context was lost; resources can no longer be created.
    #[error("GPU context lost")]
    ContextLost,
    /// A bucket or paint buffer was drawn before being uploaded.
    #[error("Bucket data has not been uploaded")]
    NotUploaded,
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
