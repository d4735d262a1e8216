// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shader programs and the paint attribute data they draw with.

mod line;
mod paint_data;

pub use line::{LineProgram, LineUniforms, LINE_PAINT_ATTRIBUTES};
pub use paint_data::{PaintBinder, PaintData, PaintPropertyBinder, PaintValue};

use std::marker::PhantomData;

use crate::gl::{
    AttributeLocation, AttributeValue, AttributeValues, ColorMode, Context, DepthMode, DrawMode,
    IndexBuffer, SegmentVector, StencilMode, UniformValue, Uniforms, UniqueProgram, Vertex,
    VertexBuffer,
};
use crate::{Error, Result, Shaders};

const OVERDRAW_MARKER: &str = "#ifdef OVERDRAW_INSPECTOR";

/// Build options shared by every program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgramParameters {
    /// Ratio of device pixels to CSS pixels.
    pub pixel_ratio: f32,
    /// Compile with the overdraw inspector, which draws every fragment in a flat
    /// colour so that overlapping geometry stands out.
    pub overdraw: bool,
}

impl Default for ProgramParameters {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            overdraw: false,
        }
    }
}

/// A linked program drawing vertices of type `V` with shaders `S` and uniforms `U`.
///
/// Its attributes are the attributes of `V` followed by the paint attributes it
/// was created with, in that order.
#[derive(Debug)]
pub struct Program<S, V, U> {
    program: UniqueProgram,
    attributes: Vec<&'static str>,
    attribute_locations: Vec<AttributeLocation>,
    uniform_values: Vec<Option<UniformValue>>,
    _types: PhantomData<fn() -> (S, V, U)>,
}

impl<S: Shaders, V: Vertex, U: Uniforms> Program<S, V, U> {
    /// Compiles a program reading its paint properties from `paint_attributes`.
    pub fn with_paint_attributes(
        context: &mut Context,
        parameters: &ProgramParameters,
        paint_attributes: &[&'static str],
    ) -> Result<Self> {
        let vertex_source = Self::vertex_source(parameters);
        let fragment_source = Self::fragment_source(parameters)?;
        let attributes: Vec<_> = V::ATTRIBUTES
            .iter()
            .map(|attribute| attribute.name)
            .chain(paint_attributes.iter().copied())
            .collect();
        let program = context.create_program(vertex_source, fragment_source, &attributes, U::NAMES)?;
        Ok(Self {
            program,
            attribute_locations: (0..attributes.len() as AttributeLocation).collect(),
            attributes,
            uniform_values: vec![None; U::NAMES.len()],
            _types: PhantomData,
        })
    }

    fn pixel_ratio_define(parameters: &ProgramParameters) -> String {
        format!("#define DEVICE_PIXEL_RATIO {:.6}\n", parameters.pixel_ratio)
    }

    pub fn vertex_source(parameters: &ProgramParameters) -> String {
        Self::pixel_ratio_define(parameters) + S::VERTEX_SOURCE
    }

    /// The complete fragment source.
    ///
    /// With overdraw inspection the template must contain an
    /// `#ifdef OVERDRAW_INSPECTOR` block; the define enabling it goes right after
    /// the first line.
    pub fn fragment_source(parameters: &ProgramParameters) -> Result<String> {
        let mut source = Self::pixel_ratio_define(parameters) + S::FRAGMENT_SOURCE;
        if parameters.overdraw {
            if !source.contains(OVERDRAW_MARKER) {
                return Err(Error::MissingOverdrawMarker { shader: S::NAME });
            }
            if let Some(newline) = source.find('\n') {
                source.replace_range(newline..=newline, "\n#define OVERDRAW_INSPECTOR\n");
            }
        }
        Ok(source)
    }

    /// Attribute names; an attribute's location is its index.
    pub fn attributes(&self) -> &[&'static str] {
        &self.attributes
    }

    /// Draws every segment of a bucket.
    ///
    /// `paint_attribute_values` must follow the order of the paint attributes the
    /// program was created with.
    pub fn draw(
        &mut self,
        context: &mut Context,
        draw_mode: DrawMode,
        depth_mode: DepthMode,
        stencil_mode: StencilMode,
        color_mode: ColorMode,
        uniforms: &U,
        layout_vertex_buffer: &VertexBuffer<V>,
        index_buffer: &IndexBuffer,
        segments: &mut SegmentVector,
        paint_attribute_values: &[AttributeValue],
    ) -> Result<()> {
        context.set_depth_mode(depth_mode);
        context.set_stencil_mode(stencil_mode);
        context.set_color_mode(color_mode);
        context.use_program(Some(self.program.id()));

        for ((location, cached), value) in self
            .uniform_values
            .iter_mut()
            .enumerate()
            .zip(uniforms.values())
        {
            if cached.as_ref() != Some(&value) {
                context.set_uniform(location as u32, value);
                *cached = Some(value);
            }
        }

        let values: AttributeValues = layout_vertex_buffer
            .attribute_values()
            .chain(paint_attribute_values.iter().copied())
            .collect();
        debug_assert_eq!(
            values.len(),
            self.attribute_locations.len(),
            "attribute values do not match the program's attributes"
        );

        for segment in segments {
            segment.bind(context, index_buffer.id(), &self.attribute_locations, &values)?;
            context.draw_elements(draw_mode, segment.index_offset(), segment.index_length);
        }
        Ok(())
    }
}
