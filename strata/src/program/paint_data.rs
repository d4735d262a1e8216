// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use peniko::Color;
use strata_style::{Feature, FromFeatureValue, Interpolate, PossiblyEvaluatedProperty};

use crate::gl::{
    AttributeBinding, AttributeType, AttributeValue, AttributeValues, Context, UniqueBuffer,
};
use crate::{Error, Result};

/// A paint property value which can feed a vertex attribute.
pub trait PaintValue:
    Interpolate + FromFeatureValue + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Number of `f32` components of the attribute, at most 4.
    const COMPONENTS: u8;

    /// The attribute components, padded with zeroes.
    fn attribute_components(&self) -> [f32; 4];
}

impl PaintValue for f32 {
    const COMPONENTS: u8 = 1;

    fn attribute_components(&self) -> [f32; 4] {
        [*self, 0.0, 0.0, 0.0]
    }
}

impl PaintValue for Color {
    const COMPONENTS: u8 = 4;

    /// Premultiplied, as the line shaders blend premultiplied colours.
    fn attribute_components(&self) -> [f32; 4] {
        let [r, g, b, a] = self.components;
        [r * a, g * a, b * a, a]
    }
}

/// Feeds one evaluated paint property to its program attribute.
pub trait PaintBinder: fmt::Debug + Send {
    /// Name of the program attribute this binder feeds.
    fn attribute(&self) -> &'static str;

    /// Extends the per-vertex values for `feature` up to `length` vertices.
    fn populate_vertex_vector(&mut self, feature: &dyn Feature, length: usize);

    /// Moves the per-vertex values, if any, into a GPU buffer.
    fn upload(&mut self, context: &mut Context) -> Result<()>;

    /// The value to bind the attribute to.
    ///
    /// Fails with [`Error::NotUploaded`] for per-vertex values which have not been
    /// uploaded yet.
    fn attribute_value(&self) -> Result<AttributeValue>;
}

/// The [`PaintBinder`] for a possibly data-driven property.
///
/// A constant becomes a constant attribute and never costs a buffer. A
/// per-feature function is evaluated for each feature as it is tessellated and
/// read from a vertex buffer.
#[derive(Debug)]
pub struct PaintPropertyBinder<T> {
    attribute: &'static str,
    property: PossiblyEvaluatedProperty<T>,
    default_value: T,
    vertices: Vec<f32>,
    vertex_count: usize,
    buffer: Option<UniqueBuffer>,
}

impl<T: PaintValue> PaintPropertyBinder<T> {
    pub fn new(
        attribute: &'static str,
        property: PossiblyEvaluatedProperty<T>,
        default_value: T,
    ) -> Self {
        Self {
            attribute,
            property,
            default_value,
            vertices: Vec::new(),
            vertex_count: 0,
            buffer: None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.property.is_constant()
    }

    /// Number of vertices with a value.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl<T: PaintValue> PaintBinder for PaintPropertyBinder<T> {
    fn attribute(&self) -> &'static str {
        self.attribute
    }

    fn populate_vertex_vector(&mut self, feature: &dyn Feature, length: usize) {
        let PossiblyEvaluatedProperty::Function(function) = &self.property else {
            return;
        };
        let value = function.evaluate(feature, self.default_value.clone());
        let components = value.attribute_components();
        let components = &components[..usize::from(T::COMPONENTS)];
        while self.vertex_count < length {
            self.vertices.extend_from_slice(components);
            self.vertex_count += 1;
        }
    }

    fn upload(&mut self, context: &mut Context) -> Result<()> {
        if self.is_constant() || self.buffer.is_some() {
            return Ok(());
        }
        self.buffer = Some(context.create_raw_vertex_buffer(&self.vertices)?);
        self.vertices = Vec::new();
        Ok(())
    }

    fn attribute_value(&self) -> Result<AttributeValue> {
        match (&self.property, &self.buffer) {
            (PossiblyEvaluatedProperty::Constant(value), _) => {
                Ok(AttributeValue::Constant(value.attribute_components()))
            }
            (PossiblyEvaluatedProperty::Function(_), Some(buffer)) => {
                Ok(AttributeValue::Variable(AttributeBinding {
                    buffer: buffer.id(),
                    kind: AttributeType::F32,
                    components: T::COMPONENTS,
                    offset: 0,
                    stride: 4 * u32::from(T::COMPONENTS),
                }))
            }
            (PossiblyEvaluatedProperty::Function(_), None) => Err(Error::NotUploaded),
        }
    }
}

/// The paint attribute data of a bucket, one binder per paint attribute of its
/// program, in program order.
#[derive(Debug, Default)]
pub struct PaintData {
    binders: Vec<Box<dyn PaintBinder>>,
}

impl PaintData {
    pub fn new(binders: Vec<Box<dyn PaintBinder>>) -> Self {
        Self { binders }
    }

    /// The attributes fed, in order.
    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.binders.iter().map(|binder| binder.attribute())
    }

    /// Records `feature`'s data-driven values for every vertex up to `length`.
    pub fn populate_vertex_vectors(&mut self, feature: &dyn Feature, length: usize) {
        for binder in &mut self.binders {
            binder.populate_vertex_vector(feature, length);
        }
    }

    pub fn upload(&mut self, context: &mut Context) -> Result<()> {
        log::debug!("Uploading paint data for {} attributes", self.binders.len());
        for binder in &mut self.binders {
            binder.upload(context)?;
        }
        Ok(())
    }

    pub fn attribute_values(&self) -> Result<AttributeValues> {
        self.binders
            .iter()
            .map(|binder| binder.attribute_value())
            .collect()
    }
}
