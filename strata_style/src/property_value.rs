// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{PropertyFunction, ZoomFunction};

/// A property as authored in a style.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue<T> {
    /// Not set in the style; evaluation yields the property default.
    Undefined,
    Constant(T),
    ZoomFunction(ZoomFunction<T>),
}

/// An evaluator dispatched on the variant of a [`PropertyValue`].
pub trait PropertyValueVisitor<T> {
    type Output;

    fn undefined(&self) -> Self::Output;

    fn constant(&self, value: &T) -> Self::Output;

    fn zoom_function(&self, function: &ZoomFunction<T>) -> Self::Output;
}

impl<T> PropertyValue<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn is_zoom_function(&self) -> bool {
        matches!(self, Self::ZoomFunction(_))
    }

    /// Returns the constant value.
    ///
    /// # Panics
    ///
    /// If this value is not a constant. Guard with [`is_constant`](Self::is_constant),
    /// or use [`constant`](Self::constant).
    #[track_caller]
    pub fn as_constant(&self) -> &T {
        match self {
            Self::Constant(value) => value,
            _ => panic!("as_constant called on a non-constant property value"),
        }
    }

    /// Returns the zoom function.
    ///
    /// # Panics
    ///
    /// If this value is not a zoom function.
    #[track_caller]
    pub fn as_zoom_function(&self) -> &ZoomFunction<T> {
        match self {
            Self::ZoomFunction(function) => function,
            _ => panic!("as_zoom_function called on a property value that is not a zoom function"),
        }
    }

    pub fn constant(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn zoom_function(&self) -> Option<&ZoomFunction<T>> {
        match self {
            Self::ZoomFunction(function) => Some(function),
            _ => None,
        }
    }

    pub fn evaluate<V: PropertyValueVisitor<T>>(&self, visitor: &V) -> V::Output {
        match self {
            Self::Undefined => visitor.undefined(),
            Self::Constant(value) => visitor.constant(value),
            Self::ZoomFunction(function) => visitor.zoom_function(function),
        }
    }
}

// Not derived: that would require `T: Default`.
impl<T> Default for PropertyValue<T> {
    fn default() -> Self {
        Self::Undefined
    }
}

impl<T> From<T> for PropertyValue<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

/// A property as authored in a style, which may vary per feature.
#[derive(Clone, Debug, PartialEq)]
pub enum DataDrivenPropertyValue<T> {
    Undefined,
    Constant(T),
    ZoomFunction(ZoomFunction<T>),
    /// Resolved per feature at tessellation time.
    PropertyFunction(PropertyFunction<T>),
}

/// An evaluator which also handles per-feature functions.
pub trait DataDrivenPropertyValueVisitor<T>: PropertyValueVisitor<T> {
    fn property_function(&self, function: &PropertyFunction<T>) -> Self::Output;
}

impl<T> DataDrivenPropertyValue<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn is_zoom_function(&self) -> bool {
        matches!(self, Self::ZoomFunction(_))
    }

    pub fn is_data_driven(&self) -> bool {
        matches!(self, Self::PropertyFunction(_))
    }

    pub fn constant(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn evaluate<V: DataDrivenPropertyValueVisitor<T>>(&self, visitor: &V) -> V::Output {
        match self {
            Self::Undefined => visitor.undefined(),
            Self::Constant(value) => visitor.constant(value),
            Self::ZoomFunction(function) => visitor.zoom_function(function),
            Self::PropertyFunction(function) => visitor.property_function(function),
        }
    }
}

impl<T> Default for DataDrivenPropertyValue<T> {
    fn default() -> Self {
        Self::Undefined
    }
}

impl<T> From<T> for DataDrivenPropertyValue<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T> From<PropertyValue<T>> for DataDrivenPropertyValue<T> {
    fn from(value: PropertyValue<T>) -> Self {
        match value {
            PropertyValue::Undefined => Self::Undefined,
            PropertyValue::Constant(value) => Self::Constant(value),
            PropertyValue::ZoomFunction(function) => Self::ZoomFunction(function),
        }
    }
}
