// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style property model for Strata.
//!
//! A style property is authored as a [`PropertyValue`] (undefined, constant or
//! zoom function) or, for properties that may vary per feature, a
//! [`DataDrivenPropertyValue`]. Evaluators resolve those values against a set of
//! [`PropertyEvaluationParameters`]:
//!
//! - [`PropertyEvaluator`] produces a plain value.
//! - [`DataDrivenPropertyEvaluator`] produces a [`PossiblyEvaluatedProperty`], which
//!   keeps per-feature functions unevaluated until tessellation.
//! - [`CrossFadedPropertyEvaluator`] produces a [`Faded`] pair used to blend
//!   pattern-like properties across integer zoom levels.
//!
//! Nothing in this crate touches the GPU. Evaluation is pure, so all of it may run
//! on worker threads.

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

mod evaluator;
mod feature;
mod function;
pub mod geometry;
mod interpolate;
mod property_value;
mod transition;
mod types;

pub use evaluator::{
    CrossFadedPropertyEvaluator, DataDrivenPropertyEvaluator, Faded, PossiblyEvaluatedProperty,
    PropertyEvaluationParameters, PropertyEvaluator,
};
pub use feature::{
    each_filtered_feature, Feature, FeatureIndex, FeatureType, Filter, GeometryTileLayer,
    IndexedFeature, LinearFeatureIndex, Value,
};
pub use function::{FromFeatureValue, PropertyFunction, SourceStops, Stops, ZoomFunction};
pub use interpolate::{interpolate, Interpolate};
pub use property_value::{
    DataDrivenPropertyValue, DataDrivenPropertyValueVisitor, PropertyValue, PropertyValueVisitor,
};
pub use transition::{
    CascadeParameters, TransitionOptions, Transitionable, Transitioning, UnitBezier,
    DEFAULT_TRANSITION_EASE,
};
pub use types::{LineCap, LineJoin, TranslateAnchor};

/// Colour type used by style properties.
pub use peniko::Color;
/// 2D geometry primitives.
pub use peniko::kurbo;

use thiserror::Error;

/// Errors that can occur while building style functions.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A function was built without any stops.
    #[error("Function has no stops")]
    EmptyStops,
    /// Stop inputs must be strictly increasing.
    #[error("Stop input {current} does not follow previous input {previous}")]
    UnorderedStops {
        /// The input of the previous stop.
        previous: f32,
        /// The offending input.
        current: f32,
    },
    /// Exponential stops need a strictly positive base.
    #[error("Exponential base must be positive, got {0}")]
    InvalidBase(f32),
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
