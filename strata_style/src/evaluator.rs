// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluators resolving property values at a zoom level.

use std::time::Duration;

use crate::{
    DataDrivenPropertyValueVisitor, Feature, FromFeatureValue, Interpolate, PropertyFunction,
    PropertyValueVisitor, ZoomFunction,
};

/// The inputs every property evaluation depends on.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PropertyEvaluationParameters {
    /// The (possibly fractional) zoom level.
    pub z: f32,
    /// Current time, used to progress transitions.
    pub now: Duration,
}

impl PropertyEvaluationParameters {
    pub fn new(z: f32) -> Self {
        Self {
            z,
            now: Duration::ZERO,
        }
    }

    pub fn at(z: f32, now: Duration) -> Self {
        Self { z, now }
    }

    /// The same parameters snapped to the integer zoom at or below `z`.
    pub fn floored(self) -> Self {
        Self {
            z: self.z.floor(),
            ..self
        }
    }
}

/// Resolves a property to a plain value.
#[derive(Clone, Debug)]
pub struct PropertyEvaluator<T> {
    parameters: PropertyEvaluationParameters,
    default_value: T,
}

impl<T> PropertyEvaluator<T> {
    pub fn new(parameters: PropertyEvaluationParameters, default_value: T) -> Self {
        Self {
            parameters,
            default_value,
        }
    }
}

impl<T: Interpolate + Clone> PropertyValueVisitor<T> for PropertyEvaluator<T> {
    type Output = T;

    fn undefined(&self) -> T {
        self.default_value.clone()
    }

    fn constant(&self, value: &T) -> T {
        value.clone()
    }

    fn zoom_function(&self, function: &ZoomFunction<T>) -> T {
        function.evaluate(self.parameters.z)
    }
}

/// The result of evaluating a data-driven property: either a final value, or a
/// per-feature function still to be applied to each feature.
#[derive(Clone, Debug, PartialEq)]
pub enum PossiblyEvaluatedProperty<T> {
    Constant(T),
    Function(PropertyFunction<T>),
}

impl<T> PossiblyEvaluatedProperty<T> {
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn constant(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            Self::Function(_) => None,
        }
    }
}

impl<T: Clone> PossiblyEvaluatedProperty<T> {
    /// The constant value, or `fallback` when the value still depends on features.
    pub fn evaluated_value_or(&self, fallback: T) -> T {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Function(_) => fallback,
        }
    }
}

impl<T: Interpolate + FromFeatureValue + Clone> PossiblyEvaluatedProperty<T> {
    /// Resolves the value for one feature.
    pub fn evaluate(&self, feature: &dyn Feature, fallback: T) -> T {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Function(function) => function.evaluate(feature, fallback),
        }
    }
}

impl<T> From<T> for PossiblyEvaluatedProperty<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T: Interpolate + Clone> Interpolate for PossiblyEvaluatedProperty<T> {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Constant(a), Self::Constant(b)) => Self::Constant(T::interpolate(a, b, t)),
            _ => a.clone(),
        }
    }
}

/// Resolves a property that may vary per feature.
#[derive(Clone, Debug)]
pub struct DataDrivenPropertyEvaluator<T> {
    parameters: PropertyEvaluationParameters,
    default_value: T,
}

impl<T> DataDrivenPropertyEvaluator<T> {
    pub fn new(parameters: PropertyEvaluationParameters, default_value: T) -> Self {
        Self {
            parameters,
            default_value,
        }
    }
}

impl<T: Interpolate + Clone> PropertyValueVisitor<T> for DataDrivenPropertyEvaluator<T> {
    type Output = PossiblyEvaluatedProperty<T>;

    fn undefined(&self) -> Self::Output {
        PossiblyEvaluatedProperty::Constant(self.default_value.clone())
    }

    fn constant(&self, value: &T) -> Self::Output {
        PossiblyEvaluatedProperty::Constant(value.clone())
    }

    fn zoom_function(&self, function: &ZoomFunction<T>) -> Self::Output {
        PossiblyEvaluatedProperty::Constant(function.evaluate(self.parameters.z))
    }
}

impl<T: Interpolate + Clone> DataDrivenPropertyValueVisitor<T> for DataDrivenPropertyEvaluator<T> {
    fn property_function(&self, function: &PropertyFunction<T>) -> Self::Output {
        PossiblyEvaluatedProperty::Function(function.clone())
    }
}

/// A property sampled at the two integer zoom levels around the current zoom.
///
/// `from` was sampled at `floor(z)` and `to` at `floor(z) + 1`. Renderers draw
/// both, scaled by `from_scale` and `to_scale`, and mix them by `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct Faded<T> {
    pub from: T,
    pub to: T,
    /// `2^(z - floor(z))`, always in `[1, 2)`.
    pub from_scale: f32,
    /// `2^(z - floor(z) - 1)`, always in `[0.5, 1)`.
    pub to_scale: f32,
    /// Weight of `to`, the fractional part of the zoom.
    pub t: f32,
}

impl<T: Clone> Interpolate for Faded<T> {
    fn interpolate(a: &Self, _: &Self, _: f64) -> Self {
        a.clone()
    }
}

/// Resolves a property into a [`Faded`] pair for cross-fading between zoom levels.
#[derive(Clone, Debug)]
pub struct CrossFadedPropertyEvaluator<T> {
    parameters: PropertyEvaluationParameters,
    default_value: T,
}

impl<T> CrossFadedPropertyEvaluator<T> {
    pub fn new(parameters: PropertyEvaluationParameters, default_value: T) -> Self {
        Self {
            parameters,
            default_value,
        }
    }

    fn calculate(&self, from: T, to: T) -> Faded<T> {
        let z = if self.parameters.z.is_finite() {
            self.parameters.z
        } else {
            0.0
        };
        let fraction = (z - z.floor()).clamp(0.0, 1.0);
        Faded {
            from,
            to,
            from_scale: fraction.exp2(),
            to_scale: (fraction - 1.0).exp2(),
            t: fraction,
        }
    }
}

impl<T: Interpolate + Clone> PropertyValueVisitor<T> for CrossFadedPropertyEvaluator<T> {
    type Output = Faded<T>;

    fn undefined(&self) -> Faded<T> {
        self.calculate(self.default_value.clone(), self.default_value.clone())
    }

    fn constant(&self, value: &T) -> Faded<T> {
        self.calculate(value.clone(), value.clone())
    }

    fn zoom_function(&self, function: &ZoomFunction<T>) -> Faded<T> {
        let z = self.parameters.z.floor();
        self.calculate(function.evaluate(z), function.evaluate(z + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, DataDrivenPropertyValue, PropertyValue, SourceStops, Stops};

    // Evaluated properties are handed from evaluation to tessellation workers.
    static_assertions::assert_impl_all!(PossiblyEvaluatedProperty<Color>: Send, Sync);
    static_assertions::assert_impl_all!(Faded<Vec<f32>>: Send, Sync);

    fn params(z: f32) -> PropertyEvaluationParameters {
        PropertyEvaluationParameters::new(z)
    }

    fn width_curve() -> ZoomFunction<f32> {
        ZoomFunction::new(Stops::linear(vec![(10.0, 1.0), (20.0, 11.0)]).unwrap())
    }

    #[test]
    fn plain_evaluator_covers_every_variant() {
        let evaluator = PropertyEvaluator::new(params(15.0), 7.0_f32);
        assert_eq!(PropertyValue::Undefined.evaluate(&evaluator), 7.0);
        assert_eq!(PropertyValue::from(3.0).evaluate(&evaluator), 3.0);
        assert_eq!(
            PropertyValue::ZoomFunction(width_curve()).evaluate(&evaluator),
            width_curve().evaluate(15.0)
        );
    }

    #[test]
    fn data_driven_evaluator_defers_feature_functions() {
        let evaluator = DataDrivenPropertyEvaluator::new(params(12.0), 1.0_f32);
        let function = PropertyFunction::new("lanes", SourceStops::<f32>::Identity);
        let value = DataDrivenPropertyValue::PropertyFunction(function.clone());
        let evaluated = value.evaluate(&evaluator);
        assert!(!evaluated.is_constant());
        assert_eq!(evaluated, PossiblyEvaluatedProperty::Function(function));
        assert_eq!(evaluated.evaluated_value_or(0.5), 0.5);

        let evaluated = DataDrivenPropertyValue::ZoomFunction(width_curve()).evaluate(&evaluator);
        assert_eq!(evaluated, PossiblyEvaluatedProperty::Constant(3.0));
        assert_eq!(
            DataDrivenPropertyValue::Undefined.evaluate(&evaluator),
            PossiblyEvaluatedProperty::Constant(1.0)
        );
    }

    #[test]
    fn possibly_evaluated_interpolates_constants_only() {
        let a = PossiblyEvaluatedProperty::Constant(0.0_f32);
        let b = PossiblyEvaluatedProperty::Constant(10.0_f32);
        assert_eq!(
            Interpolate::interpolate(&a, &b, 0.5),
            PossiblyEvaluatedProperty::Constant(5.0)
        );
        let f = PossiblyEvaluatedProperty::Function(PropertyFunction::new(
            "lanes",
            SourceStops::Identity,
        ));
        assert_eq!(Interpolate::interpolate(&f, &b, 0.5), f);
        assert_eq!(Interpolate::interpolate(&a, &f, 0.5), a);
    }

    #[test]
    fn cross_fade_samples_bracketing_zooms() {
        let dashes = ZoomFunction::new(
            Stops::interval(vec![(0.0, vec![1.0_f32]), (11.0, vec![2.0, 2.0])]).unwrap(),
        );
        let evaluator = CrossFadedPropertyEvaluator::new(params(10.25), vec![]);
        let faded = PropertyValue::ZoomFunction(dashes).evaluate(&evaluator);
        assert_eq!(faded.from, vec![1.0]);
        assert_eq!(faded.to, vec![2.0, 2.0]);
        assert_eq!(faded.t, 0.25);
        assert_eq!(faded.from_scale, 0.25_f32.exp2());
        assert_eq!(faded.to_scale, (-0.75_f32).exp2());
    }

    #[test]
    fn cross_fade_of_undefined_is_degenerate() {
        let evaluator = CrossFadedPropertyEvaluator::new(params(3.5), "dots".to_string());
        let faded = PropertyValue::Undefined.evaluate(&evaluator);
        assert_eq!(faded.from, "dots");
        assert_eq!(faded.to, "dots");
    }

    #[test]
    fn cross_fade_output_stays_in_range() {
        let values = [
            PropertyValue::Undefined,
            PropertyValue::from(4.0_f32),
            PropertyValue::ZoomFunction(width_curve()),
        ];
        let mut z = -3.0_f32;
        while z < 25.0 {
            for value in &values {
                let faded = value.evaluate(&CrossFadedPropertyEvaluator::new(params(z), 1.0));
                assert!(faded.from_scale > 0.0, "z = {z}");
                assert!(faded.to_scale > 0.0, "z = {z}");
                assert!((0.0..=1.0).contains(&faded.t), "z = {z}");
            }
            z += 0.13;
        }
        for z in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let faded = PropertyValue::from(1.0_f32)
                .evaluate(&CrossFadedPropertyEvaluator::new(params(z), 1.0));
            assert!(faded.from_scale > 0.0 && faded.to_scale > 0.0);
            assert!((0.0..=1.0).contains(&faded.t));
        }
    }
}
