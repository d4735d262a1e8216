// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom functions and per-feature property functions.

use crate::{Color, Error, Feature, Interpolate, Result, Value};

/// An ordered list of `(input, output)` stops.
///
/// Construction guarantees at least one stop and strictly increasing inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Stops<T> {
    kind: StopsKind,
    stops: Vec<(f32, T)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum StopsKind {
    /// Outputs are blended between the two stops bracketing the input.
    Exponential { base: f32 },
    /// The output of the last stop whose input is not greater than the input.
    Interval,
}

impl<T> Stops<T> {
    pub fn exponential(base: f32, stops: Vec<(f32, T)>) -> Result<Self> {
        if !(base > 0.0) {
            return Err(Error::InvalidBase(base));
        }
        validate(&stops)?;
        Ok(Self {
            kind: StopsKind::Exponential { base },
            stops,
        })
    }

    /// Exponential stops with base 1, i.e. linear interpolation.
    pub fn linear(stops: Vec<(f32, T)>) -> Result<Self> {
        Self::exponential(1.0, stops)
    }

    pub fn interval(stops: Vec<(f32, T)>) -> Result<Self> {
        validate(&stops)?;
        Ok(Self {
            kind: StopsKind::Interval,
            stops,
        })
    }

    pub fn stops(&self) -> &[(f32, T)] {
        &self.stops
    }
}

fn validate<T>(stops: &[(f32, T)]) -> Result<()> {
    if stops.is_empty() {
        return Err(Error::EmptyStops);
    }
    for pair in stops.windows(2) {
        let (previous, current) = (pair[0].0, pair[1].0);
        if !(current > previous) {
            return Err(Error::UnorderedStops { previous, current });
        }
    }
    Ok(())
}

impl<T: Interpolate + Clone> Stops<T> {
    pub fn evaluate(&self, input: f32) -> T {
        let stops = &self.stops;
        // Index of the first stop strictly above `input`.
        let upper = stops.partition_point(|(z, _)| *z <= input);
        if upper == 0 {
            return stops[0].1.clone();
        }
        let (z0, v0) = &stops[upper - 1];
        match self.kind {
            StopsKind::Interval => v0.clone(),
            StopsKind::Exponential { base } => {
                let Some((z1, v1)) = stops.get(upper) else {
                    return v0.clone();
                };
                T::interpolate(v0, v1, interpolation_factor(base, *z0, *z1, input))
            }
        }
    }
}

/// How far `input` lies between `lower` and `upper`, on an exponential curve of the
/// given `base`.
pub(crate) fn interpolation_factor(base: f32, lower: f32, upper: f32, input: f32) -> f64 {
    let difference = f64::from(upper - lower);
    let progress = f64::from(input - lower);
    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        let base = f64::from(base);
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

/// A property defined as a curve over map zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomFunction<T> {
    pub stops: Stops<T>,
}

impl<T> ZoomFunction<T> {
    pub fn new(stops: Stops<T>) -> Self {
        Self { stops }
    }
}

impl<T: Interpolate + Clone> ZoomFunction<T> {
    pub fn evaluate(&self, zoom: f32) -> T {
        self.stops.evaluate(zoom)
    }
}

/// Conversion of a raw feature value, used by identity functions.
///
/// The default implementation rejects every value, which makes identity functions
/// fall back to their default.
pub trait FromFeatureValue: Sized {
    fn from_feature_value(_value: &Value) -> Option<Self> {
        None
    }
}

impl FromFeatureValue for f32 {
    fn from_feature_value(value: &Value) -> Option<Self> {
        value.as_number().map(|n| n as Self)
    }
}

impl FromFeatureValue for String {
    fn from_feature_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromFeatureValue for bool {
    fn from_feature_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// Colour strings are resolved by the style parser, not here.
impl FromFeatureValue for Color {}

/// Stops of a per-feature function.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceStops<T> {
    /// Numeric stops keyed on a numeric feature property.
    Numeric(Stops<T>),
    /// Exact matches on the feature property value.
    Categorical(Vec<(Value, T)>),
    /// The feature property value itself.
    Identity,
}

/// A property whose value depends on a property of each feature.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFunction<T> {
    pub property: String,
    pub stops: SourceStops<T>,
    pub default_value: Option<T>,
}

impl<T> PropertyFunction<T> {
    pub fn new(property: impl Into<String>, stops: SourceStops<T>) -> Self {
        Self {
            property: property.into(),
            stops,
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: T) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

impl<T: Interpolate + FromFeatureValue + Clone> PropertyFunction<T> {
    /// Resolves the function for `feature`.
    ///
    /// Features lacking the property, or carrying a value the stops cannot use,
    /// get the function's default, then `fallback`.
    pub fn evaluate(&self, feature: &dyn Feature, fallback: T) -> T {
        let resolved = feature
            .value(&self.property)
            .and_then(|value| match &self.stops {
                SourceStops::Numeric(stops) => {
                    value.as_number().map(|n| stops.evaluate(n as f32))
                }
                SourceStops::Categorical(categories) => categories
                    .iter()
                    .find(|(key, _)| *key == value)
                    .map(|(_, v)| v.clone()),
                SourceStops::Identity => T::from_feature_value(&value),
            });
        resolved
            .or_else(|| self.default_value.clone())
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryCollection;
    use crate::FeatureType;

    struct Props(Vec<(&'static str, Value)>);

    impl Feature for Props {
        fn feature_type(&self) -> FeatureType {
            FeatureType::LineString
        }

        fn value(&self, key: &str) -> Option<Value> {
            self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
        }

        fn geometries(&self) -> GeometryCollection {
            vec![]
        }
    }

    #[test]
    fn stops_are_only_built_validated() {
        let stops = Stops::interval(vec![(3.0, 1.0_f32), (5.0, 2.0)]).unwrap();
        assert_eq!(stops.stops(), &[(3.0, 1.0), (5.0, 2.0)]);
        let function = ZoomFunction::new(stops);
        assert_eq!(function.evaluate(0.0), 1.0);
        assert_eq!(function.evaluate(4.0), 1.0);
        assert_eq!(function.evaluate(9.0), 2.0);
    }

    #[test]
    fn stops_must_be_ordered_and_non_empty() {
        assert_eq!(
            Stops::<f32>::interval(vec![]).unwrap_err(),
            Error::EmptyStops
        );
        assert_eq!(
            Stops::linear(vec![(5.0, 1.0_f32), (5.0, 2.0)]).unwrap_err(),
            Error::UnorderedStops {
                previous: 5.0,
                current: 5.0
            }
        );
        assert_eq!(
            Stops::exponential(0.0, vec![(5.0, 1.0_f32)]).unwrap_err(),
            Error::InvalidBase(0.0)
        );
    }

    #[test]
    fn linear_stops_clamp_and_blend() {
        let f = ZoomFunction::new(Stops::linear(vec![(10.0, 1.0_f32), (20.0, 11.0)]).unwrap());
        assert_eq!(f.evaluate(0.0), 1.0);
        assert_eq!(f.evaluate(15.0), 6.0);
        assert_eq!(f.evaluate(25.0), 11.0);
    }

    #[test]
    fn exponential_stops_favour_the_lower_end() {
        let f = ZoomFunction::new(Stops::exponential(2.0, vec![(0.0, 0.0_f32), (2.0, 3.0)]).unwrap());
        // (2^1 - 1) / (2^2 - 1) = 1/3
        assert!((f.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn interval_stops_step() {
        let f = ZoomFunction::new(
            Stops::interval(vec![(5.0, "a".to_string()), (10.0, "b".to_string())]).unwrap(),
        );
        assert_eq!(f.evaluate(4.0), "a");
        assert_eq!(f.evaluate(9.9), "a");
        assert_eq!(f.evaluate(10.0), "b");
    }

    #[test]
    fn property_functions_read_feature_values() {
        let feature = Props(vec![
            ("lanes", Value::Number(4.0)),
            ("class", Value::String("motorway".into())),
        ]);
        let width = PropertyFunction::new(
            "lanes",
            SourceStops::Numeric(Stops::linear(vec![(0.0, 0.0_f32), (8.0, 16.0)]).unwrap()),
        );
        assert_eq!(width.evaluate(&feature, 1.0), 8.0);

        let opacity = PropertyFunction::new(
            "class",
            SourceStops::Categorical(vec![(Value::String("motorway".into()), 0.5_f32)]),
        );
        assert_eq!(opacity.evaluate(&feature, 1.0), 0.5);

        let identity = PropertyFunction::<f32>::new("lanes", SourceStops::Identity);
        assert_eq!(identity.evaluate(&feature, 1.0), 4.0);
    }

    #[test]
    fn property_functions_fall_back_to_defaults() {
        let feature = Props(vec![("class", Value::String("path".into()))]);
        let f = PropertyFunction::new(
            "class",
            SourceStops::Categorical(vec![(Value::String("motorway".into()), 0.5_f32)]),
        );
        assert_eq!(f.evaluate(&feature, 1.0), 1.0);
        assert_eq!(f.clone().with_default(0.25).evaluate(&feature, 1.0), 0.25);

        let missing = PropertyFunction::<f32>::new("lanes", SourceStops::Identity);
        assert_eq!(missing.evaluate(&feature, 2.0), 2.0);
    }
}
