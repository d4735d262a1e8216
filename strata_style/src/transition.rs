// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated transitions between successive values of a paint property.

use std::time::Duration;

use crate::Interpolate;

/// Timing of a property transition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionOptions {
    pub duration: Option<Duration>,
    pub delay: Option<Duration>,
}

impl TransitionOptions {
    pub fn new(duration: Duration, delay: Duration) -> Self {
        Self {
            duration: Some(duration),
            delay: Some(delay),
        }
    }

    /// Fills unset fields from `defaults`.
    pub fn reverse_merge(&self, defaults: &Self) -> Self {
        Self {
            duration: self.duration.or(defaults.duration),
            delay: self.delay.or(defaults.delay),
        }
    }
}

/// Inputs of a cascade.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CascadeParameters {
    pub now: Duration,
    /// Style-wide transition, used for properties without their own options.
    pub transition: TransitionOptions,
}

/// A style-authored value together with its transition options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transitionable<V> {
    pub value: V,
    pub options: TransitionOptions,
}

impl<V> Transitionable<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            options: TransitionOptions::default(),
        }
    }
}

impl<V: Clone + PartialEq> Transitionable<V> {
    /// Starts a transition from `prior` to this value.
    ///
    /// Returns `prior` untouched when it already targets this value, so repeated
    /// cascades do not restart running transitions.
    pub fn transition(&self, parameters: &CascadeParameters, prior: Transitioning<V>) -> Transitioning<V> {
        if prior.value == self.value {
            return prior;
        }
        let options = self.options.reverse_merge(&parameters.transition);
        Transitioning::new(self.value.clone(), prior, options, parameters.now)
    }
}

/// A value which may still be blending in from an earlier one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transitioning<V> {
    prior: Option<Box<Transitioning<V>>>,
    begin: Duration,
    end: Duration,
    value: V,
}

impl<V> Transitioning<V> {
    pub fn new(value: V, prior: Self, options: TransitionOptions, now: Duration) -> Self {
        let begin = now + options.delay.unwrap_or_default();
        let end = begin + options.duration.unwrap_or_default();
        Self {
            prior: (end > now).then(|| Box::new(prior)),
            begin,
            end,
            value,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn has_transition(&self) -> bool {
        self.prior.is_some()
    }

    /// Evaluates the value at `now`, blending from the prior value while the
    /// transition runs. Finished transitions are discarded.
    pub fn evaluate<R: Interpolate>(&mut self, now: Duration, evaluate: &impl Fn(&V) -> R) -> R {
        let final_value = evaluate(&self.value);
        let Some(prior) = self.prior.as_mut() else {
            return final_value;
        };
        if now >= self.end {
            self.prior = None;
            return final_value;
        }
        let prior_value = prior.evaluate(now, evaluate);
        if now < self.begin {
            return prior_value;
        }
        let t = (now - self.begin).as_secs_f64() / (self.end - self.begin).as_secs_f64();
        R::interpolate(&prior_value, &final_value, DEFAULT_TRANSITION_EASE.solve(t, 1e-3))
    }
}

/// A cubic Bézier easing curve from `(0, 0)` to `(1, 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnitBezier {
    p1: (f64, f64),
    p2: (f64, f64),
}

/// `cubic-bezier(0, 0, 0.25, 1)`: fast start, gentle landing.
pub const DEFAULT_TRANSITION_EASE: UnitBezier = UnitBezier::new(0.0, 0.0, 0.25, 1.0);

impl UnitBezier {
    pub const fn new(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        Self {
            p1: (p1x, p1y),
            p2: (p2x, p2y),
        }
    }

    fn coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (a, b, c)
    }

    fn sample((a, b, c): (f64, f64, f64), t: f64) -> f64 {
        ((a * t + b) * t + c) * t
    }

    fn solve_curve_x(&self, x: f64, epsilon: f64) -> f64 {
        let coeffs = Self::coefficients(self.p1.0, self.p2.0);
        let (a, b, c) = coeffs;

        // Newton's method first, it converges quickly on well-behaved curves.
        let mut t = x;
        for _ in 0..8 {
            let error = Self::sample(coeffs, t) - x;
            if error.abs() < epsilon {
                return t;
            }
            let derivative = (3.0 * a * t + 2.0 * b) * t + c;
            if derivative.abs() < 1e-6 {
                break;
            }
            t -= error / derivative;
        }

        // Fall back to bisection.
        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }
        for _ in 0..64 {
            let sample = Self::sample(coeffs, t);
            if (sample - x).abs() < epsilon {
                break;
            }
            if x > sample {
                lo = t;
            } else {
                hi = t;
            }
            t = (hi - lo) * 0.5 + lo;
        }
        t
    }

    /// The eased progress for a linear progress `x` in `[0, 1]`.
    pub fn solve(&self, x: f64, epsilon: f64) -> f64 {
        let t = self.solve_curve_x(x.clamp(0.0, 1.0), epsilon);
        Self::sample(Self::coefficients(self.p1.1, self.p2.1), t)
    }
}
