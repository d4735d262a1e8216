// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Color, LineCap, LineJoin, TranslateAnchor};

/// Values which can be blended between two endpoints.
///
/// Used both by exponential zoom functions and by property transitions.
/// Types without a meaningful blend (strings, enums) return `a` unchanged.
pub trait Interpolate: Sized {
    /// Blend from `a` (at `t == 0`) to `b` (at `t == 1`).
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self;
}

/// Free-function form of [`Interpolate::interpolate`].
pub fn interpolate<T: Interpolate>(a: &T, b: &T, t: f64) -> T {
    T::interpolate(a, b, t)
}

impl Interpolate for f32 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        (f64::from(*a) * (1.0 - t) + f64::from(*b) * t) as f32
    }
}

impl Interpolate for f64 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        a * (1.0 - t) + b * t
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        core::array::from_fn(|i| f32::interpolate(&a[i], &b[i], t))
    }
}

impl Interpolate for Color {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        Self::new(<[f32; 4]>::interpolate(&a.components, &b.components, t))
    }
}

impl Interpolate for Vec<f32> {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        if a.len() != b.len() {
            return a.clone();
        }
        a.iter()
            .zip(b)
            .map(|(a, b)| f32::interpolate(a, b, t))
            .collect()
    }
}

macro_rules! uninterpolated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Interpolate for $ty {
                fn interpolate(a: &Self, _: &Self, _: f64) -> Self {
                    a.clone()
                }
            }
        )*
    };
}

uninterpolated!(bool, String, LineCap, LineJoin, TranslateAnchor);
