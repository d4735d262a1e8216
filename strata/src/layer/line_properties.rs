// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::mem;

use strata_style::{
    CascadeParameters, Color, CrossFadedPropertyEvaluator, DataDrivenPropertyEvaluator,
    DataDrivenPropertyValue, Faded, Interpolate, LineCap, LineJoin, PossiblyEvaluatedProperty,
    PropertyEvaluationParameters, PropertyEvaluator, PropertyValue, TranslateAnchor,
    Transitionable, Transitioning,
};

/// Layout properties of a line layer, fixed at tessellation time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineLayoutProperties {
    pub cap: PropertyValue<LineCap>,
    pub join: PropertyValue<LineJoin>,
    pub miter_limit: PropertyValue<f32>,
    pub round_limit: PropertyValue<f32>,
}

impl LineLayoutProperties {
    pub fn evaluate(&self, parameters: &PropertyEvaluationParameters) -> EvaluatedLineLayout {
        let defaults = EvaluatedLineLayout::default();
        EvaluatedLineLayout {
            cap: self.cap.evaluate(&PropertyEvaluator::new(*parameters, defaults.cap)),
            join: self.join.evaluate(&PropertyEvaluator::new(*parameters, defaults.join)),
            miter_limit: self
                .miter_limit
                .evaluate(&PropertyEvaluator::new(*parameters, defaults.miter_limit)),
            round_limit: self
                .round_limit
                .evaluate(&PropertyEvaluator::new(*parameters, defaults.round_limit)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluatedLineLayout {
    pub cap: LineCap,
    pub join: LineJoin,
    /// Longest miter, in units of the line width, before a join is beveled.
    pub miter_limit: f32,
    /// Longest miter of bevel and round joins before they are drawn as such.
    pub round_limit: f32,
}

impl Default for EvaluatedLineLayout {
    fn default() -> Self {
        Self {
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 2.0,
            round_limit: 1.05,
        }
    }
}

/// Paint properties of a line layer as authored, each with its transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinePaintProperties {
    pub opacity: Transitionable<DataDrivenPropertyValue<f32>>,
    pub color: Transitionable<DataDrivenPropertyValue<Color>>,
    /// Paint-time translation in pixels.
    pub translate: Transitionable<PropertyValue<[f32; 2]>>,
    pub translate_anchor: Transitionable<PropertyValue<TranslateAnchor>>,
    pub width: Transitionable<PropertyValue<f32>>,
    /// Width of the gap between two strokes drawn either side of the line.
    pub gap_width: Transitionable<DataDrivenPropertyValue<f32>>,
    /// Perpendicular offset of the line, positive to the left.
    pub offset: Transitionable<DataDrivenPropertyValue<f32>>,
    pub blur: Transitionable<DataDrivenPropertyValue<f32>>,
    pub dasharray: Transitionable<PropertyValue<Vec<f32>>>,
    pub pattern: Transitionable<PropertyValue<String>>,
}

/// Paint properties resolved for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedLinePaint {
    pub opacity: PossiblyEvaluatedProperty<f32>,
    pub color: PossiblyEvaluatedProperty<Color>,
    pub translate: [f32; 2],
    pub translate_anchor: TranslateAnchor,
    pub width: f32,
    pub gap_width: PossiblyEvaluatedProperty<f32>,
    pub offset: PossiblyEvaluatedProperty<f32>,
    pub blur: PossiblyEvaluatedProperty<f32>,
    pub dasharray: Faded<Vec<f32>>,
    pub pattern: Faded<String>,
    /// `width` at the integer zoom at or below the current one, which dash
    /// patterns are scaled by so they do not crawl while zooming.
    pub dash_line_width: f32,
}

impl Default for EvaluatedLinePaint {
    fn default() -> Self {
        TransitioningLinePaint::default().evaluate(&PropertyEvaluationParameters::default())
    }
}

const DEFAULT_OPACITY: f32 = 1.0;
const DEFAULT_COLOR: Color = Color::BLACK;
const DEFAULT_WIDTH: f32 = 1.0;

/// Running transitions of every paint property.
#[derive(Clone, Debug, Default)]
pub(crate) struct TransitioningLinePaint {
    opacity: Transitioning<DataDrivenPropertyValue<f32>>,
    color: Transitioning<DataDrivenPropertyValue<Color>>,
    translate: Transitioning<PropertyValue<[f32; 2]>>,
    translate_anchor: Transitioning<PropertyValue<TranslateAnchor>>,
    width: Transitioning<PropertyValue<f32>>,
    gap_width: Transitioning<DataDrivenPropertyValue<f32>>,
    offset: Transitioning<DataDrivenPropertyValue<f32>>,
    blur: Transitioning<DataDrivenPropertyValue<f32>>,
    dasharray: Transitioning<PropertyValue<Vec<f32>>>,
    pattern: Transitioning<PropertyValue<String>>,
}

fn plain<T: Interpolate + Clone>(
    parameters: PropertyEvaluationParameters,
    default_value: T,
) -> impl Fn(&PropertyValue<T>) -> T {
    let evaluator = PropertyEvaluator::new(parameters, default_value);
    move |value| value.evaluate(&evaluator)
}

fn data_driven<T: Interpolate + Clone>(
    parameters: PropertyEvaluationParameters,
    default_value: T,
) -> impl Fn(&DataDrivenPropertyValue<T>) -> PossiblyEvaluatedProperty<T> {
    let evaluator = DataDrivenPropertyEvaluator::new(parameters, default_value);
    move |value| value.evaluate(&evaluator)
}

fn cross_faded<T: Interpolate + Clone>(
    parameters: PropertyEvaluationParameters,
    default_value: T,
) -> impl Fn(&PropertyValue<T>) -> Faded<T> {
    let evaluator = CrossFadedPropertyEvaluator::new(parameters, default_value);
    move |value| value.evaluate(&evaluator)
}

impl TransitioningLinePaint {
    /// Starts transitions for every property whose authored value changed.
    pub(crate) fn cascade(&mut self, paint: &LinePaintProperties, parameters: &CascadeParameters) {
        self.opacity = paint.opacity.transition(parameters, mem::take(&mut self.opacity));
        self.color = paint.color.transition(parameters, mem::take(&mut self.color));
        self.translate = paint
            .translate
            .transition(parameters, mem::take(&mut self.translate));
        self.translate_anchor = paint
            .translate_anchor
            .transition(parameters, mem::take(&mut self.translate_anchor));
        self.width = paint.width.transition(parameters, mem::take(&mut self.width));
        self.gap_width = paint
            .gap_width
            .transition(parameters, mem::take(&mut self.gap_width));
        self.offset = paint.offset.transition(parameters, mem::take(&mut self.offset));
        self.blur = paint.blur.transition(parameters, mem::take(&mut self.blur));
        self.dasharray = paint
            .dasharray
            .transition(parameters, mem::take(&mut self.dasharray));
        self.pattern = paint.pattern.transition(parameters, mem::take(&mut self.pattern));
    }

    pub(crate) fn has_transition(&self) -> bool {
        self.opacity.has_transition()
            || self.color.has_transition()
            || self.translate.has_transition()
            || self.translate_anchor.has_transition()
            || self.width.has_transition()
            || self.gap_width.has_transition()
            || self.offset.has_transition()
            || self.blur.has_transition()
            || self.dasharray.has_transition()
            || self.pattern.has_transition()
    }

    pub(crate) fn evaluate(&mut self, parameters: &PropertyEvaluationParameters) -> EvaluatedLinePaint {
        let now = parameters.now;
        let p = *parameters;
        EvaluatedLinePaint {
            opacity: self.opacity.evaluate(now, &data_driven(p, DEFAULT_OPACITY)),
            color: self.color.evaluate(now, &data_driven(p, DEFAULT_COLOR)),
            translate: self.translate.evaluate(now, &plain(p, [0.0, 0.0])),
            translate_anchor: self
                .translate_anchor
                .evaluate(now, &plain(p, TranslateAnchor::Map)),
            dash_line_width: self.width.evaluate(now, &plain(p.floored(), DEFAULT_WIDTH)),
            width: self.width.evaluate(now, &plain(p, DEFAULT_WIDTH)),
            gap_width: self.gap_width.evaluate(now, &data_driven(p, 0.0)),
            offset: self.offset.evaluate(now, &data_driven(p, 0.0)),
            blur: self.blur.evaluate(now, &data_driven(p, 0.0)),
            dasharray: self.dasharray.evaluate(now, &cross_faded(p, Vec::new())),
            pattern: self.pattern.evaluate(now, &cross_faded(p, String::new())),
        }
    }
}
