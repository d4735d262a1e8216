// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How the ends of a line are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// The line ends exactly at its last point.
    #[default]
    Butt,
    /// The line is extended by a half circle of diameter `line-width`.
    Round,
    /// The line is extended by a half square of side `line-width`.
    Square,
}

/// How consecutive line segments are joined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// The corner is cut off flat.
    Bevel,
    /// The corner is rounded.
    Round,
    /// The outer edges are extended until they meet, subject to the miter limit.
    #[default]
    Miter,
}

/// The frame of reference of a paint-time translation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TranslateAnchor {
    /// Translation is relative to the map and rotates with it.
    #[default]
    Map,
    /// Translation is relative to the viewport and ignores the map bearing.
    Viewport,
}
