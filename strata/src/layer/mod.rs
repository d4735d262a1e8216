// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style layers: property evaluation, bucket construction and hit testing.

mod line;
mod line_properties;

pub use line::LineLayer;
pub use line_properties::{
    EvaluatedLineLayout, EvaluatedLinePaint, LineLayoutProperties, LinePaintProperties,
};

use std::fmt;

use strata_style::{FeatureIndex, GeometryTileLayer};

use crate::OverscaledTileId;

/// Whether a layer draws anything this frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderPass {
    /// Nothing visible; the renderer skips the layer.
    #[default]
    None,
    Translucent,
}

/// The tile a bucket is built for, and where its features are indexed.
pub struct BucketParameters<'a> {
    pub tile_id: OverscaledTileId,
    /// The source layer of the tile the style layer reads from.
    pub layer: &'a dyn GeometryTileLayer,
    pub feature_index: &'a mut dyn FeatureIndex,
}

impl fmt::Debug for BucketParameters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketParameters")
            .field("tile_id", &self.tile_id)
            .field("layer", &self.layer.name())
            .finish_non_exhaustive()
    }
}
