// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Tile coordinates span `0..EXTENT` along each axis.
pub const EXTENT: f64 = 8192.0;

/// Size of a tile on screen at its own zoom, in pixels.
pub const TILE_SIZE: f64 = 512.0;

/// A tile of the canonical tile pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalTileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile, possibly displayed at a zoom beyond the deepest level its source
/// provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverscaledTileId {
    /// The zoom the tile is displayed at; never below `canonical.z`.
    pub overscaled_z: u8,
    pub canonical: CanonicalTileId,
}

impl OverscaledTileId {
    pub fn new(overscaled_z: u8, canonical: CanonicalTileId) -> Self {
        Self {
            overscaled_z: overscaled_z.max(canonical.z),
            canonical,
        }
    }

    /// How many times the source tile is magnified. Ids displayed below their
    /// own zoom are not magnified.
    pub fn overscale_factor(&self) -> u32 {
        1_u32
            .checked_shl(u32::from(self.overscaled_z.saturating_sub(self.canonical.z)))
            .unwrap_or(u32::MAX)
    }

    /// Converts a distance in pixels to tile units when viewed at `zoom`.
    pub fn pixels_to_tile_units(&self, pixels: f64, zoom: f64) -> f64 {
        pixels * (EXTENT / (TILE_SIZE * (zoom - f64::from(self.canonical.z)).exp2()))
    }
}

impl From<CanonicalTileId> for OverscaledTileId {
    fn from(canonical: CanonicalTileId) -> Self {
        Self::new(canonical.z, canonical)
    }
}
