// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interfaces to the tile data a layer reads from and the index it writes to.

use std::fmt;
use std::sync::Arc;

use crate::geometry::GeometryCollection;
use crate::kurbo::Rect;

/// A feature property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// The geometry type of a feature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeatureType {
    Unknown,
    Point,
    LineString,
    Polygon,
}

/// A single feature of a tile layer.
pub trait Feature {
    fn feature_type(&self) -> FeatureType;

    /// Looks up a property of this feature.
    fn value(&self, key: &str) -> Option<Value>;

    fn id(&self) -> Option<u64> {
        None
    }

    /// The geometry of the feature in tile units.
    ///
    /// Line strings yield one entry per line, polygons one entry per ring.
    fn geometries(&self) -> GeometryCollection;
}

/// A named layer of a vector tile.
pub trait GeometryTileLayer {
    fn name(&self) -> &str;

    fn feature_count(&self) -> usize;

    fn feature(&self, index: usize) -> Option<&dyn Feature>;
}

/// A predicate deciding whether a feature belongs to a style layer.
///
/// The filter expression language lives outside this crate; filters only need to
/// answer yes or no for a feature.
#[derive(Clone, Default)]
pub struct Filter {
    predicate: Option<Arc<dyn Fn(&dyn Feature) -> bool + Send + Sync>>,
}

impl Filter {
    /// A filter accepting every feature.
    pub fn all() -> Self {
        Self { predicate: None }
    }

    pub fn new(predicate: impl Fn(&dyn Feature) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn matches(&self, feature: &dyn Feature) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(feature))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Calls `f` with every feature of `layer` accepted by `filter`, together with its
/// index in the layer and the layer name.
pub fn each_filtered_feature(
    layer: &dyn GeometryTileLayer,
    filter: &Filter,
    mut f: impl FnMut(&dyn Feature, usize, &str),
) {
    let name = layer.name();
    for index in 0..layer.feature_count() {
        let Some(feature) = layer.feature(index) else {
            continue;
        };
        if filter.matches(feature) {
            f(feature, index, name);
        }
    }
}

/// Spatial index of tessellated features, used to answer rendered-feature queries.
pub trait FeatureIndex {
    fn insert(
        &mut self,
        geometries: &GeometryCollection,
        feature_index: usize,
        source_layer_name: &str,
        bucket_name: &str,
    );
}

/// An entry of a [`LinearFeatureIndex`].
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFeature {
    pub bbox: Rect,
    pub feature_index: usize,
    pub source_layer_name: String,
    pub bucket_name: String,
}

/// A feature index which scans every entry on query.
///
/// Adequate for a tile's worth of features; renderers with denser tiles plug in a
/// grid through [`FeatureIndex`].
#[derive(Clone, Debug, Default)]
pub struct LinearFeatureIndex {
    entries: Vec<IndexedFeature>,
}

impl LinearFeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedFeature] {
        &self.entries
    }

    /// Returns the entries whose bounding box, grown by `radius`, overlaps `query`.
    pub fn query(&self, query: Rect, radius: f64) -> impl Iterator<Item = &IndexedFeature> + '_ {
        self.entries
            .iter()
            .filter(move |entry| overlaps(entry.bbox.inflate(radius, radius), query))
    }
}

/// Closed-interval overlap, so boxes sharing an edge count as overlapping.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

impl FeatureIndex for LinearFeatureIndex {
    fn insert(
        &mut self,
        geometries: &GeometryCollection,
        feature_index: usize,
        source_layer_name: &str,
        bucket_name: &str,
    ) {
        let mut points = geometries.iter().flatten();
        let Some(first) = points.next() else {
            return;
        };
        let bbox = points.fold(Rect::from_points(*first, *first), |bbox, p| {
            bbox.union_pt(*p)
        });
        self.entries.push(IndexedFeature {
            bbox,
            feature_index,
            source_layer_name: source_layer_name.to_owned(),
            bucket_name: bucket_name.to_owned(),
        });
    }
}
