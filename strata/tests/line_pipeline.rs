// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives a line layer from style properties to recorded draw calls, the way a
//! renderer does for each tile.

use anyhow::Result;
use strata::gl::Command;
use strata::strata_style::geometry::GeometryCollection;
use strata::strata_style::kurbo::{Point, Rect};
use strata::strata_style::{
    CascadeParameters, Color, DataDrivenPropertyValue, Feature, FeatureType, GeometryTileLayer,
    LinearFeatureIndex, PropertyEvaluationParameters, PropertyFunction, PropertyValue,
    SourceStops, Transitionable, Value,
};
use strata::{
    draw_line, BucketParameters, CanonicalTileId, Context, ContextOptions, Error, LineBucket,
    LineLayer, LineProgram, OverscaledTileId, ProgramParameters, RenderParameters,
};

struct Road {
    class: &'static str,
    line: Vec<Point>,
}

impl Feature for Road {
    fn feature_type(&self) -> FeatureType {
        FeatureType::LineString
    }

    fn value(&self, key: &str) -> Option<Value> {
        (key == "class").then(|| Value::String(self.class.to_owned()))
    }

    fn geometries(&self) -> GeometryCollection {
        vec![self.line.clone()]
    }
}

struct Roads(Vec<Road>);

impl GeometryTileLayer for Roads {
    fn name(&self) -> &str {
        "roads"
    }

    fn feature_count(&self) -> usize {
        self.0.len()
    }

    fn feature(&self, index: usize) -> Option<&dyn Feature> {
        self.0.get(index).map(|road| road as &dyn Feature)
    }
}

fn roads() -> Roads {
    Roads(vec![
        Road {
            class: "motorway",
            line: vec![Point::new(0.0, 0.0), Point::new(4096.0, 0.0)],
        },
        Road {
            class: "street",
            line: vec![
                Point::new(1000.0, 1000.0),
                Point::new(2000.0, 1000.0),
                Point::new(2000.0, 3000.0),
            ],
        },
    ])
}

const TILE: CanonicalTileId = CanonicalTileId { z: 12, x: 655, y: 1583 };

fn render_parameters() -> RenderParameters {
    RenderParameters {
        matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
        zoom: 12.5,
        bearing: 0.0,
        viewport_size: [1024.0, 768.0],
    }
}

fn road_layer() -> LineLayer {
    let mut layer = LineLayer::new("roads", "roads");
    layer.paint.width = Transitionable::new(PropertyValue::from(3.0));
    layer.paint.color = Transitionable::new(DataDrivenPropertyValue::PropertyFunction(
        PropertyFunction::new(
            "class",
            SourceStops::Categorical(vec![(
                Value::String("motorway".into()),
                Color::new([1.0, 0.5, 0.0, 1.0]),
            )]),
        ),
    ));
    layer.cascade(&CascadeParameters::default());
    layer.evaluate(&PropertyEvaluationParameters::new(12.5));
    layer
}

fn build_bucket(layer: &LineLayer, index: &mut LinearFeatureIndex) -> LineBucket {
    let tile = roads();
    layer.create_bucket(BucketParameters {
        tile_id: TILE.into(),
        layer: &tile,
        feature_index: index,
    })
}

#[test]
fn layer_to_draw_calls() -> Result<()> {
    let layer = road_layer();
    let mut index = LinearFeatureIndex::new();
    let mut bucket = build_bucket(&layer, &mut index);
    assert_eq!(index.len(), 2);

    let mut context = Context::default();
    let mut program = LineProgram::new(&mut context, &ProgramParameters::default())?;
    bucket.upload(&mut context)?;
    draw_line(
        &mut context,
        &mut program,
        &mut bucket,
        &layer,
        TILE.into(),
        &render_parameters(),
    )?;

    let recording = context.take_recording();
    // Layout vertices, indices and the per-vertex colours.
    assert_eq!(
        recording.count(|c| matches!(c, Command::CreateBuffer { .. })),
        3
    );
    // The colour varies per feature, everything else is constant.
    let pointers: Vec<_> = recording
        .iter()
        .filter_map(|c| match c {
            Command::AttributePointer { location, .. } => Some(*location),
            _ => None,
        })
        .collect();
    assert_eq!(pointers, [0, 1, 2]);
    let constants: Vec<_> = recording
        .iter()
        .filter_map(|c| match c {
            Command::ConstantAttribute { location, .. } => Some(*location),
            _ => None,
        })
        .collect();
    assert_eq!(constants, [3, 4, 5, 6]);
    assert_eq!(
        recording.count(|c| matches!(c, Command::DrawElements { .. })),
        bucket.segments().len()
    );
    Ok(())
}

#[test]
fn drawing_before_upload_fails() -> Result<()> {
    let layer = road_layer();
    let mut bucket = build_bucket(&layer, &mut LinearFeatureIndex::new());
    let mut context = Context::default();
    let mut program = LineProgram::new(&mut context, &ProgramParameters::default())?;
    let result = draw_line(
        &mut context,
        &mut program,
        &mut bucket,
        &layer,
        TILE.into(),
        &render_parameters(),
    );
    assert_eq!(result, Err(Error::NotUploaded));
    Ok(())
}

#[test]
fn memory_budget_is_enforced_and_released() -> Result<()> {
    let layer = road_layer();

    let mut tight = Context::new(ContextOptions {
        memory_budget: Some(16),
    });
    let mut bucket = build_bucket(&layer, &mut LinearFeatureIndex::new());
    let error = bucket.upload(&mut tight).unwrap_err();
    assert!(matches!(error, Error::OutOfMemory { available: 16, .. }));
    assert!(!bucket.is_uploaded());

    let mut context = Context::new(ContextOptions {
        memory_budget: Some(1 << 20),
    });
    let mut bucket = build_bucket(&layer, &mut LinearFeatureIndex::new());
    bucket.upload(&mut context)?;
    assert!(context.allocated_bytes() > 0);

    drop(bucket);
    context.perform_cleanup();
    assert_eq!(context.allocated_bytes(), 0);
    assert_eq!(
        context
            .recording()
            .count(|c| matches!(c, Command::DeleteBuffer(_))),
        3
    );
    Ok(())
}

#[test]
fn lost_contexts_refuse_uploads() {
    let layer = road_layer();
    let mut bucket = build_bucket(&layer, &mut LinearFeatureIndex::new());
    let mut context = Context::default();
    context.mark_lost();
    assert_eq!(bucket.upload(&mut context), Err(Error::ContextLost));
    assert!(LineProgram::new(&mut context, &ProgramParameters::default()).is_err());
}

#[test]
fn overdraw_programs_define_the_inspector() -> Result<()> {
    let mut context = Context::default();
    let parameters = ProgramParameters {
        pixel_ratio: 2.0,
        overdraw: true,
    };
    LineProgram::new(&mut context, &parameters)?;
    let fragment_source = context.recording().iter().find_map(|c| match c {
        Command::CompileProgram {
            fragment_source, ..
        } => Some(fragment_source.clone()),
        _ => None,
    });
    let fragment_source = fragment_source.ok_or_else(|| anyhow::anyhow!("no program compiled"))?;
    assert!(fragment_source
        .starts_with("#define DEVICE_PIXEL_RATIO 2.000000\n#define OVERDRAW_INSPECTOR\n"));
    Ok(())
}

#[test]
fn rendered_features_can_be_queried() {
    let layer = road_layer();
    let mut index = LinearFeatureIndex::new();
    let _bucket = build_bucket(&layer, &mut index);

    let tile_id = OverscaledTileId::from(TILE);
    let pixels_to_tile_units = tile_id.pixels_to_tile_units(1.0, 12.0);
    let radius = layer.query_radius() * pixels_to_tile_units;
    let tile = roads();

    // A small box just below the motorway, within half its width.
    let query = vec![
        Point::new(500.0, 10.0),
        Point::new(520.0, 10.0),
        Point::new(520.0, 20.0),
        Point::new(500.0, 20.0),
        Point::new(500.0, 10.0),
    ];
    let hits: Vec<_> = index
        .query(Rect::new(500.0, 10.0, 520.0, 20.0), radius)
        .filter(|entry| {
            let Some(feature) = tile.feature(entry.feature_index) else {
                return false;
            };
            layer.query_intersects_geometry(&query, &feature.geometries(), 0.0, pixels_to_tile_units)
        })
        .map(|entry| entry.feature_index)
        .collect();
    assert_eq!(hits, [0]);
}
