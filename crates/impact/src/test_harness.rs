//! # TestImpact: headless harness and fixtures for impact tests
//!
//! Wraps a `bevy::app::App` with [`ImpactPlugin`] so background runs can be
//! submitted and driven frame by frame, and provides the layer fixtures and
//! stub functions shared by the unit tests.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::defaults::ImpactDefaults;
use crate::error::ImpactError;
use crate::layer::{
    GeoTransform, Layer, LayerCategory, LayerKeywords, LayerUnit, RasterGrid, Subcategory,
};
use crate::metadata::{
    FunctionCategories, FunctionMetadata, Requirement, HAZARD_ALL, LAYER_RASTER_NUMERIC,
};
use crate::needs::TotalNeeds;
use crate::output::{ImpactKeywords, ImpactLayer};
use crate::plugin::{ImpactFinished, ImpactJobs, ImpactPlugin};
use crate::registry::ImpactFunction;
use crate::runner::Runner;
use crate::style::impact_style;

// =============================================================================
// Fixtures
// =============================================================================

pub const REFERENCE_PROJECTION: &str = "EPSG:4326";

/// The 2x3 reference scenario: hazard codes `[[1,2,3],[0,1,2]]` over
/// population `[[10,20,30],[5,15,25]]`, both on the same unit grid.
pub fn reference_layers() -> (Layer, Layer) {
    let gt = GeoTransform::north_up(0.0, 2.0, 1.0);
    let hazard = Layer::raster(
        "Flood categories",
        LayerKeywords::categorised_hazard(Subcategory::Flood),
        RasterGrid::from_rows(&[vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0]])
            .expect("reference hazard is rectangular"),
        REFERENCE_PROJECTION,
        gt,
    );
    let exposure = Layer::raster(
        "Population",
        LayerKeywords::population_raster(),
        RasterGrid::from_rows(&[vec![10.0, 20.0, 30.0], vec![5.0, 15.0, 25.0]])
            .expect("reference population is rectangular"),
        REFERENCE_PROJECTION,
        gt,
    );
    (hazard, exposure)
}

/// Random hazard codes in `0..=4` (4 matches no default tier) and random
/// population counts, sharing one grid.
pub fn random_layers(rng: &mut ChaCha8Rng, width: usize, height: usize) -> (Layer, Layer) {
    let mut hazard = RasterGrid::new(width, height);
    let mut population = RasterGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            hazard.set(x, y, f64::from(rng.gen_range(0u8..=4)));
            population.set(x, y, rng.gen_range(0.0..500.0_f64).floor());
        }
    }
    let gt = GeoTransform::north_up(0.0, height as f64, 1.0);
    (
        Layer::raster(
            "Random hazard",
            LayerKeywords::categorised_hazard(Subcategory::Generic),
            hazard,
            REFERENCE_PROJECTION,
            gt,
        ),
        Layer::raster(
            "Random population",
            LayerKeywords::population_raster(),
            population,
            REFERENCE_PROJECTION,
            gt,
        ),
    )
}

// =============================================================================
// Stub function
// =============================================================================

pub const STUB_FUNCTION_ID: &str = "StubImpactFunction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehaviour {
    /// Return the exposure grid unchanged.
    Succeed,
    Fail,
    Panic,
}

/// Accepts the same layers as the categorical function with a configurable
/// outcome and clipping flag.
pub struct StubFunction {
    metadata: FunctionMetadata,
    behaviour: StubBehaviour,
    clip: bool,
}

impl StubFunction {
    pub fn new(behaviour: StubBehaviour, clip: bool) -> Self {
        Self {
            metadata: FunctionMetadata {
                id: STUB_FUNCTION_ID,
                title: "Be stubbed",
                name: "Stub Impact Function",
                impact: "Be stubbed",
                author: "tests",
                overview: "Test double.",
                categories: FunctionCategories {
                    hazard: Requirement {
                        definition: LayerCategory::Hazard,
                        subcategories: HAZARD_ALL.to_vec(),
                        units: vec![LayerUnit::Categorised],
                        layer_constraints: vec![LAYER_RASTER_NUMERIC],
                    },
                    exposure: Requirement {
                        definition: LayerCategory::Exposure,
                        subcategories: vec![Subcategory::Population],
                        units: vec![LayerUnit::PeoplePerPixel],
                        layer_constraints: vec![LAYER_RASTER_NUMERIC],
                    },
                },
            },
            behaviour,
            clip,
        }
    }
}

impl ImpactFunction for StubFunction {
    fn metadata(&self) -> &FunctionMetadata {
        &self.metadata
    }

    fn requires_clipping(&self) -> bool {
        self.clip
    }

    fn run(&self, hazard: &Layer, exposure: &Layer) -> Result<ImpactLayer, ImpactError> {
        match self.behaviour {
            StubBehaviour::Succeed => {
                let grid = exposure.get_data(0.0, true)?;
                let style = impact_style(&grid.cells);
                Ok(ImpactLayer::new(
                    grid,
                    hazard.projection(),
                    hazard.geotransform(),
                    "Stub output",
                    ImpactKeywords {
                        impact_summary: String::new(),
                        impact_table: String::new(),
                        map_title: String::new(),
                        legend_notes: String::new(),
                        legend_units: String::new(),
                        legend_title: String::new(),
                        total_needs: TotalNeeds(Vec::new()),
                    },
                    style,
                ))
            }
            StubBehaviour::Fail => Err(ImpactError::Execution("stub failure".to_string())),
            StubBehaviour::Panic => panic!("stub panic"),
        }
    }
}

// =============================================================================
// TestImpact
// =============================================================================

/// Every `ImpactFinished` event seen since the harness was built.
#[derive(Resource, Default)]
struct FinishedLog(Vec<ImpactFinished>);

fn record_finished(mut events: EventReader<ImpactFinished>, mut log: ResMut<FinishedLog>) {
    log.0.extend(events.read().cloned());
}

/// A headless App with `ImpactPlugin` installed.
pub struct TestImpact {
    app: App,
}

impl Default for TestImpact {
    fn default() -> Self {
        Self::new()
    }
}

impl TestImpact {
    pub fn new() -> Self {
        Self::with_defaults(ImpactDefaults::default())
    }

    /// Insert `defaults` before the plugin builds its registry from them.
    pub fn with_defaults(defaults: ImpactDefaults) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(defaults);
        app.add_plugins(ImpactPlugin);
        app.init_resource::<FinishedLog>();
        app.add_systems(
            Update,
            record_finished.after(crate::plugin::poll_impact_jobs),
        );
        app.update();
        Self { app }
    }

    pub fn submit(&mut self, runner: Runner) -> Result<(), ImpactError> {
        self.app.world_mut().resource_mut::<ImpactJobs>().submit(runner)
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Update until every submitted runner has been collected. Panics if that
    /// takes longer than `timeout`.
    pub fn run_until_idle(&mut self, timeout: Duration) {
        let start = std::time::Instant::now();
        while !self.resource::<ImpactJobs>().is_idle() {
            assert!(
                start.elapsed() < timeout,
                "impact jobs still pending after {timeout:?}"
            );
            self.app.update();
            std::thread::yield_now();
        }
    }

    pub fn finished(&self) -> &[ImpactFinished] {
        &self.resource::<FinishedLog>().0
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }
}
