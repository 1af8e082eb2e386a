//! Criterion benchmarks for the categorical overlay.
//!
//! Benchmarks:
//!   - categorical_overlay on 256x256 and 1024x1024 grids
//!   - the full function run (overlay, report tables, style) on 256x256
//!   - create_classes over a 1024x1024 impact raster
//!
//! Run with: cargo bench -p impact --bench overlay_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use impact::categorical_population::{categorical_overlay, CategoricalHazardPopulation};
use impact::classification::create_classes;
use impact::config::STYLE_CLASS_COUNT;
use impact::defaults::ImpactDefaults;
use impact::layer::Subcategory;
use impact::params::Thresholds;
use impact::{GeoTransform, ImpactFunction, Layer, LayerKeywords, RasterGrid};

/// Deterministic hazard codes cycling through 0..=3 and a population ramp.
fn grids(size: usize) -> (RasterGrid, RasterGrid) {
    let mut hazard = RasterGrid::new(size, size);
    let mut population = RasterGrid::new(size, size);
    for y in 0..size {
        for x in 0..size {
            hazard.set(x, y, ((x + y) % 4) as f64);
            population.set(x, y, ((x * 7 + y * 13) % 200) as f64);
        }
    }
    (hazard, population)
}

// ---------------------------------------------------------------------------
// Benchmark: categorical_overlay
// ---------------------------------------------------------------------------

fn bench_overlay(c: &mut Criterion) {
    let mut group = c.benchmark_group("categorical_overlay");
    group.sample_size(20);

    for size in [256, 1024] {
        let (hazard, population) = grids(size);
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter(|| {
                black_box(categorical_overlay(
                    black_box(&hazard),
                    black_box(&population),
                    Thresholds::default(),
                ))
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: full run
// ---------------------------------------------------------------------------

fn bench_function_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("categorical_function_run");
    group.sample_size(20);

    let (hazard_grid, population_grid) = grids(256);
    let gt = GeoTransform::north_up(0.0, 256.0, 1.0);
    let hazard = Layer::raster(
        "Hazard",
        LayerKeywords::categorised_hazard(Subcategory::Flood),
        hazard_grid,
        "EPSG:4326",
        gt,
    );
    let exposure = Layer::raster(
        "Population",
        LayerKeywords::population_raster(),
        population_grid,
        "EPSG:4326",
        gt,
    );
    let function = CategoricalHazardPopulation::new(&ImpactDefaults::default());

    group.bench_function("256x256", |b| {
        b.iter(|| black_box(function.run(black_box(&hazard), black_box(&exposure))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: classification
// ---------------------------------------------------------------------------

fn bench_classes(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_classes");
    group.sample_size(20);

    let (_, population) = grids(1024);
    group.bench_function("1024x1024", |b| {
        b.iter(|| black_box(create_classes(black_box(&population.cells), STYLE_CLASS_COUNT)));
    });

    group.finish();
}

criterion_group!(benches, bench_overlay, bench_function_run, bench_classes);
criterion_main!(benches);
