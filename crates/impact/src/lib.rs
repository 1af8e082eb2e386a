pub mod calculator;
pub mod categorical_population;
pub mod classification;
pub mod clipping;
pub mod config;
pub mod defaults;
pub mod error;
pub mod formatting;
pub mod layer;
pub mod matcher;
pub mod metadata;
pub mod needs;
pub mod output;
pub mod params;
pub mod plugin;
pub mod registry;
pub mod report;
pub mod rounding;
pub mod runner;
pub mod style;
pub mod utilities;

#[cfg(test)]
pub mod test_harness;

pub use calculator::Calculator;
pub use error::ImpactError;
pub use layer::{GeoTransform, Layer, LayerKeywords, RasterGrid};
pub use output::ImpactLayer;
pub use plugin::{ImpactFinished, ImpactJobs, ImpactPlugin};
pub use registry::{ImpactFunction, ImpactFunctionRegistry};
pub use runner::{Runner, RunnerState};
