//! The raster layer an impact function produces.

use serde::{Deserialize, Serialize};

use crate::layer::{GeoTransform, RasterGrid};
use crate::needs::TotalNeeds;
use crate::style::StyleInfo;

/// Report text and legend captions carried by an impact layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactKeywords {
    /// Full on-screen report (HTML, single line).
    pub impact_summary: String,
    /// Shorter printable report (HTML, single line).
    pub impact_table: String,
    pub map_title: String,
    pub legend_notes: String,
    pub legend_units: String,
    pub legend_title: String,
    pub total_needs: TotalNeeds,
}

/// Immutable result of a successful impact run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactLayer {
    grid: RasterGrid,
    projection: String,
    geotransform: GeoTransform,
    name: String,
    keywords: ImpactKeywords,
    style_info: StyleInfo,
}

impl ImpactLayer {
    pub fn new(
        grid: RasterGrid,
        projection: impl Into<String>,
        geotransform: GeoTransform,
        name: impl Into<String>,
        keywords: ImpactKeywords,
        style_info: StyleInfo,
    ) -> Self {
        Self {
            grid,
            projection: projection.into(),
            geotransform,
            name: name.into(),
            keywords,
            style_info,
        }
    }

    pub fn data(&self) -> &RasterGrid {
        &self.grid
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &ImpactKeywords {
        &self.keywords
    }

    pub fn style_info(&self) -> &StyleInfo {
        &self.style_info
    }

    /// JSON document for the rendering and report collaborators.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
