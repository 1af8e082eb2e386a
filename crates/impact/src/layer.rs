//! Input layers: tagged raster (or vector) handles read by impact functions.
//!
//! A `Layer` is created by the I/O side of the application and is read-only
//! for the lifetime of a computation. Runners share layers through `Arc`.
//! Raster cells are stored row-major in a flat `Vec<f64>`, like the per-cell
//! grids elsewhere in the crate, and may contain NaN for missing data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ImpactError;

// =============================================================================
// Keyword tags
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Hazard,
    Exposure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Flood,
    Tsunami,
    Earthquake,
    Volcano,
    VolcanicAsh,
    Generic,
    Population,
    Structure,
    Road,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerUnit {
    /// Integer severity codes (1 = low, 2 = medium, 3 = high by convention).
    Categorised,
    PeoplePerPixel,
    MetresDepth,
    FeetDepth,
    Mmi,
    WetDry,
    BuildingType,
    RoadType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Raster,
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Numeric,
    Polygon,
    Line,
    Point,
}

impl LayerCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerCategory::Hazard => "hazard",
            LayerCategory::Exposure => "exposure",
        }
    }
}

impl Subcategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Subcategory::Flood => "flood",
            Subcategory::Tsunami => "tsunami",
            Subcategory::Earthquake => "earthquake",
            Subcategory::Volcano => "volcano",
            Subcategory::VolcanicAsh => "volcanic_ash",
            Subcategory::Generic => "generic",
            Subcategory::Population => "population",
            Subcategory::Structure => "structure",
            Subcategory::Road => "road",
        }
    }
}

impl LayerUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerUnit::Categorised => "categorised",
            LayerUnit::PeoplePerPixel => "people_per_pixel",
            LayerUnit::MetresDepth => "metres_depth",
            LayerUnit::FeetDepth => "feet_depth",
            LayerUnit::Mmi => "mmi",
            LayerUnit::WetDry => "wetdry",
            LayerUnit::BuildingType => "building_type",
            LayerUnit::RoadType => "road_type",
        }
    }
}

impl LayerType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerType::Raster => "raster",
            LayerType::Vector => "vector",
        }
    }
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::Polygon => "polygon",
            DataType::Line => "line",
            DataType::Point => "point",
        }
    }
}

/// The tag set an impact function matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerKeywords {
    pub category: LayerCategory,
    pub subcategory: Subcategory,
    pub unit: LayerUnit,
    pub layer_type: LayerType,
    pub data_type: DataType,
}

impl LayerKeywords {
    /// Keywords for a categorised hazard raster of the given subcategory.
    pub fn categorised_hazard(subcategory: Subcategory) -> Self {
        Self {
            category: LayerCategory::Hazard,
            subcategory,
            unit: LayerUnit::Categorised,
            layer_type: LayerType::Raster,
            data_type: DataType::Numeric,
        }
    }

    /// Keywords for a population count raster.
    pub fn population_raster() -> Self {
        Self {
            category: LayerCategory::Exposure,
            subcategory: Subcategory::Population,
            unit: LayerUnit::PeoplePerPixel,
            layer_type: LayerType::Raster,
            data_type: DataType::Numeric,
        }
    }

    /// `(key, value)` pairs in a fixed order, for logging.
    pub fn pairs(&self) -> [(&'static str, &'static str); 5] {
        [
            ("category", self.category.as_str()),
            ("subcategory", self.subcategory.as_str()),
            ("unit", self.unit.as_str()),
            ("layertype", self.layer_type.as_str()),
            ("datatype", self.data_type.as_str()),
        ]
    }
}

// =============================================================================
// Spatial reference
// =============================================================================

/// Six-term affine transform, GDAL ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub column_rotation: f64,
    /// Negative for north-up rasters.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with square cells.
    pub fn north_up(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self {
            origin_x,
            pixel_width: cell_size,
            row_rotation: 0.0,
            origin_y,
            column_rotation: 0.0,
            pixel_height: -cell_size,
        }
    }

    pub fn cell_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height).abs()
    }

    pub fn is_rotated(&self) -> bool {
        self.row_rotation != 0.0 || self.column_rotation != 0.0
    }

    /// Bounding box of a `width x height` grid placed with this transform.
    pub fn extent(&self, width: usize, height: usize) -> Extent {
        let x0 = self.origin_x;
        let x1 = self.origin_x + self.pixel_width * width as f64;
        let y0 = self.origin_y;
        let y1 = self.origin_y + self.pixel_height * height as f64;
        Extent {
            min_x: x0.min(x1),
            max_x: x0.max(x1),
            min_y: y0.min(y1),
            max_y: y0.max(y1),
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.column_rotation,
            self.pixel_height,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    /// Overlapping region, or `None` when the extents only touch or are disjoint.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let min_x = self.min_x.max(other.min_x);
        let max_x = self.max_x.min(other.max_x);
        let min_y = self.min_y.max(other.min_y);
        let max_y = self.max_y.min(other.max_y);
        if min_x < max_x && min_y < max_y {
            Some(Extent {
                min_x,
                max_x,
                min_y,
                max_y,
            })
        } else {
            None
        }
    }
}

// =============================================================================
// RasterGrid
// =============================================================================

/// Row-major 2-D array of cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    pub cells: Vec<f64>,
    pub width: usize,
    pub height: usize,
}

impl RasterGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            cells: vec![value; width * height],
            width,
            height,
        }
    }

    /// Build from rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ImpactError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ImpactError::InvalidLayer(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: f64) {
        let idx = self.index(x, y);
        self.cells[idx] = val;
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics, and a zero-width grid has no rows anyway
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    /// Copy of the sub-grid starting at `(x0, y0)`.
    pub fn window(&self, x0: usize, y0: usize, width: usize, height: usize) -> RasterGrid {
        let mut out = RasterGrid::new(width, height);
        for y in 0..height {
            let src = self.index(x0, y0 + y);
            let dst = out.index(0, y);
            out.cells[dst..dst + width].copy_from_slice(&self.cells[src..src + width]);
        }
        out
    }
}

// =============================================================================
// Layer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerGeometry {
    Raster(RasterGrid),
    Vector { feature_count: usize },
}

/// An immutable, tagged input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    name: String,
    keywords: LayerKeywords,
    projection: String,
    geotransform: GeoTransform,
    geometry: LayerGeometry,
    /// Cell area the stored counts were measured at. Set when the grid was
    /// resampled or clipped from a source with a different resolution.
    native_cell_area: Option<f64>,
}

impl Layer {
    pub fn raster(
        name: impl Into<String>,
        keywords: LayerKeywords,
        grid: RasterGrid,
        projection: impl Into<String>,
        geotransform: GeoTransform,
    ) -> Self {
        Self {
            name: name.into(),
            keywords,
            projection: projection.into(),
            geotransform,
            geometry: LayerGeometry::Raster(grid),
            native_cell_area: None,
        }
    }

    pub fn vector(
        name: impl Into<String>,
        keywords: LayerKeywords,
        feature_count: usize,
        projection: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            keywords,
            projection: projection.into(),
            geotransform: GeoTransform::north_up(0.0, 0.0, 1.0),
            geometry: LayerGeometry::Vector { feature_count },
            native_cell_area: None,
        }
    }

    pub fn with_native_cell_area(mut self, area: f64) -> Self {
        self.native_cell_area = Some(area);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &LayerKeywords {
        &self.keywords
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    pub fn geometry(&self) -> &LayerGeometry {
        &self.geometry
    }

    pub fn native_cell_area(&self) -> Option<f64> {
        self.native_cell_area
    }

    pub fn is_raster(&self) -> bool {
        matches!(self.geometry, LayerGeometry::Raster(_))
    }

    /// Borrow the raw raster grid (NaN preserved, no scaling).
    pub fn grid(&self) -> Result<&RasterGrid, ImpactError> {
        match &self.geometry {
            LayerGeometry::Raster(grid) => Ok(grid),
            LayerGeometry::Vector { .. } => Err(ImpactError::InvalidLayer(format!(
                "layer '{}' is a vector layer and has no raster data",
                self.name
            ))),
        }
    }

    pub fn extent(&self) -> Result<Extent, ImpactError> {
        let grid = self.grid()?;
        Ok(self.geotransform.extent(grid.width, grid.height))
    }

    /// Multiplier turning stored per-cell values into counts for the current
    /// cell size. 1.0 unless the grid was resampled from another resolution.
    pub fn scaling_factor(&self) -> f64 {
        match self.native_cell_area {
            Some(native) if native > 0.0 => self.geotransform.cell_area() / native,
            _ => 1.0,
        }
    }

    /// Cell values with NaN replaced by `nan_fill`, optionally scaled by
    /// [`scaling_factor`](Self::scaling_factor).
    pub fn get_data(&self, nan_fill: f64, scaling: bool) -> Result<RasterGrid, ImpactError> {
        let mut grid = self.grid()?.clone();
        let factor = if scaling { self.scaling_factor() } else { 1.0 };
        for v in grid.cells.iter_mut() {
            if v.is_nan() {
                *v = nan_fill;
            }
            *v *= factor;
        }
        Ok(grid)
    }

    /// A copy of this layer with a different grid and transform. Tags,
    /// projection and native cell area are kept.
    pub fn with_grid(&self, grid: RasterGrid, geotransform: GeoTransform) -> Layer {
        Layer {
            name: self.name.clone(),
            keywords: self.keywords,
            projection: self.projection.clone(),
            geotransform,
            geometry: LayerGeometry::Raster(grid),
            native_cell_area: self.native_cell_area,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.geometry {
            LayerGeometry::Raster(grid) => write!(
                f,
                "{} ({} raster {}x{}, {})",
                self.name,
                self.keywords.category.as_str(),
                grid.width,
                grid.height,
                self.projection
            ),
            LayerGeometry::Vector { feature_count } => write!(
                f,
                "{} ({} vector, {} features, {})",
                self.name,
                self.keywords.category.as_str(),
                feature_count,
                self.projection
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
