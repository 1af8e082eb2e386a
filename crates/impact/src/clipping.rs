//! Bringing a hazard and an exposure layer to a common extent.
//!
//! Functions that declare `requires_clipping()` receive layers that cover the
//! same cells. The geometry work is delegated to a [`LayerAligner`]; the
//! built-in [`ExtentClipper`] handles the common case of co-registered grids
//! in the same projection by cropping both to their overlap. Reprojection and
//! resampling are left to aligners supplied by the caller.

use bevy::log::debug;

use crate::error::ImpactError;
use crate::layer::{Extent, GeoTransform, Layer};

/// Relative tolerance when comparing cell sizes and grid offsets.
const GRID_TOLERANCE: f64 = 1e-6;

pub trait LayerAligner: Send + Sync {
    /// Return copies of both layers covering the same extent at the same
    /// resolution.
    fn align(&self, hazard: &Layer, exposure: &Layer) -> Result<(Layer, Layer), ImpactError>;
}

/// Crops co-registered rasters to the intersection of their extents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtentClipper;

impl LayerAligner for ExtentClipper {
    fn align(&self, hazard: &Layer, exposure: &Layer) -> Result<(Layer, Layer), ImpactError> {
        if hazard.projection() != exposure.projection() {
            return Err(ImpactError::Alignment(format!(
                "projections differ ({} vs {}); reproject before running",
                hazard.projection(),
                exposure.projection()
            )));
        }
        let h_gt = hazard.geotransform();
        let e_gt = exposure.geotransform();
        if h_gt.is_rotated() || e_gt.is_rotated() {
            return Err(ImpactError::Alignment(
                "rotated rasters are not supported".to_string(),
            ));
        }
        if !close(h_gt.pixel_width, e_gt.pixel_width) || !close(h_gt.pixel_height, e_gt.pixel_height)
        {
            return Err(ImpactError::Alignment(format!(
                "cell sizes differ ({}x{} vs {}x{}); resample before running",
                h_gt.pixel_width, h_gt.pixel_height, e_gt.pixel_width, e_gt.pixel_height
            )));
        }

        let overlap = hazard
            .extent()?
            .intersection(&exposure.extent()?)
            .ok_or_else(|| {
                ImpactError::Alignment(format!(
                    "'{}' and '{}' do not overlap",
                    hazard.name(),
                    exposure.name()
                ))
            })?;
        debug!(
            "Clipping to x=[{}, {}] y=[{}, {}]",
            overlap.min_x, overlap.max_x, overlap.min_y, overlap.max_y
        );

        Ok((clip(hazard, &overlap)?, clip(exposure, &overlap)?))
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= GRID_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Cell offset of `edge` from `origin`, which must fall on a cell boundary.
fn cell_offset(edge: f64, origin: f64, cell: f64) -> Result<isize, ImpactError> {
    let cells = (edge - origin) / cell;
    let rounded = cells.round();
    if (cells - rounded).abs() > GRID_TOLERANCE * rounded.abs().max(1.0) {
        return Err(ImpactError::Alignment(
            "grids are not co-registered; resample before running".to_string(),
        ));
    }
    Ok(rounded as isize)
}

fn clip(layer: &Layer, overlap: &Extent) -> Result<Layer, ImpactError> {
    let grid = layer.grid()?;
    let gt = layer.geotransform();

    // column 0 sits at the west edge; row 0 at the north edge for north-up
    // rasters and at the south edge otherwise
    let (x_start, x_end) = if gt.pixel_width > 0.0 {
        (overlap.min_x, overlap.max_x)
    } else {
        (overlap.max_x, overlap.min_x)
    };
    let (y_start, y_end) = if gt.pixel_height < 0.0 {
        (overlap.max_y, overlap.min_y)
    } else {
        (overlap.min_y, overlap.max_y)
    };

    let x0 = cell_offset(x_start, gt.origin_x, gt.pixel_width)?;
    let x1 = cell_offset(x_end, gt.origin_x, gt.pixel_width)?;
    let y0 = cell_offset(y_start, gt.origin_y, gt.pixel_height)?;
    let y1 = cell_offset(y_end, gt.origin_y, gt.pixel_height)?;

    let in_range =
        |start: isize, end: isize, len: usize| start >= 0 && end >= start && end as usize <= len;
    if !in_range(x0, x1, grid.width) || !in_range(y0, y1, grid.height) {
        return Err(ImpactError::Alignment(format!(
            "overlap falls outside '{}'",
            layer.name()
        )));
    }

    let (x0, y0) = (x0 as usize, y0 as usize);
    let width = x1 as usize - x0;
    let height = y1 as usize - y0;
    let window = grid.window(x0, y0, width, height);
    let clipped_gt = GeoTransform {
        origin_x: gt.origin_x + x0 as f64 * gt.pixel_width,
        origin_y: gt.origin_y + y0 as f64 * gt.pixel_height,
        ..gt
    };
    Ok(layer.with_grid(window, clipped_gt))
}
