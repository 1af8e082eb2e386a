//! Population affected by each category of a categorised hazard.
//!
//! The hazard raster holds integer severity codes; the exposure raster holds
//! people per cell. For each severity tier (high, medium, low) the function
//! keeps the population of cells whose hazard code equals the tier's
//! threshold, then reports:
//!
//!   1. per-tier masked population (a tier whose threshold is 0 is disabled
//!      and contributes nothing)
//!   2. the combined impact raster: population wherever the hazard code
//!      matches any enabled tier
//!   3. raw totals, then magnitude-rounded totals for display
//!   4. minimum needs of the affected population
//!   5. an eight-class style over the non-zero combined impact
//!
//! Missing hazard cells count as code 0 ("no hazard"); missing population
//! cells count as nobody.

use std::sync::Arc;

use bevy::log::{debug, info, warn};

use crate::defaults::ImpactDefaults;
use crate::error::ImpactError;
use crate::formatting::{format_int, get_thousand_separator};
use crate::layer::{Layer, LayerCategory, LayerUnit, RasterGrid, Subcategory};
use crate::metadata::{
    FunctionCategories, FunctionMetadata, Requirement, HAZARD_ALL, LAYER_RASTER_NUMERIC,
};
use crate::needs::{NeedsCalculator, PerCapitaNeeds, TotalNeeds};
use crate::output::{ImpactKeywords, ImpactLayer};
use crate::params::{CategoricalHazardParams, Thresholds};
use crate::registry::ImpactFunction;
use crate::report::{get_question, Table, TableRow};
use crate::rounding::population_rounding;
use crate::style::impact_style;
use crate::utilities::keywords_to_str;

pub const CATEGORICAL_HAZARD_POPULATION_ID: &str = "CategoricalHazardPopulationImpactFunction";

const TITLE: &str = "Be affected by each hazard category";

// =============================================================================
// Overlay
// =============================================================================

/// Masked population rasters produced by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalOverlay {
    pub high: RasterGrid,
    pub medium: RasterGrid,
    pub low: RasterGrid,
    /// Population wherever the hazard code matches any enabled tier.
    pub impact: RasterGrid,
    /// Sum of the whole population raster.
    pub total: f64,
}

/// Raw (unrounded) people counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTotals {
    pub total: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub total_impact: f64,
    pub no_impact: f64,
}

/// Display counts after [`population_rounding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedTotals {
    pub total: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub total_impact: u64,
    pub no_impact: u64,
}

impl OverlayTotals {
    pub fn rounded(&self) -> RoundedTotals {
        RoundedTotals {
            total: population_rounding(self.total),
            high: population_rounding(self.high),
            medium: population_rounding(self.medium),
            low: population_rounding(self.low),
            total_impact: population_rounding(self.total_impact),
            no_impact: population_rounding(self.no_impact),
        }
    }
}

impl CategoricalOverlay {
    pub fn totals(&self) -> OverlayTotals {
        let total_impact = self.impact.sum();
        OverlayTotals {
            total: self.total,
            high: self.high.sum(),
            medium: self.medium.sum(),
            low: self.low.sum(),
            total_impact,
            no_impact: self.total - total_impact,
        }
    }
}

/// Population of cells whose hazard code equals `threshold`; all zero when
/// the threshold is 0.
fn tier_mask(hazard: &RasterGrid, population: &RasterGrid, threshold: f64) -> RasterGrid {
    let mut out = RasterGrid::new(population.width, population.height);
    if threshold == 0.0 {
        return out;
    }
    for (dst, (&h, &p)) in out
        .cells
        .iter_mut()
        .zip(hazard.cells.iter().zip(population.cells.iter()))
    {
        if h == threshold {
            *dst = p;
        }
    }
    out
}

/// Overlay a categorised hazard grid on a population grid.
pub fn categorical_overlay(
    hazard: &RasterGrid,
    population: &RasterGrid,
    thresholds: Thresholds,
) -> Result<CategoricalOverlay, ImpactError> {
    if hazard.shape() != population.shape() {
        return Err(ImpactError::Execution(format!(
            "hazard grid is {:?} but population grid is {:?}; layers must be aligned",
            hazard.shape(),
            population.shape()
        )));
    }

    let high = tier_mask(hazard, population, thresholds.high);
    let medium = tier_mask(hazard, population, thresholds.medium);
    let low = tier_mask(hazard, population, thresholds.low);

    let enabled: Vec<f64> = thresholds.enabled().collect();
    let mut impact = RasterGrid::new(population.width, population.height);
    for (dst, (&h, &p)) in impact
        .cells
        .iter_mut()
        .zip(hazard.cells.iter().zip(population.cells.iter()))
    {
        if enabled.contains(&h) {
            *dst = p;
        }
    }

    Ok(CategoricalOverlay {
        high,
        medium,
        low,
        impact,
        total: population.sum(),
    })
}

// =============================================================================
// Report
// =============================================================================

/// Printable table and the longer on-screen summary, in that order.
pub fn impact_tables(question: &str, rounded: &RoundedTotals, needs: &TotalNeeds) -> (Table, Table) {
    let count = |n: u64| format_int(n as i64);
    let pair = |label: &str, n: u64| TableRow::new([label.to_string(), count(n)]);
    let mut table = Table::new(vec![
        TableRow::text(question),
        TableRow {
            header: true,
            ..pair("Total Population Affected", rounded.total_impact)
        },
        pair("Population in High risk areas", rounded.high),
        pair("Population in Medium risk areas", rounded.medium),
        pair("Population in Low risk areas", rounded.low),
        pair("Population Not Affected", rounded.no_impact),
        TableRow::text("Table below shows the minimum needs for all evacuated people"),
    ]);

    for group in needs.frequencies() {
        table.push(TableRow::header([
            format!("Needs should be provided {}", group.frequency),
            "Total".to_string(),
        ]));
        for resource in &group.resources {
            table.push(TableRow::new([
                resource.table_name.clone(),
                count(resource.amount),
            ]));
        }
    }

    let printable = table.clone();

    table.push(TableRow::header_text("Action Checklist:"));
    for item in [
        "How will warnings be disseminated?",
        "How will we reach stranded people?",
        "Do we have enough relief items?",
        "If yes, where are they located and how will we distribute them?",
        "If no, where can we obtain additional relief items from and how will we transport them to here?",
    ] {
        table.push(TableRow::text(item));
    }

    table.push(TableRow::header_text("Notes"));
    table.push(TableRow::text(
        "Map shows the numbers of people in high, medium and low hazard areas",
    ));
    table.push(TableRow::text(format!(
        "Total population: {}",
        count(rounded.total)
    )));

    (printable, table)
}

// =============================================================================
// Impact function
// =============================================================================

pub struct CategoricalHazardPopulation {
    metadata: FunctionMetadata,
    params: CategoricalHazardParams,
    needs: Arc<dyn NeedsCalculator>,
}

impl CategoricalHazardPopulation {
    pub fn new(defaults: &ImpactDefaults) -> Self {
        Self {
            metadata: Self::function_metadata(),
            params: CategoricalHazardParams::from_defaults(defaults),
            needs: Arc::new(PerCapitaNeeds),
        }
    }

    pub fn with_needs_calculator(mut self, needs: Arc<dyn NeedsCalculator>) -> Self {
        self.needs = needs;
        self
    }

    pub fn params(&self) -> &CategoricalHazardParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut CategoricalHazardParams {
        &mut self.params
    }

    pub fn function_metadata() -> FunctionMetadata {
        FunctionMetadata {
            id: CATEGORICAL_HAZARD_POPULATION_ID,
            title: TITLE,
            name: "Categorical Hazard Population Impact Function",
            impact: "Be impacted by each category",
            author: "Dianne Bencito",
            overview: "To assess the impacts of categorized hazards in raster format on \
                       population raster layer.",
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
        }
    }
}

impl ImpactFunction for CategoricalHazardPopulation {
    fn metadata(&self) -> &FunctionMetadata {
        &self.metadata
    }

    fn requires_clipping(&self) -> bool {
        true
    }

    fn run(&self, hazard: &Layer, exposure: &Layer) -> Result<ImpactLayer, ImpactError> {
        debug!(
            "{}",
            keywords_to_str(&[*hazard.keywords(), *exposure.keywords()])
        );
        let thresholds = self.params.thresholds();
        if thresholds.all_disabled() {
            warn!("All hazard thresholds are 0; no cell can be counted as affected");
        }

        let impact_title = self.metadata.title.to_lowercase();
        let question = get_question(hazard.name(), exposure.name(), &impact_title);

        let hazard_data = hazard.get_data(0.0, false)?;
        let population = exposure.get_data(0.0, true)?;
        let overlay = categorical_overlay(&hazard_data, &population, thresholds)?;

        let totals = overlay.totals();
        let rounded = totals.rounded();
        info!(
            "Categorical overlay: total={} affected={} (high={} medium={} low={}) not affected={}",
            totals.total, totals.total_impact, totals.high, totals.medium, totals.low, totals.no_impact
        );

        let total_needs = self
            .needs
            .compute(rounded.total_impact, &self.params.needs_schedule());
        let (printable, summary) = impact_tables(&question, &rounded, &total_needs);
        debug!("Impact table:\n{}", printable.to_plain_text());

        let style_info = impact_style(&overlay.impact.cells);

        let keywords = ImpactKeywords {
            impact_summary: summary.to_newline_free_string(),
            impact_table: printable.to_newline_free_string(),
            map_title: "Population affected by each category".to_string(),
            legend_notes: format!(
                "Thousand separator is represented by {}",
                get_thousand_separator()
            ),
            legend_units: "(people per cell)".to_string(),
            legend_title: "Number of People".to_string(),
            total_needs,
        };

        Ok(ImpactLayer::new(
            overlay.impact,
            hazard.projection(),
            hazard.geotransform(),
            format!("Population which {impact_title}"),
            keywords,
            style_info,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
