//! Declarative input requirements for impact functions.
//!
//! Each function publishes a [`FunctionMetadata`] record whose hazard and
//! exposure [`Requirement`]s list the keyword values it accepts. The matcher
//! evaluates these records against layer keywords; nothing is probed at
//! runtime.

use serde::Serialize;

use crate::layer::{DataType, LayerCategory, LayerKeywords, LayerType, LayerUnit, Subcategory};

/// A `(layer type, data type)` pair a function can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerConstraint {
    pub layer_type: LayerType,
    pub data_type: DataType,
}

pub const LAYER_RASTER_NUMERIC: LayerConstraint = LayerConstraint {
    layer_type: LayerType::Raster,
    data_type: DataType::Numeric,
};

/// Every hazard subcategory.
pub const HAZARD_ALL: &[Subcategory] = &[
    Subcategory::Flood,
    Subcategory::Tsunami,
    Subcategory::Earthquake,
    Subcategory::Volcano,
    Subcategory::VolcanicAsh,
    Subcategory::Generic,
];

/// What one input layer must look like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    /// The category the layer must carry.
    pub definition: LayerCategory,
    pub subcategories: Vec<Subcategory>,
    pub units: Vec<LayerUnit>,
    pub layer_constraints: Vec<LayerConstraint>,
}

impl Requirement {
    pub fn is_satisfied_by(&self, keywords: &LayerKeywords) -> bool {
        keywords.category == self.definition
            && self.subcategories.contains(&keywords.subcategory)
            && self.units.contains(&keywords.unit)
            && self.layer_constraints.iter().any(|c| {
                c.layer_type == keywords.layer_type && c.data_type == keywords.data_type
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCategories {
    pub hazard: Requirement,
    pub exposure: Requirement,
}

/// Static description of one impact function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionMetadata {
    pub id: &'static str,
    /// Short question-style title ("Be affected by each hazard category").
    pub title: &'static str,
    pub name: &'static str,
    pub impact: &'static str,
    pub author: &'static str,
    pub overview: &'static str,
    pub categories: FunctionCategories,
}

impl FunctionMetadata {
    /// True when both layers are acceptable inputs.
    pub fn accepts(&self, hazard: &LayerKeywords, exposure: &LayerKeywords) -> bool {
        self.categories.hazard.is_satisfied_by(hazard)
            && self.categories.exposure.is_satisfied_by(exposure)
    }
}
