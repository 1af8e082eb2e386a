//! Capability matching: which registered functions accept a layer pair.

use bevy::log::debug;

use crate::layer::Layer;
use crate::registry::{ImpactFunction, ImpactFunctionRegistry};
use crate::utilities::admissible_functions_to_str;

/// True when `function` accepts `hazard` and `exposure` as inputs.
pub fn is_admissible(function: &dyn ImpactFunction, hazard: &Layer, exposure: &Layer) -> bool {
    function
        .metadata()
        .accepts(hazard.keywords(), exposure.keywords())
}

/// Ids of every function that accepts the pair, in registry order.
///
/// No match is an empty list, not an error.
pub fn matching_functions(
    registry: &ImpactFunctionRegistry,
    hazard: &Layer,
    exposure: &Layer,
) -> Vec<&'static str> {
    let admissible: Vec<_> = registry
        .iter()
        .filter(|&f| is_admissible(&**f, hazard, exposure))
        .collect();
    debug!("{}", admissible_functions_to_str(&admissible));
    admissible.iter().map(|f| f.id()).collect()
}
