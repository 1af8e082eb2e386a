//! Static registry of impact functions, populated at startup.

use std::fmt;
use std::sync::Arc;

use bevy::prelude::Resource;

use crate::categorical_population::CategoricalHazardPopulation;
use crate::defaults::ImpactDefaults;
use crate::error::ImpactError;
use crate::layer::Layer;
use crate::metadata::FunctionMetadata;
use crate::output::ImpactLayer;

/// An impact computation over one hazard and one exposure layer.
///
/// Implementations hold their parameters and are otherwise stateless: `run`
/// is a pure function of the two layers that returns a fresh [`ImpactLayer`].
pub trait ImpactFunction: Send + Sync {
    fn metadata(&self) -> &FunctionMetadata;

    /// Whether the inputs must be clipped to a common extent and resolution
    /// before [`run`](Self::run). A declared property of the function, never
    /// derived from the layers.
    fn requires_clipping(&self) -> bool;

    fn run(&self, hazard: &Layer, exposure: &Layer) -> Result<ImpactLayer, ImpactError>;

    fn id(&self) -> &'static str {
        self.metadata().id
    }

    fn title(&self) -> &'static str {
        self.metadata().title
    }
}

#[derive(Resource, Clone, Default)]
pub struct ImpactFunctionRegistry {
    functions: Vec<Arc<dyn ImpactFunction>>,
}

impl ImpactFunctionRegistry {
    /// Registry holding every built-in function, built against `defaults`.
    pub fn with_defaults(defaults: &ImpactDefaults) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(CategoricalHazardPopulation::new(defaults)));
        registry
    }

    /// Add a function. A function with the same id is replaced in place, which
    /// is how callers override parameters before execution.
    pub fn register(&mut self, function: Arc<dyn ImpactFunction>) {
        match self.functions.iter().position(|f| f.id() == function.id()) {
            Some(idx) => self.functions[idx] = function,
            None => self.functions.push(function),
        }
    }

    /// Look up by id first, then by title.
    pub fn get(&self, id_or_title: &str) -> Option<&Arc<dyn ImpactFunction>> {
        self.functions
            .iter()
            .find(|f| f.id() == id_or_title)
            .or_else(|| self.functions.iter().find(|f| f.title() == id_or_title))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ImpactFunction>> {
        self.functions.iter()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.functions.iter().map(|f| f.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for ImpactFunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpactFunctionRegistry")
            .field("functions", &self.ids())
            .finish()
    }
}
