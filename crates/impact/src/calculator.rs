//! Front door for running an analysis.
//!
//! The calculator collects a hazard layer, an exposure layer and a function
//! selection through plain setters, then validates the combination in
//! [`Calculator::get_runner`]. Validation errors surface there, never from the
//! setters and never from the runner.

use std::sync::Arc;

use bevy::log::{debug, info};

use crate::clipping::{ExtentClipper, LayerAligner};
use crate::defaults::ImpactDefaults;
use crate::error::ImpactError;
use crate::layer::Layer;
use crate::matcher::{is_admissible, matching_functions};
use crate::registry::{ImpactFunction, ImpactFunctionRegistry};
use crate::runner::Runner;
use crate::utilities::{keywords_to_str, pretty_string};

pub struct Calculator {
    registry: Arc<ImpactFunctionRegistry>,
    hazard: Option<Arc<Layer>>,
    exposure: Option<Arc<Layer>>,
    function: Option<String>,
    aligner: Arc<dyn LayerAligner>,
}

impl Calculator {
    pub fn new(registry: Arc<ImpactFunctionRegistry>) -> Self {
        Self {
            registry,
            hazard: None,
            exposure: None,
            function: None,
            aligner: Arc::new(ExtentClipper),
        }
    }

    /// Calculator over the built-in functions.
    pub fn with_defaults(defaults: &ImpactDefaults) -> Self {
        Self::new(Arc::new(ImpactFunctionRegistry::with_defaults(defaults)))
    }

    /// Replace the geometry service used for functions that require clipping.
    pub fn with_aligner(mut self, aligner: Arc<dyn LayerAligner>) -> Self {
        self.aligner = aligner;
        self
    }

    pub fn registry(&self) -> &ImpactFunctionRegistry {
        &self.registry
    }

    pub fn set_hazard_layer(&mut self, layer: Option<Arc<Layer>>) {
        self.hazard = layer;
    }

    pub fn set_exposure_layer(&mut self, layer: Option<Arc<Layer>>) {
        self.exposure = layer;
    }

    /// Select a function by id or title. Not validated until
    /// [`get_runner`](Self::get_runner).
    pub fn set_function(&mut self, id_or_title: impl Into<String>) {
        self.function = Some(id_or_title.into());
    }

    pub fn hazard_layer(&self) -> Option<&Arc<Layer>> {
        self.hazard.as_ref()
    }

    pub fn exposure_layer(&self) -> Option<&Arc<Layer>> {
        self.exposure.as_ref()
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Declared clipping flag of the selected function; false when nothing
    /// registered is selected.
    pub fn requires_clipping(&self) -> bool {
        self.selected()
            .is_some_and(|function| function.requires_clipping())
    }

    /// Ids of the functions that accept the current layer pair. Empty until
    /// both layers are set.
    pub fn available_functions(&self) -> Vec<&'static str> {
        match (&self.hazard, &self.exposure) {
            (Some(hazard), Some(exposure)) => matching_functions(&self.registry, hazard, exposure),
            _ => Vec::new(),
        }
    }

    /// Validate the inputs and build a single-use [`Runner`].
    pub fn get_runner(&self) -> Result<Runner, ImpactError> {
        let hazard = self.hazard.clone().ok_or_else(|| {
            ImpactError::InsufficientParameters("hazard layer is not set".to_string())
        })?;
        let exposure = self.exposure.clone().ok_or_else(|| {
            ImpactError::InsufficientParameters("exposure layer is not set".to_string())
        })?;
        let requested = self.function.as_deref().ok_or_else(|| {
            ImpactError::InsufficientParameters("impact function is not set".to_string())
        })?;
        let function = self.selected().ok_or_else(|| {
            ImpactError::InsufficientParameters(format!(
                "impact function '{requested}' is not registered"
            ))
        })?;

        debug!(
            "{}",
            keywords_to_str(&[*hazard.keywords(), *exposure.keywords()])
        );
        if !is_admissible(&**function, &hazard, &exposure) {
            let admissible = self.available_functions();
            let alternatives = if admissible.is_empty() {
                "none".to_string()
            } else {
                pretty_string(&admissible)
            };
            return Err(ImpactError::InsufficientParameters(format!(
                "impact function '{}' does not accept hazard '{}' with exposure '{}'; \
                 admissible functions: {}",
                function.id(),
                hazard.name(),
                exposure.name(),
                alternatives
            )));
        }

        let aligner = function
            .requires_clipping()
            .then(|| Arc::clone(&self.aligner));
        info!(
            "Prepared runner for '{}' (hazard '{}', exposure '{}', clipping: {})",
            function.id(),
            hazard.name(),
            exposure.name(),
            aligner.is_some()
        );
        Ok(Runner::new(hazard, exposure, Arc::clone(function), aligner))
    }

    fn selected(&self) -> Option<&Arc<dyn ImpactFunction>> {
        self.function
            .as_deref()
            .and_then(|id_or_title| self.registry.get(id_or_title))
    }
}
