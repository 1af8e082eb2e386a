//! ECS wiring: background impact runs driven by the app's update loop.
//!
//! Callers build a [`Runner`] through a calculator and hand it to
//! [`ImpactJobs::submit`]; `poll_impact_jobs` collects finished runs each
//! frame and announces them with an [`ImpactFinished`] event.

use bevy::prelude::*;

use crate::defaults::ImpactDefaults;
use crate::error::ImpactError;
use crate::output::ImpactLayer;
use crate::registry::ImpactFunctionRegistry;
use crate::runner::{Runner, RunnerState};

/// Runners started in the background and not yet collected.
#[derive(Resource, Default)]
pub struct ImpactJobs {
    runners: Vec<Runner>,
}

impl ImpactJobs {
    /// Start `runner` on the compute pool and track it until it finishes.
    pub fn submit(&mut self, mut runner: Runner) -> Result<(), ImpactError> {
        runner.start()?;
        self.runners.push(runner);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.runners.len()
    }

    pub fn is_idle(&self) -> bool {
        self.runners.is_empty()
    }
}

/// Fired once per submitted runner when it reaches a terminal state.
#[derive(Event, Debug, Clone)]
pub struct ImpactFinished {
    pub function_id: &'static str,
    pub success: bool,
    /// The runner's status message.
    pub message: String,
    /// Present when `success` is true.
    pub impact_layer: Option<ImpactLayer>,
}

impl ImpactFinished {
    fn from_runner(runner: Runner) -> Self {
        let function_id = runner.function_id();
        let success = runner.state() == RunnerState::Done;
        let message = runner.result().to_string();
        Self {
            function_id,
            success,
            message,
            impact_layer: runner.into_impact_layer(),
        }
    }
}

/// Collect finished background runs without blocking the frame.
pub fn poll_impact_jobs(mut jobs: ResMut<ImpactJobs>, mut finished: EventWriter<ImpactFinished>) {
    if jobs.is_idle() {
        return;
    }
    let mut pending = Vec::with_capacity(jobs.runners.len());
    for mut runner in std::mem::take(&mut jobs.runners) {
        if runner.poll() {
            debug!("Collected impact run '{}'", runner.function_id());
            finished.send(ImpactFinished::from_runner(runner));
        } else {
            pending.push(runner);
        }
    }
    jobs.runners = pending;
}

pub struct ImpactPlugin;

impl Plugin for ImpactPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImpactDefaults>();
        let registry =
            ImpactFunctionRegistry::with_defaults(app.world().resource::<ImpactDefaults>());
        app.insert_resource(registry)
            .init_resource::<ImpactJobs>()
            .add_event::<ImpactFinished>()
            .add_systems(Update, poll_impact_jobs);
    }
}
