//! Single-use execution wrapper around one impact function.
//!
//! A [`Runner`] is created by the calculator with validated inputs and runs
//! exactly once, either inline through [`Runner::run`] or on the
//! `AsyncComputeTaskPool` through [`Runner::start`] followed by
//! [`Runner::join`]. Failures inside the function never escape as panics:
//! they are recorded as the runner's terminal [`RunnerState::Failed`] state
//! with a message in [`Runner::result`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bevy::log::{debug, info, warn};
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task, TaskPool};
use futures_lite::future;

use crate::clipping::LayerAligner;
use crate::error::ImpactError;
use crate::layer::Layer;
use crate::output::ImpactLayer;
use crate::registry::ImpactFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Done,
    Failed,
}

impl RunnerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

type Outcome = Result<ImpactLayer, String>;

enum Stage {
    Idle,
    Running(Task<Outcome>),
    Done(ImpactLayer),
    Failed,
}

pub struct Runner {
    hazard: Arc<Layer>,
    exposure: Arc<Layer>,
    function: Arc<dyn ImpactFunction>,
    aligner: Option<Arc<dyn LayerAligner>>,
    stage: Stage,
    message: String,
}

impl Runner {
    /// `aligner` is applied to the inputs before the function runs; pass
    /// `None` for functions that do not need clipping.
    pub fn new(
        hazard: Arc<Layer>,
        exposure: Arc<Layer>,
        function: Arc<dyn ImpactFunction>,
        aligner: Option<Arc<dyn LayerAligner>>,
    ) -> Self {
        Self {
            hazard,
            exposure,
            function,
            aligner,
            stage: Stage::Idle,
            message: String::new(),
        }
    }

    pub fn function_id(&self) -> &'static str {
        self.function.id()
    }

    /// Whether the inputs will be aligned before the function runs.
    pub fn aligns_inputs(&self) -> bool {
        self.aligner.is_some()
    }

    pub fn state(&self) -> RunnerState {
        match self.stage {
            Stage::Idle => RunnerState::Idle,
            Stage::Running(_) => RunnerState::Running,
            Stage::Done(_) => RunnerState::Done,
            Stage::Failed => RunnerState::Failed,
        }
    }

    /// Run inline, blocking the caller until the function completes.
    ///
    /// Errors only when the runner has already been used; a failing function
    /// is reported through [`state`](Self::state) and [`result`](Self::result).
    pub fn run(&mut self) -> Result<(), ImpactError> {
        self.ensure_idle("run")?;
        info!("Running impact function '{}'", self.function.id());
        let outcome = execute(
            &*self.function,
            self.aligner.as_deref(),
            &self.hazard,
            &self.exposure,
        );
        self.finish(outcome);
        Ok(())
    }

    /// Spawn the function on the `AsyncComputeTaskPool` and return
    /// immediately.
    pub fn start(&mut self) -> Result<(), ImpactError> {
        self.ensure_idle("start")?;
        info!(
            "Starting impact function '{}' in the background",
            self.function.id()
        );
        let function = Arc::clone(&self.function);
        let aligner = self.aligner.clone();
        let hazard = Arc::clone(&self.hazard);
        let exposure = Arc::clone(&self.exposure);
        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);
        let task = pool.spawn(async move {
            execute(&*function, aligner.as_deref(), &hazard, &exposure)
        });
        self.stage = Stage::Running(task);
        Ok(())
    }

    /// Block until a started runner reaches a terminal state.
    ///
    /// Joining an already finished runner does nothing.
    pub fn join(&mut self) -> Result<(), ImpactError> {
        match std::mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Running(task) => {
                let outcome = block_on(task);
                self.finish(outcome);
                Ok(())
            }
            Stage::Idle => {
                self.stage = Stage::Idle;
                Err(ImpactError::Runtime(format!(
                    "cannot join '{}': the runner was never started",
                    self.function.id()
                )))
            }
            terminal => {
                self.stage = terminal;
                Ok(())
            }
        }
    }

    /// Non-blocking check for completion. True once the work is over, even if
    /// the outcome has not been collected by [`join`](Self::join) or
    /// [`poll`](Self::poll) yet.
    pub fn is_finished(&self) -> bool {
        match &self.stage {
            Stage::Idle => false,
            Stage::Running(task) => task.is_finished(),
            Stage::Done(_) | Stage::Failed => true,
        }
    }

    /// Collect the outcome of a background run if it is ready, without
    /// blocking. Returns true when the runner is in a terminal state.
    pub fn poll(&mut self) -> bool {
        if let Stage::Running(task) = &mut self.stage {
            if let Some(outcome) = block_on(future::poll_once(task)) {
                self.finish(outcome);
            }
        }
        self.state().is_terminal()
    }

    /// Status message: empty until the runner finishes, then a success note or
    /// the failure reason.
    pub fn result(&self) -> &str {
        &self.message
    }

    pub fn impact_layer(&self) -> Option<&ImpactLayer> {
        match &self.stage {
            Stage::Done(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn into_impact_layer(mut self) -> Option<ImpactLayer> {
        match std::mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Done(layer) => Some(layer),
            _ => None,
        }
    }

    fn ensure_idle(&self, action: &str) -> Result<(), ImpactError> {
        match self.state() {
            RunnerState::Idle => Ok(()),
            state => Err(ImpactError::Runtime(format!(
                "cannot {action} '{}': runner is {state:?}, runners are single use",
                self.function.id()
            ))),
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        match outcome {
            Ok(layer) => {
                self.message = format!(
                    "Impact function '{}' completed: {}",
                    self.function.id(),
                    layer.name()
                );
                info!("{}", self.message);
                self.stage = Stage::Done(layer);
            }
            Err(reason) => {
                self.message = format!(
                    "Impact function '{}' failed: {reason}",
                    self.function.id()
                );
                warn!("{}", self.message);
                self.stage = Stage::Failed;
            }
        }
    }
}

impl Drop for Runner {
    /// A background run outlives its runner; its outcome is discarded.
    fn drop(&mut self) {
        if let Stage::Running(task) = std::mem::replace(&mut self.stage, Stage::Failed) {
            debug!(
                "Detaching impact function '{}' from its dropped runner",
                self.function.id()
            );
            task.detach();
        }
    }
}

/// Align (if requested) and run, turning errors and panics into a message.
fn execute(
    function: &dyn ImpactFunction,
    aligner: Option<&dyn LayerAligner>,
    hazard: &Layer,
    exposure: &Layer,
) -> Outcome {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match aligner {
        Some(aligner) => {
            let (hazard, exposure) = aligner.align(hazard, exposure)?;
            function.run(&hazard, &exposure)
        }
        None => function.run(hazard, exposure),
    }));
    match outcome {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
