// ---------------------------------------------------------------------------
// ImpactError: error taxonomy for selecting and running impact functions
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised while preparing or executing an impact function.
///
/// Validation problems surface synchronously from
/// [`Calculator::get_runner`](crate::calculator::Calculator::get_runner).
/// Failures inside a routine never escape a runner as a crash; they are stored
/// in its terminal state and reported through `result()`.
#[derive(Debug, Clone, PartialEq)]
pub enum ImpactError {
    /// A layer is missing, no function is selected, or the selected function
    /// does not accept the current layer pair.
    InsufficientParameters(String),
    /// Runner state-machine misuse (starting twice, joining before starting).
    Runtime(String),
    /// The routine itself failed (malformed arrays, shape mismatch, panic).
    Execution(String),
    /// Layers could not be brought to a common extent and resolution.
    Alignment(String),
    /// A layer does not provide what was asked of it (e.g. raster data from a
    /// vector layer).
    InvalidLayer(String),
}

impl fmt::Display for ImpactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactError::InsufficientParameters(msg) => {
                write!(f, "Insufficient parameters: {msg}")
            }
            ImpactError::Runtime(msg) => write!(f, "Runtime error: {msg}"),
            ImpactError::Execution(msg) => write!(f, "Impact function failed: {msg}"),
            ImpactError::Alignment(msg) => write!(f, "Layer alignment failed: {msg}"),
            ImpactError::InvalidLayer(msg) => write!(f, "Invalid layer: {msg}"),
        }
    }
}

impl std::error::Error for ImpactError {}

impl ImpactError {
    /// True for the errors a caller can fix by supplying different inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ImpactError::InsufficientParameters(_) | ImpactError::Alignment(_)
        )
    }
}
