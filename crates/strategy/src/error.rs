//! Error types for the optimizers.

use fold_rs_sim::SimError;
use thiserror::Error;

/// Errors that can occur while searching for the optimal borrow amount
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// The snapshot or starting point was rejected by the model
    #[error(transparent)]
    Model(#[from] SimError),

    /// An optimizer setting is outside its domain
    #[error("Invalid optimizer config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// An iteration produced a step that cannot be taken
    #[error("Non-convergent step at iteration {iteration} (b = {b}): {reason}")]
    NonconvergentStep {
        iteration: u32,
        b: f64,
        reason: &'static str,
    },
}
