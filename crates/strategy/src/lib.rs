//! Borrow-amount optimization for folding strategies.
//!
//! This crate climbs the revenue curve priced by `fold-rs-sim` to find how
//! much a strategy should borrow and redeposit. Two optimizers are provided:
//! fixed-step gradient ascent and Newton-Raphson, both running against the
//! [`Objective`] trait so they can be exercised on any smooth function.
//!
//! Newton-Raphson results are capped by a maximum collateral ratio, and a
//! [`FoldPlan`] turns a result into decimal reporting figures.

mod config;
mod error;
mod objective;
mod optimizer;
mod plan;

pub use config::{CurvaturePolicy, Method, OptimizerConfig};
pub use error::OptimizeError;
pub use objective::Objective;
pub use optimizer::{gradient_ascent, newton_raphson, optimize, OptimizationResult};
pub use plan::{FoldMath, FoldPlan};
