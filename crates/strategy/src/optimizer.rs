//! Borrow-amount optimizers.
//!
//! Both procedures look for the stationary point of `revenue(b)` over
//! `b >= 0`, starting from the strategy's current deposit.
//!
//! # Flow
//!
//! ```text
//! START ── revenue(1) < revenue(0) ──> b* = 0 (folding never pays)
//!   │
//!   └──> ITERATING ── |revenue'| < epsilon
//!                    │ |b - b_prev| < tol      ──> CONVERGED ──> clamp (Newton only)
//!                    └ max_count reached       ──> best iterate, converged = false
//! ```
//!
//! Iterates are projected back onto `b >= 0` after every step.

use alloy_primitives::U256;
use fold_rs_sim::{f64_to_ray, SimError, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CurvaturePolicy, Method, OptimizerConfig};
use crate::error::OptimizeError;
use crate::objective::Objective;

/// Outcome of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Additional amount to borrow and redeposit
    pub b_star: f64,
    /// Iterations consumed (the profitability probe counts as one)
    pub iterations: u32,
    /// Whether a stopping tolerance was met before the iteration cap
    pub converged: bool,
    /// Whether the collateral cap replaced the unconstrained optimum
    pub clamped: bool,
    pub method: Method,
    /// Objective value at `b_star`
    pub revenue: f64,
}

impl OptimizationResult {
    /// Collateralization ratio `b* / (pool_manager_fund + b*)` implied by the
    /// result.
    pub fn collateral_ratio(&self, pool_manager_fund: f64) -> f64 {
        collateral_ratio(self.b_star, pool_manager_fund)
    }

    /// `b_star` as a ray-scaled (1e27) integer.
    pub fn b_star_ray(&self) -> Result<U256, SimError> {
        f64_to_ray(self.b_star)
    }
}

/// Finds the revenue-maximizing borrow amount for `snapshot`.
///
/// The search starts from the strategy's current deposit. Newton-Raphson
/// results are capped so that `b / (pool_manager_fund + b)` never exceeds
/// `config.max_collat_ratio`.
///
/// # Example
///
/// ```rust
/// use fold_rs_sim::{PoolState, RateCurveParams, RewardParams, Snapshot};
/// use fold_rs_strategy::{optimize, Method, OptimizerConfig};
///
/// let snapshot = Snapshot::new(
///     PoolState::new(1_000_000.0, 100_000_000.0, 5_000_000.0, 55_000_000.0),
///     RateCurveParams::new(0.9, 0.0, 0.04, 0.6),
///     RewardParams::new(0.1, 0.1, 50_000.0, 100_000.0),
/// );
///
/// let result = optimize(&snapshot, &OptimizerConfig::default(), Method::NewtonRaphson)?;
/// assert!(result.collateral_ratio(1_000_000.0) <= 0.9 + 1e-12);
/// # Ok::<(), fold_rs_strategy::OptimizeError>(())
/// ```
pub fn optimize(
    snapshot: &Snapshot,
    config: &OptimizerConfig,
    method: Method,
) -> Result<OptimizationResult, OptimizeError> {
    snapshot.validate()?;
    config.validate()?;

    let b_init = snapshot.pool.pool_manager_fund;
    match method {
        Method::GradientAscent => gradient_ascent(snapshot, b_init, config),
        Method::NewtonRaphson => {
            let result = newton_raphson(snapshot, b_init, config)?;
            Ok(clamp_to_collateral_cap(
                snapshot,
                result,
                config.max_collat_ratio,
            ))
        }
    }
}

/// Fixed-step gradient ascent: `b <- b + alpha * revenue'(b)`.
pub fn gradient_ascent<O: Objective>(
    objective: &O,
    b_init: f64,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, OptimizeError> {
    search(objective, b_init, config, Method::GradientAscent)
}

/// Newton-Raphson on the gradient: `b <- b - revenue'(b) / revenue''(b)`.
///
/// When `|revenue''(b)|` is at or below `config.min_curvature` the step is
/// undefined; `config.curvature_policy` decides between a single gradient
/// step and failing with [`OptimizeError::NonconvergentStep`].
pub fn newton_raphson<O: Objective>(
    objective: &O,
    b_init: f64,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, OptimizeError> {
    search(objective, b_init, config, Method::NewtonRaphson)
}

fn search<O: Objective>(
    objective: &O,
    b_init: f64,
    config: &OptimizerConfig,
    method: Method,
) -> Result<OptimizationResult, OptimizeError> {
    config.validate()?;
    if !b_init.is_finite() || b_init < 0.0 {
        return Err(SimError::InvalidInput {
            field: "b_init",
            value: b_init,
            reason: "must be finite and non-negative",
        }
        .into());
    }

    if let Some(result) = profitability_guard(objective, method) {
        return Ok(result);
    }

    let mut b = b_init;
    let mut best = (b, objective.value(b));

    for iteration in 1..=config.max_count {
        let gradient = objective.gradient(b);
        if !gradient.is_finite() {
            return Err(OptimizeError::NonconvergentStep {
                iteration,
                b,
                reason: "gradient is not finite",
            });
        }

        if gradient.abs() < config.epsilon {
            debug!(iteration, b, gradient, "gradient below epsilon");
            return Ok(finish(objective, b, iteration, method, best));
        }

        let step = match method {
            Method::GradientAscent => b + config.alpha * gradient,
            Method::NewtonRaphson => newton_step(objective, b, gradient, iteration, config)?,
        };
        if !step.is_finite() {
            return Err(OptimizeError::NonconvergentStep {
                iteration,
                b,
                reason: "step is not finite",
            });
        }
        let next = if step >= 0.0 {
            step
        } else if b > 0.0 || gradient <= 0.0 {
            0.0
        } else {
            // stuck on the boundary while revenue still rises
            debug!(iteration, step, gradient, "projected step rejected at b = 0");
            config.alpha * gradient
        };

        debug!(iteration, b, next, gradient, ?method, "optimizer step");

        // the first move away from the starting deposit is always taken
        if iteration > 1 && (next - b).abs() < config.tol {
            return Ok(finish(objective, next, iteration, method, best));
        }

        b = next;
        let value = objective.value(b);
        if value > best.1 {
            best = (b, value);
        }
    }

    warn!(
        max_count = config.max_count,
        b_best = best.0,
        ?method,
        "iteration cap reached before convergence"
    );

    Ok(OptimizationResult {
        b_star: best.0,
        iterations: config.max_count,
        converged: false,
        clamped: false,
        method,
        revenue: best.1,
    })
}

fn newton_step<O: Objective>(
    objective: &O,
    b: f64,
    gradient: f64,
    iteration: u32,
    config: &OptimizerConfig,
) -> Result<f64, OptimizeError> {
    let curvature = objective.curvature(b);
    debug!(iteration, b, curvature, "newton curvature");

    if curvature.is_finite() && curvature.abs() > config.min_curvature {
        return Ok(b - gradient / curvature);
    }

    match config.curvature_policy {
        CurvaturePolicy::GradientFallback => {
            warn!(
                iteration,
                b, curvature, "curvature vanished, taking a gradient step"
            );
            Ok(b + config.alpha * gradient)
        }
        CurvaturePolicy::Fail => Err(OptimizeError::NonconvergentStep {
            iteration,
            b,
            reason: "curvature vanished",
        }),
    }
}

/// Folding is skipped outright when the first unit borrowed already loses
/// money.
fn profitability_guard<O: Objective>(
    objective: &O,
    method: Method,
) -> Option<OptimizationResult> {
    let at_zero = objective.value(0.0);
    let at_one = objective.value(1.0);
    if at_one >= at_zero {
        return None;
    }

    info!(at_zero, at_one, ?method, "folding unprofitable, keeping b = 0");
    Some(OptimizationResult {
        b_star: 0.0,
        iterations: 1,
        converged: true,
        clamped: false,
        method,
        revenue: at_zero,
    })
}

/// Builds the converged result at `b`.
///
/// A Newton-Raphson stop at an interior point with `revenue'' >= 0` is a
/// minimum or an inflection, not an optimum; the best iterate is reported
/// instead with `converged = false`.
fn finish<O: Objective>(
    objective: &O,
    b: f64,
    iterations: u32,
    method: Method,
    best: (f64, f64),
) -> OptimizationResult {
    if method == Method::NewtonRaphson && b > 0.0 {
        let curvature = objective.curvature(b);
        if curvature >= 0.0 || curvature.is_nan() {
            warn!(
                b,
                curvature,
                b_best = best.0,
                "stationary point is not a maximum, keeping best iterate"
            );
            return OptimizationResult {
                b_star: best.0,
                iterations,
                converged: false,
                clamped: false,
                method,
                revenue: best.1,
            };
        }
    }

    info!(b, iterations, ?method, "optimizer converged");
    OptimizationResult {
        b_star: b,
        iterations,
        converged: true,
        clamped: false,
        method,
        revenue: objective.value(b),
    }
}

/// Replaces `b_star` with the largest borrow whose collateral ratio stays at
/// `max_collat_ratio` when the result exceeds it.
fn clamp_to_collateral_cap(
    snapshot: &Snapshot,
    result: OptimizationResult,
    max_collat_ratio: f64,
) -> OptimizationResult {
    let fund = snapshot.pool.pool_manager_fund;
    let ratio = result.collateral_ratio(fund);
    if ratio <= max_collat_ratio {
        return result;
    }

    let b_cap = max_collat_ratio * fund / (1.0 - max_collat_ratio);
    warn!(
        b_star = result.b_star,
        ratio, b_cap, "optimum exceeds collateral cap, clamping"
    );

    OptimizationResult {
        b_star: b_cap,
        clamped: true,
        revenue: snapshot.revenue(b_cap),
        ..result
    }
}

fn collateral_ratio(b: f64, pool_manager_fund: f64) -> f64 {
    let total = pool_manager_fund + b;
    if total > 0.0 {
        b / total
    } else {
        0.0
    }
}
