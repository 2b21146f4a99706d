//! Validated entry points for evaluating the model at one or many borrow
//! amounts.
//!
//! These are what reporting and plotting code call: every input is checked
//! once up front, then the pure [`Snapshot`] methods do the work.
//!
//! # Example
//!
//! ```rust
//! use fold_rs_sim::{
//!     borrow_range, evaluate_curve, PoolState, RateCurveParams, RewardParams, Snapshot,
//! };
//!
//! let snapshot = Snapshot::new(
//!     PoolState::new(1_000_000.0, 100_000_000.0, 5_000_000.0, 55_000_000.0),
//!     RateCurveParams::new(0.9, 0.0, 0.04, 0.6),
//!     RewardParams::new(0.1, 0.1, 50_000.0, 100_000.0),
//! );
//!
//! let borrows = borrow_range(0.0, 1_000_000.0, 100_000.0).unwrap();
//! let curve = evaluate_curve(&snapshot, &borrows).unwrap();
//!
//! assert_eq!(curve.len(), 10);
//! assert!(curve[9].utilization > curve[0].utilization);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, SimError};
use crate::revenue::Snapshot;

/// Model outputs at a single borrow amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPoint {
    /// Additional borrow amount the point was evaluated at
    pub b: f64,
    pub utilization: f64,
    pub rate: f64,
    pub revenue: f64,
    pub revenue_prime: f64,
    pub revenue_prime2: f64,
}

/// Evaluates utilization, rate, revenue and its derivatives at `b`.
pub fn evaluate_model(snapshot: &Snapshot, b: f64) -> Result<ModelPoint, SimError> {
    snapshot.validate()?;
    ensure_non_negative("b", b)?;
    Ok(point(snapshot, b))
}

/// Evaluates the model at each borrow amount, preserving order.
pub fn evaluate_curve(snapshot: &Snapshot, borrows: &[f64]) -> Result<Vec<ModelPoint>, SimError> {
    snapshot.validate()?;
    for &b in borrows {
        ensure_non_negative("b", b)?;
    }
    Ok(borrows.iter().map(|&b| point(snapshot, b)).collect())
}

/// Evaluates [`Snapshot::revenue_surface`] on a grid: one row per reward
/// rate, one column per borrow amount.
pub fn evaluate_surface(
    snapshot: &Snapshot,
    borrows: &[f64],
    reward_rates: &[f64],
) -> Result<Vec<Vec<f64>>, SimError> {
    snapshot.validate()?;
    for &b in borrows {
        ensure_non_negative("b", b)?;
    }
    for &reward_rate in reward_rates {
        ensure_finite("external_reward_rate", reward_rate)?;
    }

    Ok(reward_rates
        .iter()
        .map(|&reward_rate| {
            borrows
                .iter()
                .map(|&b| snapshot.revenue_surface(b, reward_rate))
                .collect()
        })
        .collect())
}

/// Largest grid [`borrow_range`] will build.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Borrow amounts `start, start + step, ...` strictly below `stop`.
pub fn borrow_range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, SimError> {
    ensure_non_negative("start", start)?;
    ensure_finite("stop", stop)?;
    ensure_finite("step", step)?;
    if step <= 0.0 {
        return Err(SimError::InvalidInput {
            field: "step",
            value: step,
            reason: "must be positive",
        });
    }
    if stop <= start {
        return Ok(Vec::new());
    }

    let count = ((stop - start) / step).ceil();
    if count > MAX_GRID_POINTS as f64 {
        return Err(SimError::InvalidInput {
            field: "step",
            value: step,
            reason: "too small for the range, grid would exceed MAX_GRID_POINTS",
        });
    }
    let count = count as usize;
    Ok((0..count)
        .map(|i| start + step * i as f64)
        .filter(|&b| b < stop)
        .collect())
}

fn point(snapshot: &Snapshot, b: f64) -> ModelPoint {
    let revenue = snapshot.revenue_terms(b);
    ModelPoint {
        b,
        utilization: snapshot.utilization(b),
        rate: snapshot.rate(b),
        revenue: revenue.value,
        revenue_prime: revenue.prime,
        revenue_prime2: revenue.prime2,
    }
}
