//! Folding Model SDK
//!
//! This crate models the profit of a leveraged lending loop ("folding"):
//! deposit into a money-market pool, borrow against it, redeposit the borrow.
//! Given a frozen snapshot of the pool, it prices an additional borrow amount
//! `b` analytically.
//!
//! # Overview
//!
//! The model gives you:
//! - Pool utilization after folding `b`, with exact first and second derivatives
//! - The kinked (two-slope) variable borrow rate and its derivatives
//! - Net revenue of the fold (interest share + incentives - borrow cost)
//!   with exact `revenue'` and `revenue''` for curvature-based optimizers
//! - Batch evaluation over borrow ranges and reward-rate sweeps
//! - Ray (1e27) conversions for balances read from chain
//!
//! # Example
//!
//! ```rust
//! use fold_rs_sim::{evaluate_model, PoolState, RateCurveParams, RewardParams, Snapshot};
//!
//! let snapshot = Snapshot::new(
//!     PoolState::new(1_000_000.0, 100_000_000.0, 5_000_000.0, 55_000_000.0),
//!     RateCurveParams::new(0.9, 0.0, 0.04, 0.6),
//!     RewardParams::new(0.1, 0.1, 50_000.0, 100_000.0),
//! );
//!
//! let point = evaluate_model(&snapshot, 250_000.0)?;
//! assert!(point.utilization > snapshot.utilization(0.0));
//! # Ok::<(), fold_rs_sim::SimError>(())
//! ```

pub mod error;
pub mod evaluate;
pub mod irm;
pub mod math;
pub mod pool;
pub mod revenue;

pub use error::SimError;

pub use evaluate::{
    borrow_range, evaluate_curve, evaluate_model, evaluate_surface, ModelPoint, MAX_GRID_POINTS,
};

pub use irm::{BorrowRate, RateCurveParams};

pub use math::{f64_to_ray, ray_to_f64, RAY};

pub use pool::PoolState;

pub use revenue::{Revenue, RewardParams, Snapshot};
