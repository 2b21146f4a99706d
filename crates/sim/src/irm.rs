//! Kinked (two-slope) interest rate model.
//!
//! The variable borrow rate is piecewise linear in utilization with a kink at
//! the optimal utilization:
//!
//! ```text
//! If utilization <= u_optimal:
//!     rate = r0 + slope1 * utilization / u_optimal
//! Otherwise:
//!     rate = r0 + slope1 + slope2 * (utilization - u_optimal) / (1 - u_optimal)
//! ```
//!
//! Both branches equal `r0 + slope1` at the kink, so the curve is continuous
//! there; the boundary itself is routed to the first branch.
//!
//! Derivatives with respect to the folded borrow amount `b` go through the
//! chain rule. The curve is linear on each side of the kink, so
//!
//! ```text
//! rate'(b)  = slope(u) * u'(b)
//! rate''(b) = slope(u) * u''(b)
//! ```
//!
//! with `slope(u)` taken from the same branch as the rate itself. The second
//! derivative jumps at the kink.
//!
//! # Example
//!
//! ```rust
//! use fold_rs_sim::irm::RateCurveParams;
//!
//! let curve = RateCurveParams::new(0.9, 0.0, 0.04, 0.6);
//!
//! assert!((curve.rate_at_utilization(0.45) - 0.02).abs() < 1e-15);
//! assert!((curve.rate_at_utilization(0.9) - 0.04).abs() < 1e-15);
//! assert!((curve.rate_at_utilization(1.0) - 0.64).abs() < 1e-12);
//! ```

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, SimError};
use crate::math::ray_to_f64;
use crate::pool::PoolState;

/// Parameters of the kinked borrow rate curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCurveParams {
    /// Utilization at which the slope changes, in (0, 1)
    pub u_optimal: f64,
    /// Base rate at zero utilization
    pub r0: f64,
    /// Rate increase from zero to optimal utilization
    pub slope1: f64,
    /// Rate increase from optimal to full utilization
    pub slope2: f64,
}

/// Borrow rate and its derivatives with respect to the folded amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorrowRate {
    pub rate: f64,
    pub rate_prime: f64,
    pub rate_prime2: f64,
}

impl RateCurveParams {
    pub fn new(u_optimal: f64, r0: f64, slope1: f64, slope2: f64) -> Self {
        Self {
            u_optimal,
            r0,
            slope1,
            slope2,
        }
    }

    /// Builds the curve from ray-scaled (1e27) on-chain parameters.
    pub fn from_ray(u_optimal: U256, r0: U256, slope1: U256, slope2: U256) -> Self {
        Self::new(
            ray_to_f64(u_optimal),
            ray_to_f64(r0),
            ray_to_f64(slope1),
            ray_to_f64(slope2),
        )
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_finite("u_optimal", self.u_optimal)?;
        if self.u_optimal <= 0.0 || self.u_optimal >= 1.0 {
            return Err(SimError::InvalidInput {
                field: "u_optimal",
                value: self.u_optimal,
                reason: "must lie strictly between 0 and 1",
            });
        }
        ensure_non_negative("r0", self.r0)?;
        ensure_non_negative("slope1", self.slope1)?;
        ensure_non_negative("slope2", self.slope2)?;
        Ok(())
    }

    /// Whether `utilization` falls on the first (pre-kink) branch.
    pub fn below_kink(&self, utilization: f64) -> bool {
        utilization <= self.u_optimal
    }

    /// Borrow rate at a given utilization.
    pub fn rate_at_utilization(&self, utilization: f64) -> f64 {
        if self.below_kink(utilization) {
            self.r0 + self.slope1 * utilization / self.u_optimal
        } else {
            self.r0
                + self.slope1
                + self.slope2 * (utilization - self.u_optimal) / (1.0 - self.u_optimal)
        }
    }

    /// d(rate)/d(utilization) on the branch selected by `utilization`.
    pub fn slope_at_utilization(&self, utilization: f64) -> f64 {
        if self.below_kink(utilization) {
            self.slope1 / self.u_optimal
        } else {
            self.slope2 / (1.0 - self.u_optimal)
        }
    }

    /// Borrow rate after folding `b` into `pool`.
    pub fn rate(&self, pool: &PoolState, b: f64) -> f64 {
        self.rate_at_utilization(pool.utilization(b))
    }

    /// First derivative of [`Self::rate`] with respect to `b`.
    pub fn rate_prime(&self, pool: &PoolState, b: f64) -> f64 {
        self.slope_at_utilization(pool.utilization(b)) * pool.utilization_prime(b)
    }

    /// Second derivative of [`Self::rate`] with respect to `b`.
    pub fn rate_prime2(&self, pool: &PoolState, b: f64) -> f64 {
        self.slope_at_utilization(pool.utilization(b)) * pool.utilization_prime2(b)
    }

    /// Rate and both derivatives, sharing one branch selection.
    pub fn borrow_rate(&self, pool: &PoolState, b: f64) -> BorrowRate {
        let utilization = pool.utilization(b);
        let slope = self.slope_at_utilization(utilization);
        let u_prime = pool.utilization_prime(b);
        let u_prime2 = pool.utilization_prime2(b);

        BorrowRate {
            rate: self.rate_at_utilization(utilization),
            rate_prime: slope * u_prime,
            rate_prime2: slope * u_prime2,
        }
    }
}
