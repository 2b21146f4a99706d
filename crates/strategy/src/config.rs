//! Optimizer settings.
//!
//! [`OptimizerConfig`] deserializes with every field optional, so a caller
//! can override just the tolerances in a JSON file and keep the defaults for
//! the rest.

use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

/// Search procedure used by [`crate::optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Fixed-step ascent along `revenue'`.
    GradientAscent,
    /// Newton's method on `revenue'`, using `revenue''` as curvature.
    #[default]
    NewtonRaphson,
}

/// What Newton-Raphson does when `revenue''` is too close to zero to divide
/// by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvaturePolicy {
    /// Take one gradient-ascent step of size `alpha` and carry on.
    #[default]
    GradientFallback,
    /// Abort with [`OptimizeError::NonconvergentStep`].
    Fail,
}

/// Stopping rules, step sizes and the collateral cap for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Stop once `|revenue'(b)|` falls below this
    pub epsilon: f64,
    /// Stop once an iteration moves `b` by less than this
    pub tol: f64,
    /// Iteration cap
    pub max_count: u32,
    /// Highest allowed `b / (pool_manager_fund + b)` for Newton-Raphson results
    pub max_collat_ratio: f64,
    /// Gradient-ascent step size
    pub alpha: f64,
    /// `|revenue''|` at or below this counts as vanished curvature
    pub min_curvature: f64,
    pub curvature_policy: CurvaturePolicy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            tol: 1e-6,
            max_count: 100,
            max_collat_ratio: 0.9,
            alpha: 5000.0,
            min_curvature: 1e-30,
            curvature_policy: CurvaturePolicy::GradientFallback,
        }
    }
}

impl OptimizerConfig {
    pub fn with_tolerances(mut self, epsilon: f64, tol: f64) -> Self {
        self.epsilon = epsilon;
        self.tol = tol;
        self
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_max_collat_ratio(mut self, max_collat_ratio: f64) -> Self {
        self.max_collat_ratio = max_collat_ratio;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_curvature_policy(mut self, policy: CurvaturePolicy, min_curvature: f64) -> Self {
        self.curvature_policy = policy;
        self.min_curvature = min_curvature;
        self
    }

    pub fn validate(&self) -> Result<(), OptimizeError> {
        positive("epsilon", self.epsilon)?;
        positive("tol", self.tol)?;
        positive("alpha", self.alpha)?;
        if self.max_count == 0 {
            return Err(OptimizeError::InvalidConfig {
                field: "max_count",
                value: 0.0,
                reason: "must allow at least one iteration",
            });
        }
        let ratio = self.max_collat_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(OptimizeError::InvalidConfig {
                field: "max_collat_ratio",
                value: self.max_collat_ratio,
                reason: "must lie strictly between 0 and 1",
            });
        }
        if !self.min_curvature.is_finite() || self.min_curvature < 0.0 {
            return Err(OptimizeError::InvalidConfig {
                field: "min_curvature",
                value: self.min_curvature,
                reason: "must be finite and non-negative",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), OptimizeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OptimizeError::InvalidConfig {
            field,
            value,
            reason: "must be finite and positive",
        })
    }
}
