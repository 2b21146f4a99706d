//! Revenue of a folded position and its exact derivatives.
//!
//! Folding `b` deposits `b` more into the pool and borrows `b` at the
//! variable rate. With `P` the strategy's own deposit, `D` total deposits,
//! `S` stable borrows and `V` variable borrows:
//!
//! ```text
//! f1(b)      = (b + P) / (b + D) * (1 - rf)          deposit share, net of reserve
//! f2(b)      = S * r_fixed + (b + V) * rate(b)       pool interest income
//! cost(b)    = b * rate(b)                           interest paid on the fold
//! rewards(b) = reward_borrow * b / (b + V + S)
//!            + reward_deposit * (b + P) / (b + D)
//!
//! revenue(b) = f1 * f2 + rewards - cost
//! ```
//!
//! `revenue'` and `revenue''` are obtained term by term with the product and
//! quotient rules, reusing `rate`, `rate'` and `rate''` from the curve.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, SimError};
use crate::irm::{BorrowRate, RateCurveParams};
use crate::math::ray_to_f64;
use crate::pool::PoolState;

/// Pool income and incentive parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Rate paid by the stable borrow tranche
    pub r_fixed: f64,
    /// Reserve factor, the share of interest kept by the protocol
    pub rf: f64,
    /// Incentives streamed to depositors (dollars per unit of time)
    pub reward_deposit: f64,
    /// Incentives streamed to borrowers (dollars per unit of time)
    pub reward_borrow: f64,
}

impl RewardParams {
    pub fn new(r_fixed: f64, rf: f64, reward_deposit: f64, reward_borrow: f64) -> Self {
        Self {
            r_fixed,
            rf,
            reward_deposit,
            reward_borrow,
        }
    }

    /// Builds reward parameters from ray-scaled (1e27) values.
    pub fn from_ray(r_fixed: U256, rf: U256, reward_deposit: U256, reward_borrow: U256) -> Self {
        Self::new(
            ray_to_f64(r_fixed),
            ray_to_f64(rf),
            ray_to_f64(reward_deposit),
            ray_to_f64(reward_borrow),
        )
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_non_negative("r_fixed", self.r_fixed)?;
        ensure_non_negative("rf", self.rf)?;
        if self.rf >= 1.0 {
            return Err(SimError::InvalidInput {
                field: "rf",
                value: self.rf,
                reason: "must be below 1",
            });
        }
        ensure_non_negative("reward_deposit", self.reward_deposit)?;
        ensure_non_negative("reward_borrow", self.reward_borrow)?;
        Ok(())
    }
}

/// Revenue and its first two derivatives at one borrow amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub value: f64,
    pub prime: f64,
    pub prime2: f64,
}

/// Everything the model needs to price a fold: pool balances, rate curve and
/// rewards, frozen for one evaluation or optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pool: PoolState,
    pub curve: RateCurveParams,
    pub rewards: RewardParams,
}

impl Snapshot {
    pub fn new(pool: PoolState, curve: RateCurveParams, rewards: RewardParams) -> Self {
        Self {
            pool,
            curve,
            rewards,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.pool.validate()?;
        self.curve.validate()?;
        self.rewards.validate()
    }

    pub fn utilization(&self, b: f64) -> f64 {
        self.pool.utilization(b)
    }

    pub fn rate(&self, b: f64) -> f64 {
        self.curve.rate(&self.pool, b)
    }

    pub fn rate_prime(&self, b: f64) -> f64 {
        self.curve.rate_prime(&self.pool, b)
    }

    pub fn rate_prime2(&self, b: f64) -> f64 {
        self.curve.rate_prime2(&self.pool, b)
    }

    pub fn revenue(&self, b: f64) -> f64 {
        self.revenue_terms(b).value
    }

    pub fn revenue_prime(&self, b: f64) -> f64 {
        self.revenue_terms(b).prime
    }

    pub fn revenue_prime2(&self, b: f64) -> f64 {
        self.revenue_terms(b).prime2
    }

    /// Revenue, `revenue'` and `revenue''` at `b` from a single rate lookup.
    pub fn revenue_terms(&self, b: f64) -> Revenue {
        let BorrowRate {
            rate,
            rate_prime,
            rate_prime2,
        } = self.curve.borrow_rate(&self.pool, b);
        let pool = &self.pool;
        let rewards = &self.rewards;

        let new_pool_deposit = b + pool.pool_manager_fund;
        let new_comp_deposit = b + pool.comp_deposit;
        let new_comp_borrow_variable = b + pool.comp_borrow_variable;
        let reserve_kept = 1.0 - rewards.rf;
        // D - P, numerator of the deposit share derivative
        let deposit_gap = pool.comp_deposit - pool.pool_manager_fund;

        let f1 = new_pool_deposit / new_comp_deposit * reserve_kept;
        let f1_prime = deposit_gap * reserve_kept / new_comp_deposit.powi(2);
        let f1_prime2 = -2.0 * deposit_gap * reserve_kept / new_comp_deposit.powi(3);

        let f2 = pool.comp_borrow_stable * rewards.r_fixed + new_comp_borrow_variable * rate;
        let f2_prime = rate + new_comp_borrow_variable * rate_prime;
        let f2_prime2 = 2.0 * rate_prime + new_comp_borrow_variable * rate_prime2;

        let cost = b * rate;
        let cost_prime = rate + b * rate_prime;
        let cost_prime2 = 2.0 * rate_prime + b * rate_prime2;

        let borrow_reward = self.borrow_reward(b);
        let deposit_reward = rewards.reward_deposit * new_pool_deposit / new_comp_deposit;
        let deposit_reward_prime =
            rewards.reward_deposit * deposit_gap / new_comp_deposit.powi(2);
        let deposit_reward_prime2 =
            -2.0 * rewards.reward_deposit * deposit_gap / new_comp_deposit.powi(3);

        Revenue {
            value: f1 * f2 + borrow_reward.value + deposit_reward - cost,
            prime: f1_prime * f2 + f1 * f2_prime - cost_prime
                + borrow_reward.prime
                + deposit_reward_prime,
            prime2: f1_prime2 * f2 + f1_prime * f2_prime + f2_prime * f1_prime + f2_prime2 * f1
                - cost_prime2
                + borrow_reward.prime2
                + deposit_reward_prime2,
        }
    }

    /// Revenue with the reward streams replaced by a flat reward rate per
    /// unit borrowed, for sweeping incentive levels independently of the
    /// pool's own emissions.
    pub fn revenue_surface(&self, b: f64, external_reward_rate: f64) -> f64 {
        let pool = &self.pool;
        let rate = self.rate(b);
        let earnings = (b + pool.pool_manager_fund)
            * (1.0 - self.rewards.rf)
            * (pool.comp_borrow_stable * self.rewards.r_fixed
                + (b + pool.comp_borrow_variable) * rate)
            / (b + pool.comp_deposit);

        earnings - b * rate + b * external_reward_rate
    }

    /// Borrow-side incentive share `reward_borrow * b / (b + V + S)` and its
    /// derivatives.
    fn borrow_reward(&self, b: f64) -> Revenue {
        let reward_borrow = self.rewards.reward_borrow;
        let total_borrow = self.pool.total_borrow();
        let new_comp_borrow = b + total_borrow;

        // Empty book: the fold is the only borrower.
        if total_borrow <= 0.0 {
            let value = if b > 0.0 { reward_borrow } else { 0.0 };
            return Revenue {
                value,
                prime: 0.0,
                prime2: 0.0,
            };
        }

        Revenue {
            value: reward_borrow * b / new_comp_borrow,
            prime: reward_borrow * total_borrow / new_comp_borrow.powi(2),
            prime2: -2.0 * reward_borrow * total_borrow / new_comp_borrow.powi(3),
        }
    }
}
