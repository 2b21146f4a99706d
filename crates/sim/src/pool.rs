//! Money-market pool balances and utilization.
//!
//! Utilization after folding `b` more assets (deposit `b`, then borrow `b`
//! at the variable rate):
//!
//! ```text
//! u(b)   = (V + b + S) / (D + b)
//! u'(b)  = (D - S - V) / (D + b)^2
//! u''(b) = -2 u'(b) / (D + b)
//! ```
//!
//! where `D` is total deposits, `S` stable borrows and `V` variable borrows.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, SimError};
use crate::math::ray_to_f64;

/// Snapshot of the pool balances a folding run is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    /// Assets the strategy already has deposited in the pool
    pub pool_manager_fund: f64,
    /// Total deposits in the market
    pub comp_deposit: f64,
    /// Total stable-rate borrows
    pub comp_borrow_stable: f64,
    /// Total variable-rate borrows
    pub comp_borrow_variable: f64,
}

impl PoolState {
    pub fn new(
        pool_manager_fund: f64,
        comp_deposit: f64,
        comp_borrow_stable: f64,
        comp_borrow_variable: f64,
    ) -> Self {
        Self {
            pool_manager_fund,
            comp_deposit,
            comp_borrow_stable,
            comp_borrow_variable,
        }
    }

    /// Builds a pool state from ray-scaled (1e27) on-chain balances.
    pub fn from_ray(
        pool_manager_fund: U256,
        comp_deposit: U256,
        comp_borrow_stable: U256,
        comp_borrow_variable: U256,
    ) -> Self {
        Self::new(
            ray_to_f64(pool_manager_fund),
            ray_to_f64(comp_deposit),
            ray_to_f64(comp_borrow_stable),
            ray_to_f64(comp_borrow_variable),
        )
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_non_negative("pool_manager_fund", self.pool_manager_fund)?;
        ensure_finite("comp_deposit", self.comp_deposit)?;
        if self.comp_deposit <= 0.0 {
            return Err(SimError::InvalidInput {
                field: "comp_deposit",
                value: self.comp_deposit,
                reason: "must be positive",
            });
        }
        ensure_non_negative("comp_borrow_stable", self.comp_borrow_stable)?;
        ensure_non_negative("comp_borrow_variable", self.comp_borrow_variable)?;
        Ok(())
    }

    /// Total borrows before folding
    pub fn total_borrow(&self) -> f64 {
        self.comp_borrow_stable + self.comp_borrow_variable
    }

    /// Deposits not currently borrowed, `D - S - V`. Positive in a healthy
    /// pool; it is the numerator of `u'(b)`.
    pub fn liquidity(&self) -> f64 {
        self.comp_deposit - self.total_borrow()
    }

    /// Utilization after folding `b`.
    pub fn utilization(&self, b: f64) -> f64 {
        (self.comp_borrow_variable + b + self.comp_borrow_stable) / (self.comp_deposit + b)
    }

    /// First derivative of [`Self::utilization`] with respect to `b`.
    pub fn utilization_prime(&self, b: f64) -> f64 {
        let new_deposit = self.comp_deposit + b;
        self.liquidity() / (new_deposit * new_deposit)
    }

    /// Second derivative of [`Self::utilization`] with respect to `b`.
    pub fn utilization_prime2(&self, b: f64) -> f64 {
        -2.0 * self.utilization_prime(b) / (self.comp_deposit + b)
    }

    /// Borrow amount at which utilization reaches `target`, or `None` when
    /// folding can never get there (`target` at or below the current
    /// utilization, or at or above 1).
    pub fn borrow_to_utilization(&self, target: f64) -> Option<f64> {
        if target >= 1.0 || target <= self.utilization(0.0) {
            return None;
        }
        Some((target * self.comp_deposit - self.total_borrow()) / (1.0 - target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_pool() -> PoolState {
        PoolState::new(
            1_000_000.0,     // own deposit
            2_250_333_938.0, // total deposits
            11_958_029.0,    // stable borrows
            1_425_711_403.0, // variable borrows
        )
    }

    #[test]
    fn test_utilization_at_zero() {
        let pool = create_test_pool();
        let expected = (1_425_711_403.0 + 11_958_029.0) / 2_250_333_938.0;
        assert!((pool.utilization(0.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_utilization_strictly_increasing() {
        let pool = create_test_pool();
        let mut previous = pool.utilization(0.0);
        for step in 1..=200 {
            let b = f64::from(step) * 5_000_000.0;
            let current = pool.utilization(b);
            assert!(current > previous, "utilization fell at b = {b}");
            previous = current;
        }
    }

    #[test]
    fn test_utilization_approaches_one() {
        let pool = create_test_pool();
        let u = pool.utilization(1e15);
        assert!(u < 1.0);
        assert!(u > 0.999_99);
    }

    #[test]
    fn test_utilization_prime_sign() {
        let pool = create_test_pool();
        assert!(pool.utilization_prime(0.0) > 0.0);
        assert!(pool.utilization_prime2(0.0) < 0.0);
    }

    #[test]
    fn test_utilization_prime_matches_finite_difference() {
        let pool = create_test_pool();
        for b in [0.0, 1e5, 5e7, 2e8] {
            let h = 1e3;
            let b0 = f64::max(b, h);
            let fd = (pool.utilization(b0 + h) - pool.utilization(b0 - h)) / (2.0 * h);
            let exact = pool.utilization_prime(b0);
            assert!(((fd - exact) / exact).abs() < 1e-6, "b = {b0}");
        }
    }

    #[test]
    fn test_borrow_to_utilization() {
        let pool = create_test_pool();
        let b = pool.borrow_to_utilization(0.9).unwrap();
        assert!((pool.utilization(b) - 0.9).abs() < 1e-12);

        assert!(pool.borrow_to_utilization(0.1).is_none());
        assert!(pool.borrow_to_utilization(1.0).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(create_test_pool().validate().is_ok());

        let mut pool = create_test_pool();
        pool.comp_deposit = 0.0;
        assert!(matches!(
            pool.validate(),
            Err(SimError::InvalidInput { field: "comp_deposit", .. })
        ));

        let mut pool = create_test_pool();
        pool.comp_borrow_stable = -1.0;
        assert!(pool.validate().is_err());

        let mut pool = create_test_pool();
        pool.pool_manager_fund = f64::NAN;
        assert!(pool.validate().is_err());
    }

    #[test]
    fn test_from_ray() {
        let pool = PoolState::from_ray(
            "168439706352281000000000000000000000".parse().unwrap(),
            "2512994819641760000000000000000000000".parse().unwrap(),
            "13681150081127000000000000000000000".parse().unwrap(),
            "1491284996535607000000000000000000000".parse().unwrap(),
        );
        assert!((pool.pool_manager_fund - 168_439_706.352_281).abs() < 1e-6);
        assert!((pool.comp_deposit - 2_512_994_819.641_76).abs() < 1e-5);
        assert!((pool.comp_borrow_stable - 13_681_150.081_127).abs() < 1e-6);
        assert!((pool.comp_borrow_variable - 1_491_284_996.535_607).abs() < 1e-5);
    }
}
