//! Human-facing summary of an optimization run.
//!
//! Model math stays in `f64`; the plan converts to [`Decimal`] once at the
//! edge so reports and basis-point figures don't carry float noise.

use fold_rs_sim::Snapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::optimizer::OptimizationResult;

/// What the strategy should do with its deposit, in reporting units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldPlan {
    /// Additional amount to borrow and redeposit.
    pub borrow: Decimal,
    /// Own funds plus the folded borrow.
    pub total_deposit: Decimal,
    /// `borrow / total_deposit`.
    pub collateral_ratio: Decimal,
    /// `total_deposit / own funds`.
    pub leverage: Decimal,
    /// Modelled revenue at `borrow`.
    pub expected_revenue: Decimal,
    /// Revenue over own funds (as decimal, e.g., 0.05 = 5%).
    pub net_apr: Decimal,
    /// Whether the collateral cap bound the borrow.
    pub clamped: bool,
}

impl FoldPlan {
    pub fn new(snapshot: &Snapshot, result: &OptimizationResult) -> Self {
        let own = snapshot.pool.pool_manager_fund;
        let total = own + result.b_star;

        let leverage = if own > 0.0 { total / own } else { 0.0 };
        let net_apr = if own > 0.0 { result.revenue / own } else { 0.0 };

        Self {
            borrow: FoldMath::f64_to_decimal(result.b_star),
            total_deposit: FoldMath::f64_to_decimal(total),
            collateral_ratio: FoldMath::f64_to_decimal(result.collateral_ratio(own)),
            leverage: FoldMath::f64_to_decimal(leverage),
            expected_revenue: FoldMath::f64_to_decimal(result.revenue),
            net_apr: FoldMath::f64_to_decimal(net_apr),
            clamped: result.clamped,
        }
    }

    /// Net APR in basis points.
    pub fn net_apr_bps(&self) -> i64 {
        FoldMath::decimal_to_bps(self.net_apr)
    }
}

/// Decimal helpers for reporting.
pub struct FoldMath;

impl FoldMath {
    /// Convert a decimal to basis points, saturating at the `i64` bounds.
    pub fn decimal_to_bps(d: Decimal) -> i64 {
        let saturated = if d.is_sign_positive() {
            i64::MAX
        } else {
            i64::MIN
        };
        d.checked_mul(Decimal::from(10000))
            .and_then(|bps| bps.round().try_into().ok())
            .unwrap_or(saturated)
    }

    /// Non-finite or out-of-range floats map to zero.
    pub fn f64_to_decimal(f: f64) -> Decimal {
        Decimal::try_from(f).unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Method;
    use fold_rs_sim::{PoolState, RateCurveParams, RewardParams};
    use rust_decimal_macros::dec;

    fn snapshot(pool_manager_fund: f64) -> Snapshot {
        Snapshot::new(
            PoolState::new(pool_manager_fund, 100_000_000.0, 5_000_000.0, 55_000_000.0),
            RateCurveParams::new(0.9, 0.0, 0.04, 0.6),
            RewardParams::new(0.1, 0.1, 50_000.0, 100_000.0),
        )
    }

    fn result(b_star: f64, revenue: f64) -> OptimizationResult {
        OptimizationResult {
            b_star,
            iterations: 4,
            converged: true,
            clamped: true,
            method: Method::NewtonRaphson,
            revenue,
        }
    }

    #[test]
    fn test_plan_from_clamped_result() {
        let plan = FoldPlan::new(&snapshot(1_000_000.0), &result(9_000_000.0, 50_000.0));

        assert_eq!(plan.borrow, dec!(9000000));
        assert_eq!(plan.total_deposit, dec!(10000000));
        assert_eq!(plan.collateral_ratio, dec!(0.9));
        assert_eq!(plan.leverage, dec!(10));
        assert_eq!(plan.expected_revenue, dec!(50000));
        assert_eq!(plan.net_apr, dec!(0.05));
        assert_eq!(plan.net_apr_bps(), 500);
        assert!(plan.clamped);
    }

    #[test]
    fn test_plan_without_own_funds() {
        let plan = FoldPlan::new(&snapshot(0.0), &result(0.0, 0.0));

        assert_eq!(plan.leverage, Decimal::ZERO);
        assert_eq!(plan.net_apr, Decimal::ZERO);
        assert_eq!(plan.collateral_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_decimal_to_bps() {
        assert_eq!(FoldMath::decimal_to_bps(dec!(0.01)), 100);
        assert_eq!(FoldMath::decimal_to_bps(dec!(-0.001)), -10);
        assert_eq!(FoldMath::decimal_to_bps(Decimal::ZERO), 0);
        assert_eq!(FoldMath::decimal_to_bps(dec!(0.00006)), 1);
        assert_eq!(FoldMath::decimal_to_bps(dec!(0.00014)), 1);
    }

    #[test]
    fn test_decimal_to_bps_saturates() {
        assert_eq!(FoldMath::decimal_to_bps(Decimal::MAX), i64::MAX);
        assert_eq!(FoldMath::decimal_to_bps(Decimal::MIN), i64::MIN);
    }

    #[test]
    fn test_f64_to_decimal() {
        assert_eq!(FoldMath::f64_to_decimal(1.5), dec!(1.5));
        assert_eq!(FoldMath::f64_to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(FoldMath::f64_to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
