//! Ray fixed-point helpers.
//!
//! Money-market contracts publish balances and rates as integers scaled by
//! 1e27 ("ray"). The model works in `f64`, so snapshots read from chain are
//! converted on the way in and the chosen borrow amount is converted back on
//! the way out.

use alloy_primitives::U256;

use crate::error::{ensure_non_negative, SimError};

/// 1e27, the ray scale
pub const RAY: U256 = U256::from_limbs([0x9FD0_803C_E800_0000, 0x033B_2E3C, 0, 0]);

const RAY_F64: f64 = 1e27;

/// Converts a ray-scaled integer to `f64`.
///
/// The integer and fractional parts are converted separately so balances in
/// the billions keep their sub-unit digits. Integer parts beyond `u128`
/// saturate.
pub fn ray_to_f64(value: U256) -> f64 {
    let whole = value / RAY;
    let frac = value % RAY;
    whole.saturating_to::<u128>() as f64 + frac.saturating_to::<u128>() as f64 / RAY_F64
}

/// Converts a non-negative `f64` to a ray-scaled integer, rounding the
/// fractional part to the nearest 1e-27.
pub fn f64_to_ray(value: f64) -> Result<U256, SimError> {
    ensure_non_negative("value", value).map_err(|_| SimError::RayConversion { value })?;

    let whole = value.trunc();
    if whole >= u128::MAX as f64 {
        return Err(SimError::RayConversion { value });
    }
    let frac = ((value - whole) * RAY_F64).round();

    Ok(U256::from(whole as u128) * RAY + U256::from(frac as u128))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_constant() {
        assert_eq!(RAY, U256::from(10u64).pow(U256::from(27u64)));
    }

    #[test]
    fn test_ray_to_f64_whole_units() {
        assert_eq!(ray_to_f64(RAY), 1.0);
        assert_eq!(ray_to_f64(U256::from(42u64) * RAY), 42.0);
        assert_eq!(ray_to_f64(U256::ZERO), 0.0);
    }

    #[test]
    fn test_ray_to_f64_fraction() {
        // 0.9 ray, the usual optimal utilization
        let u_optimal: U256 = "900000000000000000000000000".parse().unwrap();
        assert!((ray_to_f64(u_optimal) - 0.9).abs() < 1e-15);
    }

    #[test]
    fn test_ray_to_f64_large_balance() {
        let fund: U256 = "168439706352281000000000000000000000".parse().unwrap();
        assert!((ray_to_f64(fund) - 168_439_706.352_281).abs() < 1e-6);
    }

    #[test]
    fn test_f64_to_ray() {
        assert_eq!(f64_to_ray(1.0).unwrap(), RAY);
        assert_eq!(f64_to_ray(0.0).unwrap(), U256::ZERO);
        assert_eq!(
            f64_to_ray(2.5).unwrap(),
            U256::from(5u64) * RAY / U256::from(2u64)
        );
    }

    #[test]
    fn test_f64_to_ray_rejects_bad_values() {
        assert!(matches!(
            f64_to_ray(-1.0),
            Err(SimError::RayConversion { .. })
        ));
        assert!(f64_to_ray(f64::NAN).is_err());
        assert!(f64_to_ray(f64::INFINITY).is_err());
        assert!(f64_to_ray(1e40).is_err());
    }

    #[test]
    fn test_ray_conversion_preserves_borrow_amount() {
        let b_star = 201_647_255.893_837;
        let back = ray_to_f64(f64_to_ray(b_star).unwrap());
        assert!((back - b_star).abs() < 1e-6);
    }
}
