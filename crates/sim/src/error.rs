//! Error types for the folding model.

use thiserror::Error;

/// Errors that can occur while building or evaluating a folding snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A snapshot parameter or candidate borrow amount is outside its domain
    #[error("Invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A float could not be represented as a ray-scaled integer
    #[error("Cannot convert {value} to a ray-scaled amount")]
    RayConversion { value: f64 },
}

/// Rejects NaN and infinities.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidInput {
            field,
            value,
            reason: "must be finite",
        })
    }
}

/// Rejects negative, NaN and infinite values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), SimError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(SimError::InvalidInput {
            field,
            value,
            reason: "must be non-negative",
        });
    }
    Ok(())
}
