//! Monetary types and the decimal/float bridge used by the linear system.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Monetary amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Volume represented as a Decimal for precision.
pub type Volume = Decimal;

/// Convert a decimal amount into the float domain of the solver.
#[must_use]
pub fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Convert a solved float back into a decimal amount.
///
/// Returns `None` for NaN, infinities and values outside the decimal range.
#[must_use]
pub fn from_f64(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    Decimal::from_f64(f)
}
