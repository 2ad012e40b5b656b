//! # Monetary Rounding
//!
//! Rounding rules shared by the parser, the converter and the report.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places every reported amount is rounded to.
pub const CENT_SCALE: u32 = 2;

/// Smallest amount the converter may emit (one cent).
///
/// A zero result would be indistinguishable from "no price".
#[must_use]
pub fn minimum_amount() -> Decimal {
    Decimal::new(1, CENT_SCALE)
}

/// Rounds to two decimal places, half away from zero.
///
/// # Examples
///
/// ```
/// use regional_price_scan::domain::value_objects::money::round_cents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_cents(Decimal::new(1005, 3)), Decimal::new(101, 2));
/// assert_eq!(round_cents(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
/// ```
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to cents and floors the result at [`minimum_amount`].
#[must_use]
pub fn round_cents_floored(value: Decimal) -> Decimal {
    round_cents(value).max(minimum_amount())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_rounds_away_from_zero() {
        assert_eq!(round_cents(Decimal::new(125, 3)), Decimal::new(13, 2));
        assert_eq!(round_cents(Decimal::new(124, 3)), Decimal::new(12, 2));
        assert_eq!(round_cents(Decimal::new(-125, 3)), Decimal::new(-13, 2));
    }

    #[test]
    fn floor_applies_to_tiny_and_negative_values() {
        assert_eq!(round_cents_floored(Decimal::new(4, 3)), minimum_amount());
        assert_eq!(round_cents_floored(Decimal::ZERO), minimum_amount());
        assert_eq!(round_cents_floored(Decimal::new(-5, 0)), minimum_amount());
        assert_eq!(round_cents_floored(Decimal::new(250, 2)), Decimal::new(250, 2));
    }
}
