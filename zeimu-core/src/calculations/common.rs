//! Common utility functions for tax calculations.
//!
//! Japanese tax figures are truncated at fixed units (1 yen, 100 yen,
//! 1,000 yen) rather than rounded, so most helpers here floor.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

/// Truncates `value` down to a multiple of `unit`.
///
/// A `unit` of zero leaves the value untouched.
///
/// # Examples
///
/// ```
/// use zeimu_core::calculations::common::floor_to_unit;
///
/// assert_eq!(floor_to_unit(123_456, 1_000), 123_000);
/// assert_eq!(floor_to_unit(99, 100), 0);
/// ```
pub fn floor_to_unit(
    value: u64,
    unit: u64,
) -> u64 {
    if unit == 0 {
        return value;
    }
    value / unit * unit
}

/// Floors a non-negative decimal and converts it to whole yen.
///
/// Returns `None` when the floored value is negative or does not fit.
pub fn floor_to_u64(value: Decimal) -> Option<u64> {
    value.floor().to_u64()
}

/// Returns `numerator / denominator`, or zero when the denominator is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use zeimu_core::calculations::common::ratio;
///
/// assert_eq!(ratio(530_000, 5_000_000), dec!(0.106));
/// assert_eq!(ratio(1, 0), dec!(0));
/// ```
pub fn ratio(
    numerator: u64,
    denominator: u64,
) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(numerator) / Decimal::from(denominator)
}

/// Computes `floor(value * numerator / denominator)` without going through
/// a fractional representation.
///
/// Returns `None` when the denominator is zero or the result overflows.
pub fn mul_div_floor(
    value: u64,
    numerator: u64,
    denominator: u64,
) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let product = u128::from(value) * u128::from(numerator);
    u64::try_from(product / u128::from(denominator)).ok()
}

/// Rounds a decimal to `dp` places, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use zeimu_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(23.15), 1), dec!(23.2));
/// assert_eq!(round_half_up(dec!(23.14), 1), dec!(23.1));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // floor_to_unit tests
    // =========================================================================

    #[test]
    fn floor_to_unit_truncates_to_thousands() {
        assert_eq!(floor_to_unit(1_234_567, 1_000), 1_234_000);
    }

    #[test]
    fn floor_to_unit_keeps_exact_multiples() {
        assert_eq!(floor_to_unit(1_500, 100), 1_500);
    }

    #[test]
    fn floor_to_unit_with_zero_unit_is_identity() {
        assert_eq!(floor_to_unit(1_234, 0), 1_234);
    }

    // =========================================================================
    // floor_to_u64 tests
    // =========================================================================

    #[test]
    fn floor_to_u64_drops_fraction() {
        assert_eq!(floor_to_u64(dec!(780000.9)), Some(780_000));
    }

    #[test]
    fn floor_to_u64_rejects_negative() {
        assert_eq!(floor_to_u64(dec!(-0.5)), None);
    }

    // =========================================================================
    // ratio tests
    // =========================================================================

    #[test]
    fn ratio_divides() {
        assert_eq!(ratio(1, 4), dec!(0.25));
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(100, 0), Decimal::ZERO);
    }

    // =========================================================================
    // mul_div_floor tests
    // =========================================================================

    #[test]
    fn mul_div_floor_is_exact_for_thirds() {
        assert_eq!(mul_div_floor(3, 2, 3), Some(2));
        assert_eq!(mul_div_floor(10, 2, 3), Some(6));
    }

    #[test]
    fn mul_div_floor_survives_large_intermediate() {
        assert_eq!(mul_div_floor(u64::MAX, 2, 2), Some(u64::MAX));
    }

    #[test]
    fn mul_div_floor_rejects_zero_denominator() {
        assert_eq!(mul_div_floor(10, 1, 0), None);
    }

    #[test]
    fn round_half_up_rounds_midpoint_away_from_zero() {
        assert_eq!(round_half_up(dec!(0.05), 1), dec!(0.1));
        assert_eq!(round_half_up(dec!(-0.05), 1), dec!(-0.1));
    }
}
