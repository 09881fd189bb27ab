//! Single-amount progressive tax using the quick-calculation method.
//!
//! Japanese rate schedules are published as 速算表: each row carries a
//! marginal rate and a fixed subtractive deduction, so the tax on a taxable
//! base is `floor(base × rate) − deduction` for the row the base falls in.
//!
//! # Example
//!
//! ```
//! use zeimu_core::calculations::compute_tax;
//! use zeimu_core::GiftType;
//!
//! let table = GiftType::General.brackets();
//! let tax = compute_tax(10_000_000, 1_100_000, &table).unwrap();
//!
//! assert_eq!(tax, 2_310_000);
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::floor_to_u64;
use crate::models::BracketTable;

/// Errors that can occur while computing progressive tax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressiveTaxError {
    /// No bracket admits the taxable base. Validated tables always end in
    /// an unbounded row, so this indicates a broken table.
    #[error("no tax bracket found for taxable base {0}")]
    NoMatchingBracket(u64),

    /// An intermediate or final figure does not fit in a `u64`.
    #[error("tax amount overflowed")]
    AmountOverflow,

    /// A scenario asked for the total to be split into zero parts.
    #[error("scenario '{scenario}' has a division count of zero")]
    ZeroDivisionCount { scenario: String },

    /// A quick-reference listing was requested with a zero step.
    #[error("quick-reference step must be greater than zero")]
    ZeroStep,
}

/// Computes the tax owed on `amount` after subtracting `basic_deduction`.
///
/// Amounts at or below the deduction owe nothing and never reach the
/// bracket lookup. The product is floored before the row's deduction is
/// subtracted; a row deduction larger than the floored product yields zero.
///
/// # Errors
///
/// Returns [`ProgressiveTaxError`] if no bracket matches or the result does
/// not fit in a `u64`.
pub fn compute_tax(
    amount: u64,
    basic_deduction: u64,
    table: &BracketTable,
) -> Result<u64, ProgressiveTaxError> {
    if amount <= basic_deduction {
        return Ok(0);
    }
    let taxable = amount - basic_deduction;

    let bracket = table
        .find(taxable)
        .ok_or(ProgressiveTaxError::NoMatchingBracket(taxable))?;

    let gross = (Decimal::from(taxable) * bracket.rate).floor();
    let tax = gross - Decimal::from(bracket.deduction);
    if tax <= Decimal::ZERO {
        return Ok(0);
    }

    floor_to_u64(tax).ok_or(ProgressiveTaxError::AmountOverflow)
}
