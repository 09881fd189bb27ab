use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named way of splitting a total into equal parts, each taxed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: Cow<'static, str>,
    pub division_count: u32,
}

impl Scenario {
    pub const fn new(
        name: &'static str,
        division_count: u32,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            division_count,
        }
    }
}

/// Outcome of taxing one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub scenario_name: String,
    pub division_count: u32,

    /// Total divided by the division count, remainder dropped.
    pub per_part_amount: u64,
    pub per_part_tax: u64,
    pub total_tax: u64,

    /// `per_part_tax / per_part_amount` as a fraction, zero when nothing
    /// was taxed.
    pub effective_rate: Decimal,
}

/// One row of a quick-reference (早見表) listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReferenceRow {
    pub amount: u64,
    pub tax: u64,
    pub effective_rate: Decimal,
}
