use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a quick-calculation (速算表) rate table.
///
/// `upper_limit` is inclusive; `None` marks the final, unbounded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBracket {
    pub upper_limit: Option<u64>,
    pub rate: Decimal,
    pub deduction: u64,
}

impl RateBracket {
    pub const fn new(
        upper_limit: Option<u64>,
        rate: Decimal,
        deduction: u64,
    ) -> Self {
        Self {
            upper_limit,
            rate,
            deduction,
        }
    }

    /// Returns true when `amount` falls at or below this row's limit.
    pub fn admits(
        &self,
        amount: u64,
    ) -> bool {
        match self.upper_limit {
            Some(limit) => amount <= limit,
            None => true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_limit.is_none()
    }
}
