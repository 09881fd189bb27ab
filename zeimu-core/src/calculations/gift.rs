//! Gift tax (贈与税) simulator.
//!
//! Compares giving a sum at once against spreading it over several years,
//! using the National Tax Agency quick-calculation tables below. Amounts are
//! in yen; the bracket limits apply to the amount left after the annual
//! basic deduction of 1,100,000 yen.
//!
//! | General limit | Rate | Deduction | Special limit | Rate | Deduction |
//! |---------------|------|-----------|---------------|------|-----------|
//! | 2,000,000     | 10%  | 0         | 2,000,000     | 10%  | 0         |
//! | 3,000,000     | 15%  | 100,000   | 4,000,000     | 15%  | 100,000   |
//! | 4,000,000     | 20%  | 250,000   | 6,000,000     | 20%  | 300,000   |
//! | 6,000,000     | 30%  | 650,000   | 10,000,000    | 30%  | 900,000   |
//! | 10,000,000    | 40%  | 1,250,000 | 15,000,000    | 40%  | 1,900,000 |
//! | 15,000,000    | 45%  | 1,750,000 | 30,000,000    | 45%  | 2,650,000 |
//! | 30,000,000    | 50%  | 2,500,000 | 45,000,000    | 50%  | 4,150,000 |
//! | over          | 55%  | 4,000,000 | over          | 55%  | 6,400,000 |
//!
//! # Example
//!
//! ```
//! use zeimu_core::GiftType;
//! use zeimu_core::calculations::GiftTaxSimulator;
//!
//! let simulator = GiftTaxSimulator::new(GiftType::General.brackets());
//! let results = simulator.compare_patterns(10_000_000).unwrap();
//!
//! assert_eq!(results[0].total_tax, 2_310_000);
//! assert_eq!(results[1].total_tax, 1_060_000);
//! ```

use rust_decimal_macros::dec;

use crate::calculations::progressive::{ProgressiveTaxError, compute_tax};
use crate::calculations::scenarios::{expand_scenarios, quick_reference};
use crate::models::{BracketTable, CalculationResult, QuickReferenceRow, RateBracket, Scenario};

/// Annual basic deduction for gifts (基礎控除).
pub const GIFT_BASIC_DEDUCTION: u64 = 1_100_000;

/// Step between rows of the gift-tax quick-reference listing (1,000,000 yen).
pub const QUICK_REFERENCE_STEP: u64 = 1_000_000;

/// 一般贈与 rate table.
pub const GENERAL_GIFT_BRACKETS: [RateBracket; 8] = [
    RateBracket::new(Some(2_000_000), dec!(0.10), 0),
    RateBracket::new(Some(3_000_000), dec!(0.15), 100_000),
    RateBracket::new(Some(4_000_000), dec!(0.20), 250_000),
    RateBracket::new(Some(6_000_000), dec!(0.30), 650_000),
    RateBracket::new(Some(10_000_000), dec!(0.40), 1_250_000),
    RateBracket::new(Some(15_000_000), dec!(0.45), 1_750_000),
    RateBracket::new(Some(30_000_000), dec!(0.50), 2_500_000),
    RateBracket::new(None, dec!(0.55), 4_000_000),
];

/// 特例贈与 rate table.
pub const SPECIAL_GIFT_BRACKETS: [RateBracket; 8] = [
    RateBracket::new(Some(2_000_000), dec!(0.10), 0),
    RateBracket::new(Some(4_000_000), dec!(0.15), 100_000),
    RateBracket::new(Some(6_000_000), dec!(0.20), 300_000),
    RateBracket::new(Some(10_000_000), dec!(0.30), 900_000),
    RateBracket::new(Some(15_000_000), dec!(0.40), 1_900_000),
    RateBracket::new(Some(30_000_000), dec!(0.45), 2_650_000),
    RateBracket::new(Some(45_000_000), dec!(0.50), 4_150_000),
    RateBracket::new(None, dec!(0.55), 6_400_000),
];

/// Lump sum, two-year split and four-year split.
pub const GIFT_PATTERNS: [Scenario; 3] = [
    Scenario::new("一括贈与", 1),
    Scenario::new("2年分割", 2),
    Scenario::new("4年分割", 4),
];

/// Gift tax calculator over a swappable rate table.
#[derive(Debug, Clone)]
pub struct GiftTaxSimulator {
    table: BracketTable,
    basic_deduction: u64,
    patterns: Vec<Scenario>,
}

impl GiftTaxSimulator {
    /// Creates a simulator with the standard basic deduction and patterns.
    pub fn new(table: BracketTable) -> Self {
        Self {
            table,
            basic_deduction: GIFT_BASIC_DEDUCTION,
            patterns: GIFT_PATTERNS.to_vec(),
        }
    }

    pub fn with_basic_deduction(
        mut self,
        basic_deduction: u64,
    ) -> Self {
        self.basic_deduction = basic_deduction;
        self
    }

    pub fn with_table(
        mut self,
        table: BracketTable,
    ) -> Self {
        self.table = table;
        self
    }

    pub fn with_patterns(
        mut self,
        patterns: Vec<Scenario>,
    ) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    pub fn basic_deduction(&self) -> u64 {
        self.basic_deduction
    }

    pub fn patterns(&self) -> &[Scenario] {
        &self.patterns
    }

    /// Tax on a single gift of `amount` received within one year.
    pub fn tax_for_single_gift(
        &self,
        amount: u64,
    ) -> Result<u64, ProgressiveTaxError> {
        compute_tax(amount, self.basic_deduction, &self.table)
    }

    /// Taxes `amount` under every configured split pattern.
    pub fn compare_patterns(
        &self,
        amount: u64,
    ) -> Result<Vec<CalculationResult>, ProgressiveTaxError> {
        expand_scenarios(amount, self.basic_deduction, &self.table, &self.patterns)
    }

    /// Quick-reference rows every 1,000,000 yen up to `max_amount`.
    pub fn quick_reference(
        &self,
        max_amount: u64,
    ) -> Result<Vec<QuickReferenceRow>, ProgressiveTaxError> {
        quick_reference(
            max_amount,
            QUICK_REFERENCE_STEP,
            self.basic_deduction,
            &self.table,
        )
    }
}
