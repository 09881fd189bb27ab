//! Income tax on retirement allowances (退職所得).
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Years of service (any fraction of a year counts as a full year) |
//! | 2    | Retirement income deduction (退職所得控除額) |
//! | 3    | Taxable retirement income, truncated to 1,000 yen |
//! | 4    | Income tax from the quick-calculation table, truncated to 100 yen |
//! | 5    | Special reconstruction income tax (2.1% of step 4), truncated to 1 yen |
//! | 6    | Resident tax: municipal 6% and prefectural 4%, each truncated to 100 yen |
//! | 7    | Total tax and net amount received |
//!
//! Step 3 depends on the kind of allowance: ordinary allowances are halved,
//! allowances to officers with five years of service or less are not, and
//! short-service allowances are halved only up to 3,000,000 yen of excess.
//!
//! # Example
//!
//! ```
//! use zeimu_core::calculations::{
//!     RetirementKind, RetirementTaxInput, RetirementTaxRates, RetirementTaxWorksheet,
//! };
//!
//! let rates = RetirementTaxRates::for_year(2025).unwrap();
//! let worksheet = RetirementTaxWorksheet::new(rates);
//! let result = worksheet
//!     .calculate(&RetirementTaxInput {
//!         amount: 30_000_000,
//!         service_years: 30,
//!         kind: RetirementKind::General,
//!         is_disability: false,
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.deduction, 15_000_000);
//! assert_eq!(result.taxable_income, 7_500_000);
//! assert_eq!(result.total_tax, 1_861_869);
//! ```

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{floor_to_u64, floor_to_unit, ratio};
use crate::calculations::progressive::{ProgressiveTaxError, compute_tax};
use crate::models::{BracketTable, RateBracket};

/// Errors that can occur during retirement income tax calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetirementTaxError {
    /// No rate set is published for the requested year.
    #[error("no retirement tax rates for year {0}")]
    UnknownTaxYear(i32),

    #[error(transparent)]
    Tax(#[from] ProgressiveTaxError),
}

/// How the allowance is treated when computing taxable income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementKind {
    /// 一般退職手当等
    #[default]
    General,
    /// 特定役員退職手当等: officers with five years of service or less.
    Officer,
    /// 短期退職手当等: non-officers with five years of service or less.
    ShortTerm,
}

impl RetirementKind {
    pub const ALL: [Self; 3] = [Self::General, Self::Officer, Self::ShortTerm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Officer => "officer",
            Self::ShortTerm => "short_term",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "officer" => Some(Self::Officer),
            "short_term" | "short-term" => Some(Self::ShortTerm),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "一般退職手当等",
            Self::Officer => "特定役員退職手当等（勤続5年以下）",
            Self::ShortTerm => "短期退職手当等（勤続5年以下）",
        }
    }
}

/// Rates in force for one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetirementTaxRates {
    pub tax_year: i32,
    pub label: &'static str,
    pub brackets: &'static [RateBracket],
    pub reconstruction_tax_rate: Decimal,
    pub municipal_tax_rate: Decimal,
    pub prefectural_tax_rate: Decimal,
}

/// 所得税の速算表, unchanged for 2024 and 2025.
pub const INCOME_TAX_BRACKETS: [RateBracket; 7] = [
    RateBracket::new(Some(1_950_000), dec!(0.05), 0),
    RateBracket::new(Some(3_300_000), dec!(0.10), 97_500),
    RateBracket::new(Some(6_950_000), dec!(0.20), 427_500),
    RateBracket::new(Some(9_000_000), dec!(0.23), 636_000),
    RateBracket::new(Some(18_000_000), dec!(0.33), 1_536_000),
    RateBracket::new(Some(40_000_000), dec!(0.40), 2_796_000),
    RateBracket::new(None, dec!(0.45), 4_796_000),
];

static RETIREMENT_TAX_RATES: [RetirementTaxRates; 2] = [
    RetirementTaxRates {
        tax_year: 2024,
        label: "令和6年（2024年）",
        brackets: &INCOME_TAX_BRACKETS,
        reconstruction_tax_rate: dec!(0.021),
        municipal_tax_rate: dec!(0.06),
        prefectural_tax_rate: dec!(0.04),
    },
    RetirementTaxRates {
        tax_year: 2025,
        label: "令和7年（2025年）",
        brackets: &INCOME_TAX_BRACKETS,
        reconstruction_tax_rate: dec!(0.021),
        municipal_tax_rate: dec!(0.06),
        prefectural_tax_rate: dec!(0.04),
    },
];

/// Latest year with published rates.
pub const DEFAULT_TAX_YEAR: i32 = 2025;

impl RetirementTaxRates {
    pub fn for_year(tax_year: i32) -> Option<&'static Self> {
        RETIREMENT_TAX_RATES.iter().find(|r| r.tax_year == tax_year)
    }

    pub fn available_years() -> Vec<i32> {
        RETIREMENT_TAX_RATES.iter().map(|r| r.tax_year).collect()
    }

    pub fn table(&self) -> BracketTable {
        BracketTable::from_published(self.brackets)
    }
}

/// Officer allowance multipliers (功績倍率) commonly used as presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficerPreset {
    pub label: &'static str,
    pub multiplier: Decimal,
}

pub const OFFICER_PRESETS: [OfficerPreset; 5] = [
    OfficerPreset {
        label: "社長",
        multiplier: dec!(3.0),
    },
    OfficerPreset {
        label: "専務取締役",
        multiplier: dec!(2.5),
    },
    OfficerPreset {
        label: "常務取締役",
        multiplier: dec!(2.5),
    },
    OfficerPreset {
        label: "取締役",
        multiplier: dec!(2.0),
    },
    OfficerPreset {
        label: "監査役",
        multiplier: dec!(2.0),
    },
];

impl OfficerPreset {
    /// Finds a preset by its Japanese label.
    pub fn find(label: &str) -> Option<Self> {
        OFFICER_PRESETS.iter().copied().find(|p| p.label == label)
    }
}

/// An officer allowance ceiling and the figures it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerLimit {
    pub monthly_compensation: u64,
    pub multiplier: Decimal,
    pub service_years: u32,
    pub limit: u64,
}

impl OfficerLimit {
    pub fn new(
        monthly_compensation: u64,
        multiplier: Decimal,
        service_years: u32,
    ) -> Result<Self, RetirementTaxError> {
        Ok(Self {
            monthly_compensation,
            multiplier,
            service_years,
            limit: officer_allowance_limit(monthly_compensation, multiplier, service_years)?,
        })
    }

    /// How far `amount` exceeds the ceiling; zero when within it.
    pub fn excess(
        &self,
        amount: u64,
    ) -> u64 {
        amount.saturating_sub(self.limit)
    }
}

/// Counts years of service between two dates.
///
/// Any partial year rounds up and the minimum is one year. Returns zero
/// when `end` is not after `start`.
pub fn service_years(
    start: NaiveDate,
    end: NaiveDate,
) -> u32 {
    if end <= start {
        return 0;
    }

    let mut years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    if anniversary(start, years).is_some_and(|date| end > date) {
        years += 1;
    }

    years.max(1).unsigned_abs()
}

/// `start` moved forward by `years`; 29 February lands on 1 March in
/// common years.
fn anniversary(
    start: NaiveDate,
    years: i32,
) -> Option<NaiveDate> {
    let year = start.year() + years;
    NaiveDate::from_ymd_opt(year, start.month(), start.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Retirement income deduction for the given years of service.
pub fn retirement_deduction(
    service_years: u32,
    is_disability: bool,
) -> u64 {
    if service_years == 0 {
        return 0;
    }

    let years = u64::from(service_years);
    let mut deduction = if years <= 20 {
        (400_000 * years).max(800_000)
    } else {
        8_000_000 + 700_000 * (years - 20)
    };

    if is_disability {
        deduction += 1_000_000;
    }

    deduction
}

/// Taxable retirement income, truncated to 1,000 yen.
///
/// Officers are taxed on the whole excess over the deduction. Short-term
/// allowances are halved only on the first 3,000,000 yen of excess.
pub fn taxable_retirement_income(
    amount: u64,
    deduction: u64,
    kind: RetirementKind,
) -> u64 {
    let excess = amount.saturating_sub(deduction);

    let taxable = match kind {
        RetirementKind::General => excess / 2,
        RetirementKind::Officer => excess,
        RetirementKind::ShortTerm if excess <= 3_000_000 => excess / 2,
        RetirementKind::ShortTerm => 1_500_000 + (excess - 3_000_000),
    };

    floor_to_unit(taxable, 1_000)
}

/// Ceiling for an officer's allowance: monthly pay × multiplier × years.
pub fn officer_allowance_limit(
    monthly_compensation: u64,
    multiplier: Decimal,
    service_years: u32,
) -> Result<u64, RetirementTaxError> {
    let limit = Decimal::from(monthly_compensation)
        .checked_mul(multiplier)
        .and_then(|v| v.checked_mul(Decimal::from(service_years)))
        .ok_or(ProgressiveTaxError::AmountOverflow)?;

    floor_to_u64(limit).ok_or_else(|| ProgressiveTaxError::AmountOverflow.into())
}

/// Input values for the retirement worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementTaxInput {
    /// Allowance paid, in yen.
    pub amount: u64,
    pub service_years: u32,
    pub kind: RetirementKind,
    /// Retirement caused by disability adds 1,000,000 yen to the deduction.
    pub is_disability: bool,
}

/// Result of the retirement worksheet with every intermediate figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementTaxResult {
    pub tax_year: i32,
    pub kind: RetirementKind,
    pub is_disability: bool,
    pub service_years: u32,
    pub amount: u64,
    pub deduction: u64,
    pub taxable_income: u64,
    pub income_tax: u64,
    pub reconstruction_tax: u64,
    pub municipal_tax: u64,
    pub prefectural_tax: u64,
    pub resident_tax: u64,
    pub total_tax: u64,
    pub net_amount: u64,
    /// Total tax divided by the allowance.
    pub effective_rate: Decimal,
}

/// Calculator for retirement allowance taxes under one year's rates.
#[derive(Debug, Clone)]
pub struct RetirementTaxWorksheet<'a> {
    rates: &'a RetirementTaxRates,
    table: BracketTable,
}

impl<'a> RetirementTaxWorksheet<'a> {
    pub fn new(rates: &'a RetirementTaxRates) -> Self {
        Self {
            rates,
            table: rates.table(),
        }
    }

    /// Replaces the income tax table, keeping the year's other rates.
    pub fn with_table(
        mut self,
        table: BracketTable,
    ) -> Self {
        self.table = table;
        self
    }

    /// Looks up the rates for `tax_year` and builds a worksheet over them.
    pub fn for_year(tax_year: i32) -> Result<RetirementTaxWorksheet<'static>, RetirementTaxError> {
        RetirementTaxRates::for_year(tax_year)
            .map(RetirementTaxWorksheet::new)
            .ok_or(RetirementTaxError::UnknownTaxYear(tax_year))
    }

    /// Runs every step of the worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`RetirementTaxError`] if the tax table lookup fails or a
    /// figure overflows.
    pub fn calculate(
        &self,
        input: &RetirementTaxInput,
    ) -> Result<RetirementTaxResult, RetirementTaxError> {
        let deduction = retirement_deduction(input.service_years, input.is_disability);
        let taxable_income = taxable_retirement_income(input.amount, deduction, input.kind);
        let income_tax = self.income_tax(taxable_income)?;
        let reconstruction_tax = self.reconstruction_tax(income_tax)?;
        let (municipal_tax, prefectural_tax) = self.resident_tax(taxable_income)?;
        let resident_tax = municipal_tax + prefectural_tax;
        let total_tax = income_tax + reconstruction_tax + resident_tax;

        Ok(RetirementTaxResult {
            tax_year: self.rates.tax_year,
            kind: input.kind,
            is_disability: input.is_disability,
            service_years: input.service_years,
            amount: input.amount,
            deduction,
            taxable_income,
            income_tax,
            reconstruction_tax,
            municipal_tax,
            prefectural_tax,
            resident_tax,
            total_tax,
            net_amount: input.amount.saturating_sub(total_tax),
            effective_rate: ratio(total_tax, input.amount),
        })
    }

    /// Calculates several plans side by side (案①, 案②, …).
    pub fn compare(
        &self,
        plans: &[RetirementTaxInput],
    ) -> Result<Vec<RetirementTaxResult>, RetirementTaxError> {
        plans.iter().map(|plan| self.calculate(plan)).collect()
    }

    /// Income tax, truncated to 100 yen.
    fn income_tax(
        &self,
        taxable_income: u64,
    ) -> Result<u64, ProgressiveTaxError> {
        let tax = compute_tax(taxable_income, 0, &self.table)?;
        Ok(floor_to_unit(tax, 100))
    }

    fn reconstruction_tax(
        &self,
        income_tax: u64,
    ) -> Result<u64, ProgressiveTaxError> {
        floor_to_u64(Decimal::from(income_tax) * self.rates.reconstruction_tax_rate)
            .ok_or(ProgressiveTaxError::AmountOverflow)
    }

    /// Municipal and prefectural shares, each truncated to 100 yen.
    fn resident_tax(
        &self,
        taxable_income: u64,
    ) -> Result<(u64, u64), ProgressiveTaxError> {
        let share = |rate: Decimal| {
            floor_to_u64(Decimal::from(taxable_income) * rate)
                .map(|v| floor_to_unit(v, 100))
                .ok_or(ProgressiveTaxError::AmountOverflow)
        };

        Ok((
            share(self.rates.municipal_tax_rate)?,
            share(self.rates.prefectural_tax_rate)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn worksheet() -> RetirementTaxWorksheet<'static> {
        RetirementTaxWorksheet::for_year(2025).unwrap()
    }

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(
        amount: u64,
        service_years: u32,
        kind: RetirementKind,
    ) -> RetirementTaxInput {
        RetirementTaxInput {
            amount,
            service_years,
            kind,
            is_disability: false,
        }
    }

    // =========================================================================
    // service_years tests
    // =========================================================================

    #[test]
    fn service_years_counts_exact_years() {
        assert_eq!(service_years(date(2000, 4, 1), date(2025, 4, 1)), 25);
    }

    #[test]
    fn service_years_rounds_partial_year_up() {
        assert_eq!(service_years(date(2000, 4, 1), date(2025, 3, 31)), 25);
        assert_eq!(service_years(date(2000, 4, 1), date(2025, 4, 2)), 26);
    }

    #[test]
    fn service_years_minimum_is_one() {
        assert_eq!(service_years(date(2025, 1, 1), date(2025, 1, 2)), 1);
    }

    #[test]
    fn service_years_zero_when_end_not_after_start() {
        assert_eq!(service_years(date(2025, 1, 1), date(2025, 1, 1)), 0);
        assert_eq!(service_years(date(2025, 1, 2), date(2025, 1, 1)), 0);
    }

    #[test]
    fn service_years_leap_day_anniversary_moves_to_march() {
        assert_eq!(service_years(date(2020, 2, 29), date(2021, 3, 1)), 1);
        assert_eq!(service_years(date(2020, 2, 29), date(2021, 3, 2)), 2);
    }

    // =========================================================================
    // retirement_deduction tests
    // =========================================================================

    #[test]
    fn deduction_has_800k_minimum() {
        assert_eq!(retirement_deduction(1, false), 800_000);
        assert_eq!(retirement_deduction(2, false), 800_000);
        assert_eq!(retirement_deduction(3, false), 1_200_000);
    }

    #[test]
    fn deduction_switches_rate_after_twenty_years() {
        assert_eq!(retirement_deduction(20, false), 8_000_000);
        assert_eq!(retirement_deduction(21, false), 8_700_000);
        assert_eq!(retirement_deduction(38, false), 20_600_000);
    }

    #[test]
    fn deduction_adds_disability_allowance() {
        assert_eq!(retirement_deduction(10, true), 5_000_000);
    }

    #[test]
    fn deduction_is_zero_without_service() {
        assert_eq!(retirement_deduction(0, true), 0);
    }

    // =========================================================================
    // taxable_retirement_income tests
    // =========================================================================

    #[test]
    fn taxable_income_halves_general_allowance() {
        assert_eq!(
            taxable_retirement_income(10_001_999, 8_000_000, RetirementKind::General),
            1_000_000
        );
    }

    #[test]
    fn taxable_income_does_not_halve_officer_allowance() {
        assert_eq!(
            taxable_retirement_income(10_000_000, 2_000_000, RetirementKind::Officer),
            8_000_000
        );
    }

    #[test]
    fn taxable_income_short_term_halves_up_to_three_million() {
        assert_eq!(
            taxable_retirement_income(5_000_000, 2_000_000, RetirementKind::ShortTerm),
            1_500_000
        );
        assert_eq!(
            taxable_retirement_income(10_000_000, 2_000_000, RetirementKind::ShortTerm),
            6_500_000
        );
    }

    #[test]
    fn taxable_income_is_zero_when_deduction_covers_amount() {
        assert_eq!(
            taxable_retirement_income(1_000_000, 2_000_000, RetirementKind::Officer),
            0
        );
    }

    // =========================================================================
    // tax steps
    // =========================================================================

    #[test]
    fn income_tax_truncates_to_hundreds() {
        // 1,000,000 × 5% = 50,000; 2,001,000 × 10% − 97,500 = 102,600
        let ws = worksheet();

        assert_eq!(ws.income_tax(1_000_000), Ok(50_000));
        assert_eq!(ws.income_tax(2_001_000), Ok(102_600));
        assert_eq!(ws.income_tax(0), Ok(0));
    }

    #[test]
    fn reconstruction_tax_truncates_to_yen() {
        assert_eq!(worksheet().reconstruction_tax(102_600), Ok(2_154));
    }

    #[test]
    fn resident_tax_splits_municipal_and_prefectural() {
        assert_eq!(worksheet().resident_tax(1_234_000), Ok((74_000, 49_300)));
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_general_thirty_years() {
        let result = worksheet()
            .calculate(&input(30_000_000, 30, RetirementKind::General))
            .unwrap();

        // deduction 8,000,000 + 700,000 × 10; (30,000,000 − 15,000,000) / 2
        assert_eq!(result.deduction, 15_000_000);
        assert_eq!(result.taxable_income, 7_500_000);
        // 7,500,000 × 23% − 636,000
        assert_eq!(result.income_tax, 1_089_000);
        assert_eq!(result.reconstruction_tax, 22_869);
        assert_eq!(result.municipal_tax, 450_000);
        assert_eq!(result.prefectural_tax, 300_000);
        assert_eq!(result.resident_tax, 750_000);
        assert_eq!(result.total_tax, 1_861_869);
        assert_eq!(result.net_amount, 28_138_131);
    }

    #[test]
    fn calculate_allowance_within_deduction_owes_nothing() {
        let result = worksheet()
            .calculate(&input(8_000_000, 20, RetirementKind::General))
            .unwrap();

        assert_eq!(result.taxable_income, 0);
        assert_eq!(result.total_tax, 0);
        assert_eq!(result.net_amount, 8_000_000);
        assert_eq!(result.effective_rate, Decimal::ZERO);
    }

    #[test]
    fn calculate_officer_is_taxed_on_full_excess() {
        let general = worksheet()
            .calculate(&input(10_000_000, 5, RetirementKind::General))
            .unwrap();
        let officer = worksheet()
            .calculate(&input(10_000_000, 5, RetirementKind::Officer))
            .unwrap();

        assert_eq!(general.taxable_income, 4_000_000);
        assert_eq!(officer.taxable_income, 8_000_000);
        assert!(officer.total_tax > general.total_tax);
    }

    #[test]
    fn compare_keeps_plan_order() {
        let plans = vec![
            input(20_000_000, 10, RetirementKind::General),
            input(20_000_000, 10, RetirementKind::ShortTerm),
        ];

        let results = worksheet().compare(&plans).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind, RetirementKind::General);
        assert_eq!(results[1].kind, RetirementKind::ShortTerm);
    }

    #[test]
    fn for_year_rejects_unknown_year() {
        assert_eq!(
            RetirementTaxWorksheet::for_year(1999).unwrap_err(),
            RetirementTaxError::UnknownTaxYear(1999)
        );
    }

    #[test]
    fn published_table_passes_validation() {
        assert!(BracketTable::new(INCOME_TAX_BRACKETS.to_vec()).is_ok());
        assert_eq!(RetirementTaxRates::available_years(), vec![2024, 2025]);
    }

    #[test]
    fn officer_limit_multiplies_inputs() {
        let president = OFFICER_PRESETS[0];

        assert_eq!(
            officer_allowance_limit(1_000_000, president.multiplier, 20),
            Ok(60_000_000)
        );
    }

    #[test]
    fn officer_limit_reports_excess() {
        let limit = OfficerLimit::new(1_000_000, dec!(3.0), 20).unwrap();

        assert_eq!(limit.limit, 60_000_000);
        assert_eq!(limit.excess(70_000_000), 10_000_000);
        assert_eq!(limit.excess(60_000_000), 0);
        assert_eq!(limit.excess(1_000), 0);
    }

    #[test]
    fn officer_limit_truncates_fractional_yen() {
        let limit = OfficerLimit::new(333_333, dec!(2.5), 3).unwrap();

        // 333,333 × 2.5 × 3 = 2,499,997.5
        assert_eq!(limit.limit, 2_499_997);
    }

    #[test]
    fn officer_preset_lookup_by_label() {
        assert_eq!(OfficerPreset::find("取締役").map(|p| p.multiplier), Some(dec!(2.0)));
        assert_eq!(OfficerPreset::find("会長"), None);
    }

    #[test]
    fn worksheet_with_table_uses_replacement_brackets() {
        let flat = BracketTable::new(vec![RateBracket::new(None, dec!(0.10), 0)]).unwrap();
        let result = worksheet()
            .with_table(flat)
            .calculate(&input(20_000_000, 20, RetirementKind::General))
            .unwrap();

        assert_eq!(result.taxable_income, 6_000_000);
        assert_eq!(result.income_tax, 600_000);
        assert_eq!(result.resident_tax, 600_000);
    }

    #[test]
    fn kind_parse_accepts_both_short_term_spellings() {
        assert_eq!(RetirementKind::parse("short-term"), Some(RetirementKind::ShortTerm));
        assert_eq!(RetirementKind::parse("short_term"), Some(RetirementKind::ShortTerm));
        assert_eq!(RetirementKind::parse("other"), None);
    }
}
