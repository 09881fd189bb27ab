//! Real estate acquisition tax (不動産取得税) and registration and license
//! tax (登録免許税) on a transfer of land and/or a building.
//!
//! Both taxes are flat rates on the assessed value (固定資産税評価額), so
//! unlike the other calculators there is no bracket table here.
//!
//! | Tax | Land | Building |
//! |-----|------|----------|
//! | Acquisition | 3% of the value, halved for residential land, less the housing land reduction | 3% (residential) or 4% of the value less the building deduction |
//! | Registration | value floored to 1,000 yen × rate for the transaction | same, with reduced rates for certified housing |
//!
//! Acquisition tax is never charged on inheritance. Registration tax is
//! truncated to 100 yen with a minimum of 1,000 yen.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{floor_to_u64, floor_to_unit};
use crate::calculations::progressive::ProgressiveTaxError;

/// Land acquisition reduction floor for housing land.
pub const HOUSING_LAND_MIN_REDUCTION: u64 = 45_000;

/// Floor area counted for the housing land reduction is capped here (m²).
pub const HOUSING_LAND_AREA_CAP: Decimal = dec!(200);

/// Smallest registration tax charged.
pub const MIN_REGISTRATION_TAX: u64 = 1_000;

const LAND_ACQUISITION_RATE: Decimal = dec!(0.03);

/// Deduction from a used home's value by construction date, newest first.
const BUILDING_DEDUCTIONS: [((i32, u32, u32), u64); 5] = [
    ((1997, 4, 1), 12_000_000),
    ((1989, 4, 1), 10_000_000),
    ((1985, 7, 1), 4_500_000),
    ((1981, 7, 1), 4_200_000),
    ((1976, 1, 1), 3_500_000),
];

/// How the property changes hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// 売買
    #[default]
    Purchase,
    /// 新築 (first registration of a new building)
    NewBuild,
    /// 相続
    Inheritance,
    /// 贈与
    Gift,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::NewBuild => "new_build",
            Self::Inheritance => "inheritance",
            Self::Gift => "gift",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(Self::Purchase),
            "new_build" | "new-build" => Some(Self::NewBuild),
            "inheritance" => Some(Self::Inheritance),
            "gift" => Some(Self::Gift),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Purchase => "売買 (購入)",
            Self::NewBuild => "新築 (建物の保存登記)",
            Self::Inheritance => "相続",
            Self::Gift => "贈与",
        }
    }

    fn land_registration_rate(&self) -> Decimal {
        match self {
            Self::Purchase => dec!(0.015),
            Self::Inheritance | Self::NewBuild => dec!(0.004),
            Self::Gift => dec!(0.02),
        }
    }

    fn building_registration_rate(
        &self,
        certified_housing: bool,
    ) -> Decimal {
        match (self, certified_housing) {
            (Self::Purchase, true) => dec!(0.003),
            (Self::Purchase, false) => dec!(0.02),
            (Self::NewBuild, true) => dec!(0.0015),
            (Self::NewBuild, false) => dec!(0.004),
            (Self::Inheritance, _) => dec!(0.004),
            (Self::Gift, _) => dec!(0.02),
        }
    }
}

/// Land category for the acquisition tax base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandType {
    /// 宅地: the base is halved.
    #[default]
    Residential,
    Other,
}

impl LandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "residential" => Some(Self::Residential),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// What is being transferred. A zero valuation leaves that part out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealEstateTaxInput {
    pub land_valuation: u64,
    pub building_valuation: u64,
    pub transaction: TransactionType,
    pub land_type: LandType,
    /// Land area in m²; zero skips the housing land reduction.
    pub land_area: Decimal,
    /// Building floor area in m²; zero skips the housing land reduction.
    pub building_area: Decimal,
    /// The building is (or the land carries) a home.
    pub is_residential: bool,
    /// 住宅用家屋証明書 is available.
    pub has_housing_certificate: bool,
    /// Deducted from the building value before acquisition tax; see
    /// [`building_acquisition_deduction`].
    pub acquisition_deduction: u64,
}

/// One tax on one part of the property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Not charged at all (acquisition by inheritance).
    pub exempt: bool,
    pub base: u64,
    pub rate: Decimal,
    /// Tax before `reduction`.
    pub gross_tax: u64,
    pub reduction: u64,
    pub tax: u64,
}

impl TaxLine {
    fn exempt() -> Self {
        Self {
            exempt: true,
            ..Self::default()
        }
    }
}

/// Acquisition and registration tax for land and building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealEstateTaxResult {
    pub land_acquisition: Option<TaxLine>,
    pub land_registration: Option<TaxLine>,
    pub building_acquisition: Option<TaxLine>,
    pub building_registration: Option<TaxLine>,
    pub total_acquisition_tax: u64,
    pub total_registration_tax: u64,
    pub total: u64,
}

/// Building deduction for acquisition tax.
///
/// Only homes qualify. New builds get the full 12,000,000 yen; used homes
/// get the amount in force when they were built, and nothing without a
/// construction date or when built before 1976.
pub fn building_acquisition_deduction(
    built: Option<NaiveDate>,
    transaction: TransactionType,
    is_residential: bool,
) -> u64 {
    if !is_residential {
        return 0;
    }
    if transaction == TransactionType::NewBuild {
        return BUILDING_DEDUCTIONS[0].1;
    }
    let Some(built) = built else {
        return 0;
    };

    let built = (built.year(), built.month(), built.day());
    BUILDING_DEDUCTIONS
        .iter()
        .find(|(since, _)| built >= *since)
        .map_or(0, |(_, deduction)| *deduction)
}

/// Calculates every tax line the input calls for.
///
/// # Errors
///
/// Returns [`ProgressiveTaxError::AmountOverflow`] if a figure does not fit.
pub fn calculate(input: &RealEstateTaxInput) -> Result<RealEstateTaxResult, ProgressiveTaxError> {
    let mut result = RealEstateTaxResult::default();

    if input.land_valuation > 0 {
        result.land_acquisition = Some(land_acquisition(input)?);
        result.land_registration = Some(registration(
            input.land_valuation,
            input.transaction.land_registration_rate(),
        )?);
    }

    if input.building_valuation > 0 {
        result.building_acquisition = Some(building_acquisition(input)?);
        result.building_registration = Some(registration(
            input.building_valuation,
            input
                .transaction
                .building_registration_rate(input.is_residential && input.has_housing_certificate),
        )?);
    }

    let tax = |line: Option<TaxLine>| line.map_or(0, |l| l.tax);
    result.total_acquisition_tax = tax(result.land_acquisition) + tax(result.building_acquisition);
    result.total_registration_tax =
        tax(result.land_registration) + tax(result.building_registration);
    result.total = result.total_acquisition_tax + result.total_registration_tax;

    Ok(result)
}

fn land_acquisition(input: &RealEstateTaxInput) -> Result<TaxLine, ProgressiveTaxError> {
    if input.transaction == TransactionType::Inheritance {
        return Ok(TaxLine::exempt());
    }

    let base = match input.land_type {
        LandType::Residential => input.land_valuation / 2,
        LandType::Other => input.land_valuation,
    };
    let gross_tax = apply_rate(base, LAND_ACQUISITION_RATE)?;

    let reduction = if input.is_residential
        && input.land_area > Decimal::ZERO
        && input.building_area > Decimal::ZERO
    {
        let area = (input.building_area * Decimal::TWO).min(HOUSING_LAND_AREA_CAP);
        let by_area = Decimal::from(base)
            .checked_mul(area)
            .and_then(|v| v.checked_mul(LAND_ACQUISITION_RATE))
            .and_then(|v| v.checked_div(input.land_area))
            .and_then(floor_to_u64)
            .ok_or(ProgressiveTaxError::AmountOverflow)?;
        by_area.max(HOUSING_LAND_MIN_REDUCTION)
    } else {
        0
    };

    Ok(TaxLine {
        exempt: false,
        base,
        rate: LAND_ACQUISITION_RATE,
        gross_tax,
        reduction,
        tax: gross_tax.saturating_sub(reduction),
    })
}

fn building_acquisition(input: &RealEstateTaxInput) -> Result<TaxLine, ProgressiveTaxError> {
    if input.transaction == TransactionType::Inheritance {
        return Ok(TaxLine::exempt());
    }

    let base = input
        .building_valuation
        .saturating_sub(input.acquisition_deduction);
    let rate = if input.is_residential { dec!(0.03) } else { dec!(0.04) };
    let tax = apply_rate(base, rate)?;

    Ok(TaxLine {
        exempt: false,
        base,
        rate,
        gross_tax: tax,
        reduction: 0,
        tax,
    })
}

fn registration(
    valuation: u64,
    rate: Decimal,
) -> Result<TaxLine, ProgressiveTaxError> {
    let base = floor_to_unit(valuation, 1_000);
    let gross_tax = apply_rate(base, rate)?;

    Ok(TaxLine {
        exempt: false,
        base,
        rate,
        gross_tax,
        reduction: 0,
        tax: floor_to_unit(gross_tax, 100).max(MIN_REGISTRATION_TAX),
    })
}

fn apply_rate(
    base: u64,
    rate: Decimal,
) -> Result<u64, ProgressiveTaxError> {
    Decimal::from(base)
        .checked_mul(rate)
        .and_then(floor_to_u64)
        .ok_or(ProgressiveTaxError::AmountOverflow)
}
