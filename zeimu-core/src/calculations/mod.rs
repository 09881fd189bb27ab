//! Tax calculation modules.
//!
//! [`progressive`] holds the quick-calculation engine shared by every
//! calculator; [`scenarios`] layers split comparisons and quick-reference
//! listings on top of it. The gift, retirement and inheritance modules are
//! the individual calculators built from those two pieces. [`real_estate`]
//! stands apart: its taxes are flat rates on assessed values.

pub mod common;
pub mod gift;
pub mod inheritance;
pub mod progressive;
pub mod real_estate;
pub mod retirement;
pub mod scenarios;

pub use gift::{GIFT_BASIC_DEDUCTION, GIFT_PATTERNS, GiftTaxSimulator};
pub use inheritance::{
    DetailedInheritanceTaxResult, HeirComposition, HeirKind, HeirRank, HeirTaxBreakdown,
    InheritanceTaxCalculator, InheritanceTaxResult, SpouseAcquisition, SpouseDeductionDetail,
};
pub use progressive::{ProgressiveTaxError, compute_tax};
pub use real_estate::{LandType, RealEstateTaxInput, RealEstateTaxResult, TransactionType};
pub use retirement::{
    OFFICER_PRESETS, OfficerLimit, OfficerPreset, RetirementKind, RetirementTaxError,
    RetirementTaxInput, RetirementTaxRates, RetirementTaxResult, RetirementTaxWorksheet,
};
pub use scenarios::{expand_scenarios, quick_reference};
