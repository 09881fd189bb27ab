//! Inheritance tax (相続税), assuming a statutory division.
//!
//! All amounts are in units of 10,000 yen (万円), matching how estates are
//! quoted in consultations. The total tax is computed by splitting the
//! taxable estate by legal shares, taxing each share on the quick-calculation
//! table and summing. [`InheritanceTaxCalculator::calculate`] then applies
//! the spouse reduction on the assumption that the spouse takes exactly
//! their legal share; [`InheritanceTaxCalculator::calculate_detailed`]
//! instead apportions the total by what each heir actually acquires.
//!
//! Ratios are evaluated with integer arithmetic so that a 2/3 share of an
//! amount divisible by three is exact.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{mul_div_floor, ratio};
use crate::calculations::progressive::{ProgressiveTaxError, compute_tax};
use crate::models::{BracketTable, RateBracket};

/// Fixed part of the basic deduction (3,000万円).
pub const INHERITANCE_BASE_DEDUCTION: u64 = 3_000;

/// Basic deduction added per statutory heir (600万円).
pub const INHERITANCE_DEDUCTION_PER_HEIR: u64 = 600;

/// The spouse's acquisitions are tax free up to the larger of their legal
/// share and this amount (1億6,000万円).
pub const SPOUSE_DEDUCTION_LIMIT: u64 = 16_000;

/// First estate value listed in the quick-reference table (5,000万円).
pub const TABLE_MIN_ESTATE: u64 = 5_000;

/// Distance between quick-reference rows (500万円).
pub const TABLE_STEP: u64 = 500;

/// Default last row of the quick-reference table (10億円).
pub const TABLE_DEFAULT_MAX_ESTATE: u64 = 100_000;

/// 相続税の速算表, in 万円.
pub const INHERITANCE_BRACKETS: [RateBracket; 8] = [
    RateBracket::new(Some(1_000), dec!(0.10), 0),
    RateBracket::new(Some(3_000), dec!(0.15), 50),
    RateBracket::new(Some(5_000), dec!(0.20), 200),
    RateBracket::new(Some(10_000), dec!(0.30), 700),
    RateBracket::new(Some(20_000), dec!(0.40), 1_700),
    RateBracket::new(Some(30_000), dec!(0.45), 2_700),
    RateBracket::new(Some(60_000), dec!(0.50), 4_200),
    RateBracket::new(None, dec!(0.55), 7_200),
];

/// Order of heirs besides the spouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeirRank {
    #[default]
    None,
    /// 第1順位: children (and their representatives).
    Children,
    /// 第2順位: lineal ascendants.
    Ascendants,
    /// 第3順位: siblings. Their tax carries a 20% surcharge.
    Siblings,
}

impl HeirRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Children => "children",
            Self::Ascendants => "ascendants",
            Self::Siblings => "siblings",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "children" | "rank1" => Some(Self::Children),
            "ascendants" | "rank2" => Some(Self::Ascendants),
            "siblings" | "rank3" => Some(Self::Siblings),
            _ => None,
        }
    }
}

/// The kind of heir a breakdown row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeirKind {
    Spouse,
    Child,
    Parent,
    Sibling,
}

impl HeirKind {
    fn for_rank(rank: HeirRank) -> Self {
        match rank {
            HeirRank::Children => Self::Child,
            HeirRank::Ascendants => Self::Parent,
            HeirRank::None | HeirRank::Siblings => Self::Sibling,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spouse => "配偶者",
            Self::Child => "子",
            Self::Parent => "親",
            Self::Sibling => "兄弟姉妹",
        }
    }

    /// `子` for a lone heir, `子1`, `子2`, … when there are several.
    fn numbered_label(
        &self,
        index: u32,
        count: u32,
    ) -> String {
        if count <= 1 {
            self.label().to_string()
        } else {
            format!("{}{}", self.label(), index + 1)
        }
    }
}

/// How much of the estate the spouse actually takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum SpouseAcquisition {
    /// Exactly the legal share.
    #[default]
    Legal,
    /// Up to [`SPOUSE_DEDUCTION_LIMIT`], capped at the estate.
    UpToLimit,
    /// A given amount in 万円, capped at the estate.
    Custom(u64),
}

/// Who inherits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeirComposition {
    pub has_spouse: bool,
    pub rank: HeirRank,
    /// Statutory heirs in `rank`, representatives included.
    pub rank_heirs: u32,
}

impl HeirComposition {
    /// The rank that actually inherits; a rank with nobody in it does not.
    fn effective_rank(&self) -> HeirRank {
        if self.rank_heirs == 0 {
            HeirRank::None
        } else {
            self.rank
        }
    }

    fn rank_heirs(&self) -> u32 {
        match self.effective_rank() {
            HeirRank::None => 0,
            _ => self.rank_heirs,
        }
    }

    pub fn statutory_heirs(&self) -> u32 {
        u32::from(self.has_spouse) + self.rank_heirs()
    }

    /// Basic deduction in 万円.
    pub fn basic_deduction(&self) -> u64 {
        INHERITANCE_BASE_DEDUCTION
            + INHERITANCE_DEDUCTION_PER_HEIR * u64::from(self.statutory_heirs())
    }

    /// Legal shares of the spouse and of the rank as a whole.
    pub fn legal_shares(&self) -> (Share, Share) {
        if !self.has_spouse {
            return (Share::NONE, Share::ALL);
        }
        match self.effective_rank() {
            HeirRank::None => (Share::ALL, Share::NONE),
            HeirRank::Children => (Share::new(1, 2), Share::new(1, 2)),
            HeirRank::Ascendants => (Share::new(2, 3), Share::new(1, 3)),
            HeirRank::Siblings => (Share::new(3, 4), Share::new(1, 4)),
        }
    }
}

/// A fractional share kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub numerator: u64,
    pub denominator: u64,
}

impl Share {
    pub const NONE: Self = Self::new(0, 1);
    pub const ALL: Self = Self::new(1, 1);

    pub const fn new(
        numerator: u64,
        denominator: u64,
    ) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// `floor(amount × share)`.
    pub fn of(
        &self,
        amount: u64,
    ) -> Result<u64, ProgressiveTaxError> {
        mul_div_floor(amount, self.numerator, self.denominator)
            .ok_or(ProgressiveTaxError::AmountOverflow)
    }
}

/// Totals for one estate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceTaxResult {
    pub estate_value: u64,
    pub basic_deduction: u64,
    pub taxable_amount: u64,
    pub total_tax: u64,
    pub tax_after_spouse_deduction: u64,
    /// Percent of the estate.
    pub effective_tax_rate: Decimal,
    pub effective_tax_rate_after_spouse: Decimal,
}

/// One heir's line in the detailed calculation, in 万円.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeirTaxBreakdown {
    pub label: String,
    pub kind: HeirKind,
    pub legal_share: Share,
    /// Legal share of the taxable estate.
    pub legal_share_amount: u64,
    /// Tax on `legal_share_amount`; these sum to the total tax.
    pub tax_on_share: u64,
    /// What the heir actually takes from the estate.
    pub acquisition_amount: u64,
    /// The total tax apportioned by acquisition.
    pub proportional_tax: u64,
    /// 20% addition for siblings.
    pub surcharge: u64,
    pub spouse_deduction: u64,
    pub final_tax: u64,
}

impl HeirTaxBreakdown {
    fn new(
        label: String,
        kind: HeirKind,
        legal_share: Share,
        legal_share_amount: u64,
        tax_on_share: u64,
    ) -> Self {
        Self {
            label,
            kind,
            legal_share,
            legal_share_amount,
            tax_on_share,
            acquisition_amount: 0,
            proportional_tax: 0,
            surcharge: 0,
            spouse_deduction: 0,
            final_tax: 0,
        }
    }
}

/// How the spouse reduction (配偶者の税額軽減) was worked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseDeductionDetail {
    pub acquisition_amount: u64,
    /// Legal share of the whole estate.
    pub legal_share_amount: u64,
    /// Larger of `legal_share_amount` and [`SPOUSE_DEDUCTION_LIMIT`].
    pub deduction_limit: u64,
    pub tax_before_deduction: u64,
    pub actual_deduction: u64,
}

/// Per-heir result for one estate value and spouse acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedInheritanceTaxResult {
    pub estate_value: u64,
    pub basic_deduction: u64,
    pub taxable_amount: u64,
    pub total_tax: u64,
    pub heirs: Vec<HeirTaxBreakdown>,
    pub spouse_deduction: Option<SpouseDeductionDetail>,
    pub total_final_tax: u64,
    /// Percent of the estate.
    pub effective_tax_rate: Decimal,
}

/// Inheritance tax calculator over a swappable rate table.
#[derive(Debug, Clone)]
pub struct InheritanceTaxCalculator {
    table: BracketTable,
}

impl Default for InheritanceTaxCalculator {
    fn default() -> Self {
        Self::new(BracketTable::from_published(&INHERITANCE_BRACKETS))
    }
}

impl InheritanceTaxCalculator {
    pub fn new(table: BracketTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    /// Total inheritance tax on `estate_value` (万円) for `composition`.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgressiveTaxError`] from the bracket lookup or on
    /// overflow.
    pub fn calculate(
        &self,
        estate_value: u64,
        composition: &HeirComposition,
    ) -> Result<InheritanceTaxResult, ProgressiveTaxError> {
        let heirs = composition.statutory_heirs();
        let basic_deduction = composition.basic_deduction();
        let taxable_amount = estate_value.saturating_sub(basic_deduction);

        if taxable_amount == 0 || heirs == 0 {
            return Ok(InheritanceTaxResult {
                estate_value,
                basic_deduction,
                taxable_amount: 0,
                total_tax: 0,
                tax_after_spouse_deduction: 0,
                effective_tax_rate: Decimal::ZERO,
                effective_tax_rate_after_spouse: Decimal::ZERO,
            });
        }

        let (spouse_share, others_share) = composition.legal_shares();
        let mut total_tax = 0u64;

        if !spouse_share.is_zero() {
            let spouse_amount = spouse_share.of(taxable_amount)?;
            total_tax += compute_tax(spouse_amount, 0, &self.table)?;
        }

        let rank_heirs = u64::from(composition.rank_heirs());
        if !others_share.is_zero() && rank_heirs > 0 {
            let per_person_amount = others_share.of(taxable_amount)? / rank_heirs;
            let per_person_tax = compute_tax(per_person_amount, 0, &self.table)?;
            let mut others_tax = per_person_tax
                .checked_mul(rank_heirs)
                .ok_or(ProgressiveTaxError::AmountOverflow)?;

            if composition.effective_rank() == HeirRank::Siblings {
                others_tax = mul_div_floor(others_tax, 6, 5)
                    .ok_or(ProgressiveTaxError::AmountOverflow)?;
            }

            total_tax = total_tax
                .checked_add(others_tax)
                .ok_or(ProgressiveTaxError::AmountOverflow)?;
        }

        let tax_after_spouse_deduction = if composition.has_spouse {
            let spouse_acquisition = spouse_share.of(taxable_amount)?;
            let reduction = mul_div_floor(total_tax, spouse_acquisition, taxable_amount)
                .ok_or(ProgressiveTaxError::AmountOverflow)?;
            total_tax.saturating_sub(reduction)
        } else {
            total_tax
        };

        Ok(InheritanceTaxResult {
            estate_value,
            basic_deduction,
            taxable_amount,
            total_tax,
            tax_after_spouse_deduction,
            effective_tax_rate: percent(total_tax, estate_value),
            effective_tax_rate_after_spouse: percent(tax_after_spouse_deduction, estate_value),
        })
    }

    /// Rows of the 相続税早見表: [`TABLE_MIN_ESTATE`], then every
    /// [`TABLE_STEP`] up to and including `max_estate`.
    ///
    /// Returns no rows when `max_estate` is below the first row.
    pub fn quick_reference(
        &self,
        composition: &HeirComposition,
        max_estate: u64,
    ) -> Result<Vec<InheritanceTaxResult>, ProgressiveTaxError> {
        let mut rows = Vec::new();
        let mut estate = TABLE_MIN_ESTATE;
        while estate <= max_estate {
            rows.push(self.calculate(estate, composition)?);

            match estate.checked_add(TABLE_STEP) {
                Some(next) => estate = next,
                None => break,
            }
        }

        Ok(rows)
    }

    /// Total tax apportioned to each heir by what they actually acquire.
    ///
    /// The total is computed on legal shares exactly as in
    /// [`calculate`](Self::calculate). The spouse takes the amount chosen by
    /// `spouse_acquisition` and the rest of the estate is split evenly
    /// between the other heirs; without a spouse everyone takes an equal
    /// part. Siblings then add 20% and the spouse reduction is applied to
    /// the spouse's line.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgressiveTaxError`] from the bracket lookup or on
    /// overflow.
    pub fn calculate_detailed(
        &self,
        estate_value: u64,
        composition: &HeirComposition,
        spouse_acquisition: SpouseAcquisition,
    ) -> Result<DetailedInheritanceTaxResult, ProgressiveTaxError> {
        let basic_deduction = composition.basic_deduction();
        let taxable_amount = estate_value.saturating_sub(basic_deduction);

        if taxable_amount == 0 || composition.statutory_heirs() == 0 {
            return Ok(DetailedInheritanceTaxResult {
                estate_value,
                basic_deduction,
                taxable_amount: 0,
                total_tax: 0,
                heirs: Vec::new(),
                spouse_deduction: None,
                total_final_tax: 0,
                effective_tax_rate: Decimal::ZERO,
            });
        }

        let (spouse_share, others_share) = composition.legal_shares();
        let mut heirs = Vec::new();

        if composition.has_spouse {
            let amount = spouse_share.of(taxable_amount)?;
            heirs.push(HeirTaxBreakdown::new(
                HeirKind::Spouse.label().to_string(),
                HeirKind::Spouse,
                spouse_share,
                amount,
                compute_tax(amount, 0, &self.table)?,
            ));
        }

        let rank_heirs = composition.rank_heirs();
        if !others_share.is_zero() && rank_heirs > 0 {
            let count = u64::from(rank_heirs);
            let kind = HeirKind::for_rank(composition.effective_rank());
            let share = Share::new(others_share.numerator, others_share.denominator * count);
            let amount = others_share.of(taxable_amount)? / count;
            let tax = compute_tax(amount, 0, &self.table)?;

            for i in 0..rank_heirs {
                heirs.push(HeirTaxBreakdown::new(
                    kind.numbered_label(i, rank_heirs),
                    kind,
                    share,
                    amount,
                    tax,
                ));
            }
        }

        let total_tax: u64 = heirs.iter().map(|h| h.tax_on_share).sum();

        let spouse_amount = match (composition.has_spouse, spouse_acquisition) {
            (false, _) => 0,
            (true, SpouseAcquisition::Legal) => spouse_share.of(estate_value)?,
            (true, SpouseAcquisition::UpToLimit) => estate_value.min(SPOUSE_DEDUCTION_LIMIT),
            (true, SpouseAcquisition::Custom(amount)) => amount.min(estate_value),
        };
        let others = heirs.iter().filter(|h| h.kind != HeirKind::Spouse).count() as u64;
        let per_other = (estate_value - spouse_amount)
            .checked_div(others)
            .unwrap_or(0);

        for heir in &mut heirs {
            heir.acquisition_amount = if heir.kind == HeirKind::Spouse {
                spouse_amount
            } else {
                per_other
            };
            heir.proportional_tax = mul_div_floor(total_tax, heir.acquisition_amount, estate_value)
                .ok_or(ProgressiveTaxError::AmountOverflow)?;
            if heir.kind == HeirKind::Sibling {
                heir.surcharge = heir.proportional_tax / 5;
            }
        }

        let mut spouse_deduction = None;
        if let Some(spouse) = heirs.iter_mut().find(|h| h.kind == HeirKind::Spouse) {
            let legal_share_amount = spouse_share.of(estate_value)?;
            let deduction_limit = legal_share_amount.max(SPOUSE_DEDUCTION_LIMIT);
            let tax_before_deduction = spouse.proportional_tax + spouse.surcharge;

            let actual_deduction = if spouse.acquisition_amount <= deduction_limit {
                tax_before_deduction
            } else {
                mul_div_floor(total_tax, deduction_limit, estate_value)
                    .ok_or(ProgressiveTaxError::AmountOverflow)?
                    .min(tax_before_deduction)
            };
            spouse.spouse_deduction = actual_deduction;

            spouse_deduction = Some(SpouseDeductionDetail {
                acquisition_amount: spouse.acquisition_amount,
                legal_share_amount,
                deduction_limit,
                tax_before_deduction,
                actual_deduction,
            });
        }

        for heir in &mut heirs {
            heir.final_tax =
                (heir.proportional_tax + heir.surcharge).saturating_sub(heir.spouse_deduction);
        }
        let total_final_tax: u64 = heirs.iter().map(|h| h.final_tax).sum();

        Ok(DetailedInheritanceTaxResult {
            estate_value,
            basic_deduction,
            taxable_amount,
            total_tax,
            heirs,
            spouse_deduction,
            total_final_tax,
            effective_tax_rate: percent(total_final_tax, estate_value),
        })
    }
}

fn percent(
    tax: u64,
    estate_value: u64,
) -> Decimal {
    ratio(tax, estate_value) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn composition(
        has_spouse: bool,
        rank: HeirRank,
        rank_heirs: u32,
    ) -> HeirComposition {
        HeirComposition {
            has_spouse,
            rank,
            rank_heirs,
        }
    }

    #[test]
    fn published_table_passes_validation() {
        assert!(BracketTable::new(INHERITANCE_BRACKETS.to_vec()).is_ok());
    }

    #[test]
    fn basic_deduction_counts_spouse_and_rank() {
        assert_eq!(composition(true, HeirRank::Children, 2).basic_deduction(), 4_800);
        assert_eq!(composition(false, HeirRank::Children, 1).basic_deduction(), 3_600);
    }

    #[test]
    fn empty_rank_is_ignored() {
        let heirs = composition(true, HeirRank::Siblings, 0);

        assert_eq!(heirs.statutory_heirs(), 1);
        assert_eq!(heirs.legal_shares(), (Share::ALL, Share::NONE));
    }

    #[test]
    fn spouse_and_two_children_on_one_hundred_million() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(true, HeirRank::Children, 2))
            .unwrap();

        assert_eq!(
            result,
            InheritanceTaxResult {
                estate_value: 10_000,
                basic_deduction: 4_800,
                taxable_amount: 5_200,
                total_tax: 630,
                tax_after_spouse_deduction: 315,
                effective_tax_rate: dec!(6.3),
                effective_tax_rate_after_spouse: dec!(3.15),
            }
        );
    }

    #[test]
    fn single_child_on_one_hundred_million() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(false, HeirRank::Children, 1))
            .unwrap();

        assert_eq!(result.taxable_amount, 6_400);
        assert_eq!(result.total_tax, 1_220);
        assert_eq!(result.tax_after_spouse_deduction, 1_220);
    }

    #[test]
    fn spouse_with_parents_uses_two_thirds_share() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(true, HeirRank::Ascendants, 2))
            .unwrap();

        // spouse 3,466 → 493; each parent 866 → 86
        assert_eq!(result.total_tax, 665);
        assert_eq!(result.tax_after_spouse_deduction, 222);
    }

    #[test]
    fn siblings_pay_twenty_percent_surcharge() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(false, HeirRank::Siblings, 2))
            .unwrap();

        // each sibling 2,900 → 385; 770 × 1.2
        assert_eq!(result.total_tax, 924);
    }

    #[test]
    fn spouse_alone_owes_nothing_after_reduction() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(true, HeirRank::None, 0))
            .unwrap();

        assert_eq!(result.total_tax, 1_220);
        assert_eq!(result.tax_after_spouse_deduction, 0);
    }

    #[test]
    fn estate_within_basic_deduction_owes_nothing() {
        let result = InheritanceTaxCalculator::default()
            .calculate(4_800, &composition(true, HeirRank::Children, 2))
            .unwrap();

        assert_eq!(result.taxable_amount, 0);
        assert_eq!(result.total_tax, 0);
        assert_eq!(result.effective_tax_rate, Decimal::ZERO);
    }

    #[test]
    fn no_heirs_owes_nothing() {
        let result = InheritanceTaxCalculator::default()
            .calculate(10_000, &composition(false, HeirRank::None, 0))
            .unwrap();

        assert_eq!(result.total_tax, 0);
    }

    #[test]
    fn quick_reference_starts_at_fifty_million_in_five_million_steps() {
        let rows = InheritanceTaxCalculator::default()
            .quick_reference(&composition(true, HeirRank::Children, 2), 10_000)
            .unwrap();

        let estates: Vec<u64> = rows.iter().map(|r| r.estate_value).collect();
        assert_eq!(estates.first(), Some(&5_000));
        assert_eq!(estates.last(), Some(&10_000));
        assert_eq!(estates.len(), 11);
        assert_eq!(rows[10].total_tax, 630);
        assert_eq!(rows[10].tax_after_spouse_deduction, 315);
    }

    #[test]
    fn quick_reference_below_first_row_is_empty() {
        let rows = InheritanceTaxCalculator::default()
            .quick_reference(&composition(false, HeirRank::Children, 1), 4_999)
            .unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn detailed_legal_split_with_spouse_and_two_children() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                10_000,
                &composition(true, HeirRank::Children, 2),
                SpouseAcquisition::Legal,
            )
            .unwrap();

        let lines: Vec<(&str, u64, u64, u64, u64)> = result
            .heirs
            .iter()
            .map(|h| {
                (
                    h.label.as_str(),
                    h.tax_on_share,
                    h.acquisition_amount,
                    h.proportional_tax,
                    h.final_tax,
                )
            })
            .collect();

        assert_eq!(result.total_tax, 630);
        assert_eq!(
            lines,
            vec![
                ("配偶者", 340, 5_000, 315, 0),
                ("子1", 145, 2_500, 157, 157),
                ("子2", 145, 2_500, 157, 157),
            ]
        );
        assert_eq!(result.heirs[1].legal_share, Share::new(1, 4));
        assert_eq!(result.total_final_tax, 314);
        assert_eq!(result.effective_tax_rate, dec!(3.14));
    }

    #[test]
    fn detailed_spouse_up_to_limit_is_fully_relieved() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                30_000,
                &composition(true, HeirRank::Children, 1),
                SpouseAcquisition::UpToLimit,
            )
            .unwrap();

        // each legal share 12,900 → 3,460
        assert_eq!(result.total_tax, 6_920);
        assert_eq!(result.heirs[0].acquisition_amount, 16_000);
        assert_eq!(result.heirs[0].proportional_tax, 3_690);
        assert_eq!(result.heirs[0].final_tax, 0);
        assert_eq!(result.heirs[1].label, "子");
        assert_eq!(result.heirs[1].final_tax, 3_229);
        assert_eq!(result.total_final_tax, 3_229);
    }

    #[test]
    fn detailed_spouse_above_limit_is_partly_taxed() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                30_000,
                &composition(true, HeirRank::Children, 1),
                SpouseAcquisition::Custom(20_000),
            )
            .unwrap();

        assert_eq!(
            result.spouse_deduction,
            Some(SpouseDeductionDetail {
                acquisition_amount: 20_000,
                legal_share_amount: 15_000,
                deduction_limit: 16_000,
                tax_before_deduction: 4_613,
                actual_deduction: 3_690,
            })
        );
        assert_eq!(result.heirs[0].final_tax, 923);
        assert_eq!(result.heirs[1].final_tax, 2_306);
        assert_eq!(result.total_final_tax, 3_229);
    }

    #[test]
    fn detailed_custom_amount_is_capped_at_estate() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                10_000,
                &composition(true, HeirRank::Children, 2),
                SpouseAcquisition::Custom(12_000),
            )
            .unwrap();

        assert_eq!(result.heirs[0].acquisition_amount, 10_000);
        assert_eq!(result.heirs[1].acquisition_amount, 0);
        assert_eq!(result.total_final_tax, 0);
    }

    #[test]
    fn detailed_siblings_carry_surcharge() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                10_000,
                &composition(false, HeirRank::Siblings, 2),
                SpouseAcquisition::Legal,
            )
            .unwrap();

        assert_eq!(result.spouse_deduction, None);
        assert!(result.heirs.iter().all(|h| h.kind == HeirKind::Sibling));
        assert_eq!(result.heirs[0].proportional_tax, 385);
        assert_eq!(result.heirs[0].surcharge, 77);
        assert_eq!(result.heirs[0].final_tax, 462);
        assert_eq!(result.total_final_tax, 924);
    }

    #[test]
    fn detailed_within_basic_deduction_has_no_lines() {
        let result = InheritanceTaxCalculator::default()
            .calculate_detailed(
                4_800,
                &composition(true, HeirRank::Children, 2),
                SpouseAcquisition::Legal,
            )
            .unwrap();

        assert!(result.heirs.is_empty());
        assert_eq!(result.total_final_tax, 0);
    }

    #[test]
    fn rank_parse_accepts_aliases() {
        assert_eq!(HeirRank::parse("rank2"), Some(HeirRank::Ascendants));
        assert_eq!(HeirRank::parse("siblings"), Some(HeirRank::Siblings));
        assert_eq!(HeirRank::parse("cousins"), None);
    }
}
