//! Comparing split strategies and building quick-reference listings.
//!
//! A scenario divides a total into equal parts that are each taxed as a
//! separate event (one gift per year, for example). The per-part amount is
//! truncated: any remainder of the division is dropped, never spread over
//! the parts, which keeps the figures identical to the published
//! comparison sheets.

use tracing::debug;

use crate::calculations::common::ratio;
use crate::calculations::progressive::{ProgressiveTaxError, compute_tax};
use crate::models::{BracketTable, CalculationResult, QuickReferenceRow, Scenario};

/// Taxes `total_amount` under each scenario, in the order given.
///
/// # Errors
///
/// Returns [`ProgressiveTaxError::ZeroDivisionCount`] for a scenario that
/// splits into zero parts, and propagates lookup or overflow errors from
/// [`compute_tax`].
pub fn expand_scenarios(
    total_amount: u64,
    basic_deduction: u64,
    table: &BracketTable,
    scenarios: &[Scenario],
) -> Result<Vec<CalculationResult>, ProgressiveTaxError> {
    scenarios
        .iter()
        .map(|scenario| expand_one(total_amount, basic_deduction, table, scenario))
        .collect()
}

fn expand_one(
    total_amount: u64,
    basic_deduction: u64,
    table: &BracketTable,
    scenario: &Scenario,
) -> Result<CalculationResult, ProgressiveTaxError> {
    if scenario.division_count == 0 {
        return Err(ProgressiveTaxError::ZeroDivisionCount {
            scenario: scenario.name.to_string(),
        });
    }
    let divisions = u64::from(scenario.division_count);

    let per_part_amount = total_amount / divisions;
    let per_part_tax = compute_tax(per_part_amount, basic_deduction, table)?;
    let total_tax = per_part_tax
        .checked_mul(divisions)
        .ok_or(ProgressiveTaxError::AmountOverflow)?;

    debug!(
        scenario = %scenario.name,
        per_part_amount,
        per_part_tax,
        total_tax,
        "expanded scenario"
    );

    Ok(CalculationResult {
        scenario_name: scenario.name.to_string(),
        division_count: scenario.division_count,
        per_part_amount,
        per_part_tax,
        total_tax,
        effective_rate: ratio(per_part_tax, per_part_amount),
    })
}

/// Lists the tax on `step, 2 × step, …` up to and including `max_amount`.
///
/// # Errors
///
/// Returns [`ProgressiveTaxError::ZeroStep`] when `step` is zero, and
/// propagates errors from [`compute_tax`].
pub fn quick_reference(
    max_amount: u64,
    step: u64,
    basic_deduction: u64,
    table: &BracketTable,
) -> Result<Vec<QuickReferenceRow>, ProgressiveTaxError> {
    if step == 0 {
        return Err(ProgressiveTaxError::ZeroStep);
    }

    let mut rows = Vec::new();
    let mut amount = step;
    while amount <= max_amount {
        let tax = compute_tax(amount, basic_deduction, table)?;
        rows.push(QuickReferenceRow {
            amount,
            tax,
            effective_rate: ratio(tax, amount),
        });

        match amount.checked_add(step) {
            Some(next) => amount = next,
            None => break,
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert_eq, proptest};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::gift::GIFT_BASIC_DEDUCTION;
    use crate::models::GiftType;

    fn lump_and_two_year() -> Vec<Scenario> {
        vec![Scenario::new("lump", 1), Scenario::new("2-year", 2)]
    }

    // =========================================================================
    // expand_scenarios tests
    // =========================================================================

    #[test]
    fn compares_lump_sum_and_two_year_split() {
        let table = GiftType::General.brackets();

        let results =
            expand_scenarios(10_000_000, GIFT_BASIC_DEDUCTION, &table, &lump_and_two_year())
                .unwrap();

        assert_eq!(
            results,
            vec![
                CalculationResult {
                    scenario_name: "lump".to_string(),
                    division_count: 1,
                    per_part_amount: 10_000_000,
                    per_part_tax: 2_310_000,
                    total_tax: 2_310_000,
                    effective_rate: dec!(0.231),
                },
                CalculationResult {
                    scenario_name: "2-year".to_string(),
                    division_count: 2,
                    per_part_amount: 5_000_000,
                    per_part_tax: 530_000,
                    total_tax: 1_060_000,
                    effective_rate: dec!(0.106),
                },
            ]
        );
    }

    #[test]
    fn keeps_input_order() {
        let table = GiftType::General.brackets();
        let scenarios = vec![
            Scenario::new("four", 4),
            Scenario::new("one", 1),
            Scenario::new("two", 2),
        ];

        let names: Vec<_> = expand_scenarios(20_000_000, GIFT_BASIC_DEDUCTION, &table, &scenarios)
            .unwrap()
            .into_iter()
            .map(|r| r.scenario_name)
            .collect();

        assert_eq!(names, vec!["four", "one", "two"]);
    }

    #[test]
    fn drops_division_remainder() {
        let table = GiftType::General.brackets();

        let results =
            expand_scenarios(10_000_003, GIFT_BASIC_DEDUCTION, &table, &[Scenario::new("4", 4)])
                .unwrap();

        assert_eq!(results[0].per_part_amount, 2_500_000);
    }

    #[test]
    fn zero_per_part_amount_has_zero_rate() {
        let table = GiftType::General.brackets();

        let results = expand_scenarios(1, GIFT_BASIC_DEDUCTION, &table, &[Scenario::new("4", 4)])
            .unwrap();

        assert_eq!(results[0].per_part_amount, 0);
        assert_eq!(results[0].per_part_tax, 0);
        assert_eq!(results[0].effective_rate, Decimal::ZERO);
    }

    #[test]
    fn rejects_zero_division_count() {
        let table = GiftType::General.brackets();

        let err = expand_scenarios(1_000, 0, &table, &[Scenario::new("none", 0)]).unwrap_err();

        assert_eq!(
            err,
            ProgressiveTaxError::ZeroDivisionCount {
                scenario: "none".to_string()
            }
        );
    }

    #[test]
    fn empty_scenario_list_gives_empty_results() {
        let table = GiftType::General.brackets();

        assert_eq!(expand_scenarios(1_000, 0, &table, &[]), Ok(vec![]));
    }

    #[test]
    fn handles_maximum_total() {
        let table = GiftType::General.brackets();

        let results = expand_scenarios(u64::MAX, 0, &table, &[Scenario::new("max", u32::MAX)])
            .unwrap();

        assert!(results[0].total_tax > 0);
        assert_eq!(results[0].per_part_amount, u64::MAX / u64::from(u32::MAX));
    }

    // =========================================================================
    // quick_reference tests
    // =========================================================================

    #[test]
    fn quick_reference_steps_up_to_max() {
        let table = GiftType::Special.brackets();

        let rows = quick_reference(3_000_000, 1_000_000, GIFT_BASIC_DEDUCTION, &table).unwrap();

        assert_eq!(
            rows,
            vec![
                QuickReferenceRow {
                    amount: 1_000_000,
                    tax: 0,
                    effective_rate: Decimal::ZERO,
                },
                QuickReferenceRow {
                    amount: 2_000_000,
                    tax: 90_000,
                    effective_rate: dec!(0.045),
                },
                QuickReferenceRow {
                    amount: 3_000_000,
                    tax: 190_000,
                    effective_rate: ratio(190_000, 3_000_000),
                },
            ]
        );
    }

    #[test]
    fn quick_reference_rejects_zero_step() {
        let table = GiftType::Special.brackets();

        assert_eq!(
            quick_reference(1_000, 0, 0, &table),
            Err(ProgressiveTaxError::ZeroStep)
        );
    }

    #[test]
    fn quick_reference_is_empty_when_max_below_step() {
        let table = GiftType::Special.brackets();

        assert_eq!(quick_reference(999, 1_000, 0, &table), Ok(vec![]));
    }

    proptest! {
        #[test]
        fn single_division_matches_direct_call(amount in 0u64..10_000_000_000) {
            let table = GiftType::General.brackets();
            let results = expand_scenarios(
                amount,
                GIFT_BASIC_DEDUCTION,
                &table,
                &[Scenario::new("lump", 1)],
            )
            .unwrap();

            prop_assert_eq!(
                results[0].total_tax,
                compute_tax(amount, GIFT_BASIC_DEDUCTION, &table).unwrap()
            );
        }
    }
}
