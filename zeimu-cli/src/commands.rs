use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use rust_decimal::Decimal;
use tracing::{debug, info};
use zeimu_core::calculations::scenarios::quick_reference;
use zeimu_core::calculations::{
    GiftTaxSimulator, HeirComposition, InheritanceTaxCalculator, OfficerLimit, RealEstateTaxInput,
    RetirementTaxInput, RetirementTaxRates, RetirementTaxWorksheet, real_estate, retirement,
};
use zeimu_core::input::{InputError, parse_amount};
use zeimu_core::state::{GiftFormState, StateStore};
use zeimu_core::BracketTable;
use zeimu_data::{BracketTableLoader, BracketTableLoaderError, CalculatorConfig, TomlFileStore};

use crate::cli::{
    BracketSource, Command, GiftArgs, GiftTableArgs, HeirArgs, InheritanceArgs,
    InheritanceTableArgs, OfficerLimitArgs, RealEstateArgs, RetirementArgs,
};
use crate::render::{
    DetailedInheritanceReport, GiftReport, InheritanceReport, InheritanceTableReport,
    QuickReferenceReport, RealEstateReport, RetirementReport, render,
};

/// Runs one subcommand and returns what should be printed.
pub fn run(
    command: &Command,
    config: &CalculatorConfig,
) -> Result<String> {
    match command {
        Command::Gift(args) => run_gift(args, config),
        Command::GiftTable(args) => run_gift_table(args, config),
        Command::Retirement(args) => run_retirement(args, config),
        Command::Inheritance(args) => run_inheritance(args, config),
        Command::InheritanceTable(args) => run_inheritance_table(args, config),
        Command::RealEstate(args) => run_real_estate(args),
    }
}

/// Validates an amount field, reporting the form's message.
fn amount(
    field: &str,
    raw: &str,
) -> Result<u64> {
    parse_amount(raw).map_err(|e| anyhow!("{field}: {}", e.user_message()))
}

/// Picks the rate table for a command.
///
/// `--brackets` must contain the table. A `brackets_file` from the config
/// only has to contain the tables it overrides: when it lacks
/// `default_name` and no `--table` was given, `builtin` is used.
fn bracket_table(
    source: &BracketSource,
    config: &CalculatorConfig,
    default_name: &str,
    builtin: impl FnOnce() -> BracketTable,
) -> Result<BracketTable> {
    if let Some(path) = source.brackets.as_deref() {
        return load_table(path, source.table.as_deref().unwrap_or(default_name));
    }
    let Some(path) = config.brackets_file.as_deref() else {
        return Ok(builtin());
    };
    if let Some(name) = source.table.as_deref() {
        return load_table(path, name);
    }

    match BracketTableLoader::load_table(path, default_name) {
        Ok(table) => {
            info!(table = default_name, path = %path.display(), "using rate table from file");
            Ok(table)
        }
        Err(BracketTableLoaderError::TableNotFound(_)) => {
            debug!(
                table = default_name,
                path = %path.display(),
                "configured file has no such table; using built-in"
            );
            Ok(builtin())
        }
        Err(e) => Err(e).with_context(|| {
            format!("cannot load table '{default_name}' from '{}'", path.display())
        }),
    }
}

fn load_table(
    path: &Path,
    name: &str,
) -> Result<BracketTable> {
    let table = BracketTableLoader::load_table(path, name)
        .with_context(|| format!("cannot load table '{name}' from '{}'", path.display()))?;
    info!(table = name, path = %path.display(), "using rate table from file");
    Ok(table)
}

// ─── gift ────────────────────────────────────────────────────────────────────

fn run_gift(
    args: &GiftArgs,
    config: &CalculatorConfig,
) -> Result<String> {
    let store: Option<TomlFileStore<GiftFormState>> = args.state.as_ref().map(TomlFileStore::new);

    let form = match (&args.amount, &store) {
        (Some(raw), _) => GiftFormState::new(
            raw.as_str(),
            args.gift_type.unwrap_or(config.gift.default_type),
        ),
        (None, Some(store)) => {
            let saved = store
                .load()
                .with_context(|| format!("cannot read '{}'", store.path().display()))?
                .ok_or_else(|| anyhow!("贈与額: {}", InputError::Empty.user_message()))?;
            debug!(path = %store.path().display(), "restored form state");
            GiftFormState {
                gift_type: args.gift_type.unwrap_or(saved.gift_type),
                ..saved
            }
        }
        (None, None) => bail!("贈与額: {}", InputError::Empty.user_message()),
    };

    let gift_amount = amount("贈与額", &form.amount_input)?;
    let simulator = GiftTaxSimulator::new(form.gift_type.brackets())
        .with_basic_deduction(config.gift.basic_deduction);

    let patterns = form.evaluate_with(&simulator, |gift_type| {
        bracket_table(
            &args.source,
            config,
            &format!("gift_{}", gift_type.as_str()),
            || gift_type.brackets(),
        )
    })?;

    if let (Some(store), Some(_)) = (&store, &args.amount) {
        store
            .save(&form)
            .with_context(|| format!("cannot write '{}'", store.path().display()))?;
    }

    let report = GiftReport {
        gift_type: form.gift_type,
        amount: gift_amount,
        basic_deduction: simulator.basic_deduction(),
        patterns,
    };
    render(&report, args.format)
}

fn run_gift_table(
    args: &GiftTableArgs,
    config: &CalculatorConfig,
) -> Result<String> {
    let gift_type = args.gift_type.unwrap_or(config.gift.default_type);
    let max = amount("表示上限", &args.max)?;
    let step = amount("刻み", &args.step)?;
    let table = bracket_table(
        &args.source,
        config,
        &format!("gift_{}", gift_type.as_str()),
        || gift_type.brackets(),
    )?;

    let rows = quick_reference(max, step, config.gift.basic_deduction, &table)
        .context("quick-reference calculation failed")?;

    let report = QuickReferenceReport {
        gift_type,
        basic_deduction: config.gift.basic_deduction,
        rows,
    };
    render(&report, args.format)
}

// ─── retirement ──────────────────────────────────────────────────────────────

fn run_retirement(
    args: &RetirementArgs,
    config: &CalculatorConfig,
) -> Result<String> {
    let service_years = match (args.years, args.start, args.end) {
        (Some(years), _, _) => years,
        (None, Some(start), Some(end)) => retirement::service_years(start, end),
        _ => bail!("勤続年数を入力してください。"),
    };
    if service_years == 0 {
        bail!("勤続年数は1年以上を入力してください。");
    }

    let tax_year = args.tax_year.unwrap_or(config.retirement.tax_year);
    let rates = RetirementTaxRates::for_year(tax_year).with_context(|| {
        format!(
            "no retirement rates for {tax_year}; available: {:?}",
            RetirementTaxRates::available_years()
        )
    })?;
    let table = bracket_table(&args.source, config, "income_tax", || rates.table())?;
    let worksheet = RetirementTaxWorksheet::new(rates).with_table(table);

    let plans = args
        .amounts
        .iter()
        .map(|raw| {
            Ok(RetirementTaxInput {
                amount: amount("退職手当等の額", raw)?,
                service_years,
                kind: args.kind,
                is_disability: args.disability,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let results = worksheet
        .compare(&plans)
        .context("retirement tax calculation failed")?;
    let officer_limit = officer_limit(&args.officer, service_years)?;

    render(
        &RetirementReport {
            tax_year,
            plans: results,
            officer_limit,
        },
        args.format,
    )
}

fn officer_limit(
    args: &OfficerLimitArgs,
    service_years: u32,
) -> Result<Option<OfficerLimit>> {
    let Some(raw) = args.monthly.as_deref() else {
        return Ok(None);
    };
    let monthly = amount("最終報酬月額", raw)?;
    let multiplier = match (args.multiplier, args.preset) {
        (Some(multiplier), _) => multiplier,
        (None, Some(preset)) => preset.multiplier,
        (None, None) => retirement::OFFICER_PRESETS[0].multiplier,
    };
    if multiplier <= Decimal::ZERO {
        bail!("功績倍率は0より大きい値を入力してください。");
    }

    let limit = OfficerLimit::new(monthly, multiplier, service_years)
        .context("officer limit calculation failed")?;
    debug!(limit = limit.limit, %multiplier, "officer allowance limit");
    Ok(Some(limit))
}

// ─── inheritance ─────────────────────────────────────────────────────────────

fn composition(args: &HeirArgs) -> Result<HeirComposition> {
    let composition = HeirComposition {
        has_spouse: args.spouse,
        rank: args.rank,
        rank_heirs: args.heirs,
    };
    if composition.statutory_heirs() == 0 {
        bail!("法定相続人がいません。--spouse または --heirs を指定してください。");
    }
    Ok(composition)
}

fn inheritance_calculator(
    source: &BracketSource,
    config: &CalculatorConfig,
) -> Result<InheritanceTaxCalculator> {
    let table = bracket_table(source, config, "inheritance", || {
        InheritanceTaxCalculator::default().table().clone()
    })?;
    Ok(InheritanceTaxCalculator::new(table))
}

fn run_inheritance(
    args: &InheritanceArgs,
    config: &CalculatorConfig,
) -> Result<String> {
    let estate = amount("遺産総額", &args.estate)?;
    let composition = composition(&args.family)?;
    let calculator = inheritance_calculator(&args.source, config)?;

    if let Some(spouse_acquisition) = args.spouse_takes {
        let result = calculator
            .calculate_detailed(estate, &composition, spouse_acquisition)
            .context("inheritance tax calculation failed")?;
        let report = DetailedInheritanceReport {
            composition,
            spouse_acquisition,
            result,
        };
        return render(&report, args.format);
    }

    let result = calculator
        .calculate(estate, &composition)
        .context("inheritance tax calculation failed")?;

    render(&InheritanceReport { composition, result }, args.format)
}

fn run_inheritance_table(
    args: &InheritanceTableArgs,
    config: &CalculatorConfig,
) -> Result<String> {
    let max = amount("表示上限", &args.max)?;
    let composition = composition(&args.family)?;

    let rows = inheritance_calculator(&args.source, config)?
        .quick_reference(&composition, max)
        .context("quick-reference calculation failed")?;

    render(&InheritanceTableReport { composition, rows }, args.format)
}

// ─── real estate ─────────────────────────────────────────────────────────────

fn run_real_estate(args: &RealEstateArgs) -> Result<String> {
    let optional = |field: &str, raw: Option<&str>| -> Result<u64> {
        raw.map_or(Ok(0), |raw| amount(field, raw))
    };
    let land_valuation = optional("土地の評価額", args.land.as_deref())?;
    let building_valuation = optional("建物の評価額", args.building.as_deref())?;
    let building_deduction = match args.deduction.as_deref() {
        Some(raw) => amount("控除額", raw)?,
        None => real_estate::building_acquisition_deduction(
            args.built,
            args.transaction,
            args.residential,
        ),
    };

    let input = RealEstateTaxInput {
        land_valuation,
        building_valuation,
        transaction: args.transaction,
        land_type: args.land_type,
        land_area: args.land_area,
        building_area: args.building_area,
        is_residential: args.residential,
        has_housing_certificate: args.housing_certificate,
        acquisition_deduction: building_deduction,
    };
    let result = real_estate::calculate(&input).context("real estate tax calculation failed")?;

    let report = RealEstateReport {
        transaction: args.transaction,
        building_deduction,
        result,
    };
    render(&report, args.format)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use zeimu_core::GiftType;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../zeimu-data/test-data")
            .join(name)
    }

    #[test]
    fn amount_reports_form_message() {
        let err = amount("贈与額", "０").unwrap_err();

        assert_eq!(err.to_string(), "贈与額: ※金額を正しく入力してください。");
    }

    #[test]
    fn builtin_table_used_without_file() {
        let table = bracket_table(
            &BracketSource::default(),
            &CalculatorConfig::default(),
            "gift_special",
            || GiftType::Special.brackets(),
        )
        .unwrap();

        assert_eq!(table, GiftType::Special.brackets());
    }

    #[test]
    fn configured_file_without_table_falls_back() {
        let config = CalculatorConfig {
            brackets_file: Some(fixture("gift_only.csv")),
            ..CalculatorConfig::default()
        };

        let table = bracket_table(&BracketSource::default(), &config, "inheritance", || {
            InheritanceTaxCalculator::default().table().clone()
        })
        .unwrap();

        assert_eq!(&table, InheritanceTaxCalculator::default().table());
    }

    #[test]
    fn explicit_file_without_table_is_an_error() {
        let source = BracketSource {
            brackets: Some(fixture("gift_only.csv")),
            table: None,
        };

        let err = bracket_table(&source, &CalculatorConfig::default(), "inheritance", || {
            InheritanceTaxCalculator::default().table().clone()
        })
        .unwrap_err();

        assert!(err.to_string().starts_with("cannot load table 'inheritance'"));
    }

    #[test]
    fn named_table_missing_from_configured_file_is_an_error() {
        let config = CalculatorConfig {
            brackets_file: Some(fixture("gift_only.csv")),
            ..CalculatorConfig::default()
        };
        let source = BracketSource {
            brackets: None,
            table: Some("property".to_string()),
        };

        assert!(bracket_table(&source, &config, "gift_general", || GiftType::General.brackets())
            .is_err());
    }

    #[test]
    fn officer_limit_defaults_to_president_multiplier() {
        let args = OfficerLimitArgs {
            monthly: Some("1,000,000".to_string()),
            ..OfficerLimitArgs::default()
        };

        let limit = officer_limit(&args, 20).unwrap().unwrap();

        assert_eq!(limit.limit, 60_000_000);
    }

    #[test]
    fn officer_limit_rejects_non_positive_multiplier() {
        let args = OfficerLimitArgs {
            monthly: Some("1000000".to_string()),
            preset: None,
            multiplier: Some(Decimal::ZERO),
        };

        assert!(officer_limit(&args, 20).is_err());
    }
}
