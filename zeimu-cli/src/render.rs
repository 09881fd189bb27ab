//! Text and JSON output for the subcommands.
//!
//! Every report is a plain serializable struct; text output is its
//! `Display` impl and JSON output is `serde_json` over the same struct.

use std::fmt;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use zeimu_core::calculations::real_estate::TaxLine;
use zeimu_core::calculations::{
    DetailedInheritanceTaxResult, HeirComposition, HeirRank, InheritanceTaxResult, OfficerLimit,
    RealEstateTaxResult, RetirementTaxResult, SpouseAcquisition, TransactionType,
};
use zeimu_core::input::{format_amount, format_percent};
use zeimu_core::{CalculationResult, GiftType, QuickReferenceRow};

use crate::cli::OutputFormat;

/// Renders `report` in the requested format.
pub fn render<R>(
    report: &R,
    format: OutputFormat,
) -> anyhow::Result<String>
where
    R: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).context("cannot serialize report"),
    }
}

fn yen(amount: u64) -> String {
    format!("{}円", format_amount(amount))
}

fn man(amount: u64) -> String {
    format!("{}万円", format_amount(amount))
}

// ─── gift ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftReport {
    pub gift_type: GiftType,
    pub amount: u64,
    pub basic_deduction: u64,
    pub patterns: Vec<CalculationResult>,
}

impl GiftReport {
    /// The pattern with the lowest total tax; the earliest one wins ties.
    pub fn cheapest(&self) -> Option<&CalculationResult> {
        self.patterns
            .iter()
            .reduce(|best, r| if r.total_tax < best.total_tax { r } else { best })
    }
}

impl fmt::Display for GiftReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "贈与税シミュレーション（{}）", self.gift_type.label())?;
        writeln!(
            f,
            "贈与総額 {}  基礎控除 {}",
            yen(self.amount),
            yen(self.basic_deduction)
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<8}{:>16}{:>16}{:>16}{:>10}",
            "パターン", "1回あたり贈与額", "1回あたり税額", "合計税額", "実効税率"
        )?;
        for r in &self.patterns {
            writeln!(
                f,
                "{:<8}{:>16}{:>16}{:>16}{:>10}",
                r.scenario_name,
                yen(r.per_part_amount),
                yen(r.per_part_tax),
                yen(r.total_tax),
                format_percent(r.effective_rate)
            )?;
        }

        if let (Some(first), Some(best)) = (self.patterns.first(), self.cheapest()) {
            if best.total_tax < first.total_tax {
                writeln!(f)?;
                writeln!(
                    f,
                    "最も税額が少ないのは{}（{}より {} 少ない）",
                    best.scenario_name,
                    first.scenario_name,
                    yen(first.total_tax - best.total_tax)
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickReferenceReport {
    pub gift_type: GiftType,
    pub basic_deduction: u64,
    pub rows: Vec<QuickReferenceRow>,
}

impl fmt::Display for QuickReferenceReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "贈与税 早見表（{}）", self.gift_type.label())?;
        writeln!(
            f,
            "※基礎控除{}を含んで計算しています。",
            yen(self.basic_deduction)
        )?;
        writeln!(f)?;
        writeln!(f, "{:>16}{:>16}{:>10}", "贈与額", "贈与税額", "実効税率")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>16}{:>16}{:>10}",
                yen(row.amount),
                yen(row.tax),
                format_percent(row.effective_rate)
            )?;
        }
        Ok(())
    }
}

// ─── retirement ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetirementReport {
    pub tax_year: i32,
    pub plans: Vec<RetirementTaxResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_limit: Option<OfficerLimit>,
}

/// 案①, 案②, … then 案11 onwards.
fn plan_label(index: usize) -> String {
    const CIRCLED: [char; 10] = ['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩'];
    match CIRCLED.get(index) {
        Some(c) => format!("案{c}"),
        None => format!("案{}", index + 1),
    }
}

impl fmt::Display for RetirementReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "退職所得の税額計算（{}年分）", self.tax_year)?;
        let Some(first) = self.plans.first() else {
            return Ok(());
        };
        write!(f, "{} / 勤続{}年", first.kind.label(), first.service_years)?;
        if first.is_disability {
            write!(f, " / 障害者になったことによる退職")?;
        }
        writeln!(f)?;
        writeln!(f)?;

        write!(f, "{:<14}", "")?;
        for i in 0..self.plans.len() {
            write!(f, "{:>16}", plan_label(i))?;
        }
        writeln!(f)?;

        let rows: [(&str, fn(&RetirementTaxResult) -> String); 11] = [
            ("退職手当等の額", |r| yen(r.amount)),
            ("退職所得控除額", |r| yen(r.deduction)),
            ("課税退職所得金額", |r| yen(r.taxable_income)),
            ("所得税", |r| yen(r.income_tax)),
            ("復興特別所得税", |r| yen(r.reconstruction_tax)),
            ("市町村民税", |r| yen(r.municipal_tax)),
            ("道府県民税", |r| yen(r.prefectural_tax)),
            ("住民税計", |r| yen(r.resident_tax)),
            ("税額合計", |r| yen(r.total_tax)),
            ("手取額", |r| yen(r.net_amount)),
            ("実効税率", |r| format_percent(r.effective_rate)),
        ];
        for (label, cell) in rows {
            write!(f, "{label:<14}")?;
            for plan in &self.plans {
                write!(f, "{:>16}", cell(plan))?;
            }
            writeln!(f)?;
        }

        if let Some(limit) = &self.officer_limit {
            writeln!(f)?;
            writeln!(
                f,
                "役員退職金の限度額: {} × {} × {}年 = {}",
                yen(limit.monthly_compensation),
                limit.multiplier.normalize(),
                limit.service_years,
                yen(limit.limit)
            )?;
            for (i, plan) in self.plans.iter().enumerate() {
                match limit.excess(plan.amount) {
                    0 => writeln!(f, "{}: 支給額は限度額の範囲内です", plan_label(i))?,
                    excess => writeln!(
                        f,
                        "{}: 限度額を超過しています（超過額 {}）",
                        plan_label(i),
                        yen(excess)
                    )?,
                }
            }
        }
        Ok(())
    }
}

// ─── inheritance ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceReport {
    pub composition: HeirComposition,
    pub result: InheritanceTaxResult,
}

fn rank_label(rank: HeirRank) -> &'static str {
    match rank {
        HeirRank::None => "なし",
        HeirRank::Children => "子（第1順位）",
        HeirRank::Ascendants => "直系尊属（第2順位）",
        HeirRank::Siblings => "兄弟姉妹（第3順位）",
    }
}

/// Rates arrive already in percent.
fn percent(rate: Decimal) -> String {
    format!("{}%", rate.round_dp(2).normalize())
}

impl fmt::Display for InheritanceReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let c = &self.composition;
        let r = &self.result;

        writeln!(f, "相続税の総額")?;
        write_heirs(f, c)?;
        writeln!(f)?;
        writeln!(f, "{:<18}{:>14}", "遺産総額", man(r.estate_value))?;
        writeln!(f, "{:<18}{:>14}", "基礎控除額", man(r.basic_deduction))?;
        writeln!(f, "{:<18}{:>14}", "課税遺産総額", man(r.taxable_amount))?;
        writeln!(f, "{:<18}{:>14}", "相続税の総額", man(r.total_tax))?;
        writeln!(f, "{:<18}{:>14}", "実効税率", percent(r.effective_tax_rate))?;
        if c.has_spouse {
            writeln!(
                f,
                "{:<18}{:>14}",
                "配偶者控除後の納税額",
                man(r.tax_after_spouse_deduction)
            )?;
            writeln!(
                f,
                "{:<18}{:>14}",
                "配偶者控除後の実効税率",
                percent(r.effective_tax_rate_after_spouse)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceTableReport {
    pub composition: HeirComposition,
    pub rows: Vec<InheritanceTaxResult>,
}

impl fmt::Display for InheritanceTableReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let c = &self.composition;
        writeln!(f, "相続税早見表")?;
        write_heirs(f, c)?;
        writeln!(f)?;

        write!(f, "{:>14}{:>14}{:>10}", "遺産総額", "相続税の総額", "実効税率")?;
        if c.has_spouse {
            write!(f, "{:>14}{:>10}", "配偶者控除後", "実効税率")?;
        }
        writeln!(f)?;
        for r in &self.rows {
            write!(
                f,
                "{:>14}{:>14}{:>10}",
                man(r.estate_value),
                man(r.total_tax),
                percent(r.effective_tax_rate)
            )?;
            if c.has_spouse {
                write!(
                    f,
                    "{:>14}{:>10}",
                    man(r.tax_after_spouse_deduction),
                    percent(r.effective_tax_rate_after_spouse)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedInheritanceReport {
    pub composition: HeirComposition,
    pub spouse_acquisition: SpouseAcquisition,
    pub result: DetailedInheritanceTaxResult,
}

impl fmt::Display for DetailedInheritanceReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = &self.result;

        writeln!(f, "相続税の計算（各人の納付税額）")?;
        write_heirs(f, &self.composition)?;
        writeln!(f)?;
        writeln!(f, "{:<18}{:>14}", "遺産総額", man(r.estate_value))?;
        writeln!(f, "{:<18}{:>14}", "基礎控除額", man(r.basic_deduction))?;
        writeln!(f, "{:<18}{:>14}", "課税遺産総額", man(r.taxable_amount))?;
        writeln!(f, "{:<18}{:>14}", "相続税の総額", man(r.total_tax))?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<10}{:>8}{:>14}{:>14}{:>14}{:>12}{:>14}",
            "相続人", "法定相続分", "取得額", "按分税額", "2割加算", "配偶者軽減", "納付税額"
        )?;
        for h in &r.heirs {
            writeln!(
                f,
                "{:<10}{:>8}{:>14}{:>14}{:>14}{:>12}{:>14}",
                h.label,
                format!("{}/{}", h.legal_share.numerator, h.legal_share.denominator),
                man(h.acquisition_amount),
                man(h.proportional_tax),
                man(h.surcharge),
                man(h.spouse_deduction),
                man(h.final_tax)
            )?;
        }
        writeln!(f)?;

        if let Some(d) = &r.spouse_deduction {
            writeln!(
                f,
                "配偶者の税額軽減: 取得額 {} / 軽減限度 {}（法定相続分 {} と 1億6,000万円 の大きい方）",
                man(d.acquisition_amount),
                man(d.deduction_limit),
                man(d.legal_share_amount)
            )?;
        }
        writeln!(f, "{:<18}{:>14}", "納付税額の合計", man(r.total_final_tax))?;
        writeln!(f, "{:<18}{:>14}", "実効税率", percent(r.effective_tax_rate))?;
        Ok(())
    }
}

fn write_heirs(
    f: &mut fmt::Formatter<'_>,
    c: &HeirComposition,
) -> fmt::Result {
    write!(f, "配偶者{}", if c.has_spouse { "あり" } else { "なし" })?;
    if c.rank_heirs > 0 && c.rank != HeirRank::None {
        write!(f, " / {} {}人", rank_label(c.rank), c.rank_heirs)?;
    }
    writeln!(f, " / 法定相続人 {}人", c.statutory_heirs())
}

// ─── real estate ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealEstateReport {
    pub transaction: TransactionType,
    pub building_deduction: u64,
    pub result: RealEstateTaxResult,
}

fn write_tax_line(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    line: &TaxLine,
) -> fmt::Result {
    if line.exempt {
        return writeln!(f, "  {title}: 非課税");
    }
    write!(
        f,
        "  {title}: {} × {} = {}",
        yen(line.base),
        percent(line.rate * Decimal::ONE_HUNDRED),
        yen(line.gross_tax)
    )?;
    if line.reduction > 0 {
        write!(f, " − 軽減 {}", yen(line.reduction))?;
    }
    if line.tax != line.gross_tax {
        write!(f, " → {}", yen(line.tax))?;
    }
    writeln!(f)
}

impl fmt::Display for RealEstateReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = &self.result;

        writeln!(f, "不動産の税額計算（{}）", self.transaction.label())?;
        writeln!(f)?;
        if r.land_acquisition.is_some() || r.land_registration.is_some() {
            writeln!(f, "土地")?;
            if let Some(line) = &r.land_acquisition {
                write_tax_line(f, "不動産取得税", line)?;
            }
            if let Some(line) = &r.land_registration {
                write_tax_line(f, "登録免許税", line)?;
            }
        }
        if r.building_acquisition.is_some() || r.building_registration.is_some() {
            writeln!(f, "建物")?;
            if self.building_deduction > 0 {
                writeln!(f, "  控除額: {}", yen(self.building_deduction))?;
            }
            if let Some(line) = &r.building_acquisition {
                write_tax_line(f, "不動産取得税", line)?;
            }
            if let Some(line) = &r.building_registration {
                write_tax_line(f, "登録免許税", line)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "{:<14}{:>16}", "不動産取得税計", yen(r.total_acquisition_tax))?;
        writeln!(f, "{:<14}{:>16}", "登録免許税計", yen(r.total_registration_tax))?;
        writeln!(f, "{:<14}{:>16}", "合計", yen(r.total))?;
        Ok(())
    }
}
