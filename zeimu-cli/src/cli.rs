use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use zeimu_core::GiftType;
use zeimu_core::calculations::{
    HeirRank, LandType, OfficerPreset, RetirementKind, SpouseAcquisition, TransactionType,
};
use zeimu_core::input::parse_amount;

// ─── top level ───────────────────────────────────────────────────────────────

/// Japanese gift, retirement and inheritance tax calculator.
///
/// Amounts accept full-width digits and thousands separators, so
/// `１，０００，０００` and `1,000,000` mean the same thing.
#[derive(Debug, Parser)]
#[command(name = "zeimu", version)]
pub struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare gift tax for a lump sum against splitting it over years.
    Gift(GiftArgs),

    /// Print the gift tax quick-reference table (早見表).
    GiftTable(GiftTableArgs),

    /// Tax on a retirement allowance, one or more plans side by side.
    Retirement(RetirementArgs),

    /// Total inheritance tax for an estate given in 万円.
    Inheritance(InheritanceArgs),

    /// Print the inheritance tax quick-reference table (相続税早見表).
    InheritanceTable(InheritanceTableArgs),

    /// Acquisition and registration tax on land and buildings.
    RealEstate(RealEstateArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where rate tables come from when not using the built-in ones.
#[derive(Debug, Clone, Default, Args)]
pub struct BracketSource {
    /// CSV file with rate tables; overrides `brackets_file` in the config.
    #[arg(long)]
    pub brackets: Option<PathBuf>,

    /// Table name inside the CSV file.
    #[arg(long)]
    pub table: Option<String>,
}

// ─── subcommands ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GiftArgs {
    /// Total gift in yen. Taken from --state when omitted.
    pub amount: Option<String>,

    /// general (一般贈与) or special (特例贈与).
    #[arg(long = "type", value_parser = parse_gift_type)]
    pub gift_type: Option<GiftType>,

    #[command(flatten)]
    pub source: BracketSource,

    /// Form state file; read when AMOUNT is omitted, written otherwise.
    #[arg(long)]
    pub state: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GiftTableArgs {
    #[arg(long = "type", value_parser = parse_gift_type)]
    pub gift_type: Option<GiftType>,

    /// Largest amount listed, in yen.
    #[arg(long, default_value = "10,000,000")]
    pub max: String,

    /// Distance between rows, in yen.
    #[arg(long, default_value = "1,000,000")]
    pub step: String,

    #[command(flatten)]
    pub source: BracketSource,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RetirementArgs {
    /// Allowance in yen; give several to compare plans.
    #[arg(required = true, num_args = 1..)]
    pub amounts: Vec<String>,

    /// Years of service.
    #[arg(long, required_unless_present = "start", conflicts_with_all = ["start", "end"])]
    pub years: Option<u32>,

    /// First day of service (YYYY-MM-DD).
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Retirement date (YYYY-MM-DD).
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// general, officer or short-term.
    #[arg(long, value_parser = parse_retirement_kind, default_value = "general")]
    pub kind: RetirementKind,

    /// Retirement caused by disability.
    #[arg(long)]
    pub disability: bool,

    /// Rates to apply; defaults to the config, then the latest year.
    #[arg(long)]
    pub tax_year: Option<i32>,

    #[command(flatten)]
    pub officer: OfficerLimitArgs,

    #[command(flatten)]
    pub source: BracketSource,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Checks the allowance against the officer ceiling
/// (final monthly pay × multiplier × years of service).
#[derive(Debug, Clone, Default, Args)]
pub struct OfficerLimitArgs {
    /// Final monthly compensation in yen.
    #[arg(long = "officer-limit", value_name = "MONTHLY")]
    pub monthly: Option<String>,

    /// Multiplier preset: 社長, 専務取締役, 常務取締役, 取締役 or 監査役.
    /// Defaults to 社長.
    #[arg(long, value_parser = parse_officer_preset, requires = "monthly")]
    pub preset: Option<OfficerPreset>,

    /// Explicit multiplier (功績倍率) instead of a preset.
    #[arg(long, conflicts_with = "preset", requires = "monthly")]
    pub multiplier: Option<Decimal>,
}

/// Who inherits.
#[derive(Debug, Clone, Default, Args)]
pub struct HeirArgs {
    /// A spouse survives.
    #[arg(long)]
    pub spouse: bool,

    /// children, ascendants or siblings.
    #[arg(long, value_parser = parse_heir_rank, default_value = "children")]
    pub rank: HeirRank,

    /// Statutory heirs in that rank.
    #[arg(long, default_value_t = 0)]
    pub heirs: u32,
}

#[derive(Debug, Args)]
pub struct InheritanceArgs {
    /// Estate value in 万円.
    pub estate: String,

    #[command(flatten)]
    pub family: HeirArgs,

    /// What the spouse actually takes: legal, limit (up to 1億6,000万円)
    /// or an amount in 万円. Prints the per-heir breakdown.
    #[arg(long, value_parser = parse_spouse_acquisition, requires = "spouse")]
    pub spouse_takes: Option<SpouseAcquisition>,

    #[command(flatten)]
    pub source: BracketSource,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InheritanceTableArgs {
    #[command(flatten)]
    pub family: HeirArgs,

    /// Largest estate listed, in 万円.
    #[arg(long, default_value = "100,000")]
    pub max: String,

    #[command(flatten)]
    pub source: BracketSource,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RealEstateArgs {
    /// Assessed value of the land in yen.
    #[arg(long, required_unless_present = "building")]
    pub land: Option<String>,

    /// Assessed value of the building in yen.
    #[arg(long)]
    pub building: Option<String>,

    /// purchase, new-build, inheritance or gift.
    #[arg(long, value_parser = parse_transaction, default_value = "purchase")]
    pub transaction: TransactionType,

    /// residential (宅地) or other.
    #[arg(long, value_parser = parse_land_type, default_value = "residential")]
    pub land_type: LandType,

    /// Land area in m².
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub land_area: Decimal,

    /// Building floor area in m².
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub building_area: Decimal,

    /// The property is a home.
    #[arg(long)]
    pub residential: bool,

    /// A housing certificate (住宅用家屋証明書) is available.
    #[arg(long)]
    pub housing_certificate: bool,

    /// Construction date (YYYY-MM-DD); picks the building deduction.
    #[arg(long)]
    pub built: Option<NaiveDate>,

    /// Building deduction in yen, instead of deriving it from --built.
    #[arg(long, conflicts_with = "built")]
    pub deduction: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

// ─── value parsers ───────────────────────────────────────────────────────────

fn parse_gift_type(s: &str) -> Result<GiftType, String> {
    GiftType::parse(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown gift type '{s}' (expected general or special)"))
}

fn parse_retirement_kind(s: &str) -> Result<RetirementKind, String> {
    RetirementKind::parse(&s.to_ascii_lowercase()).ok_or_else(|| {
        format!("unknown retirement kind '{s}' (expected general, officer or short-term)")
    })
}

fn parse_heir_rank(s: &str) -> Result<HeirRank, String> {
    HeirRank::parse(&s.to_ascii_lowercase()).ok_or_else(|| {
        format!("unknown heir rank '{s}' (expected children, ascendants or siblings)")
    })
}

fn parse_officer_preset(s: &str) -> Result<OfficerPreset, String> {
    OfficerPreset::find(s).ok_or_else(|| format!("unknown officer preset '{s}'"))
}

fn parse_spouse_acquisition(s: &str) -> Result<SpouseAcquisition, String> {
    match s.to_ascii_lowercase().as_str() {
        "legal" => Ok(SpouseAcquisition::Legal),
        "limit" | "limit160m" => Ok(SpouseAcquisition::UpToLimit),
        _ => parse_amount(s)
            .map(SpouseAcquisition::Custom)
            .map_err(|e| format!("'{s}': {}", e.user_message())),
    }
}

fn parse_transaction(s: &str) -> Result<TransactionType, String> {
    TransactionType::parse(&s.to_ascii_lowercase()).ok_or_else(|| {
        format!("unknown transaction '{s}' (expected purchase, new-build, inheritance or gift)")
    })
}

fn parse_land_type(s: &str) -> Result<LandType, String> {
    LandType::parse(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown land type '{s}' (expected residential or other)"))
}
