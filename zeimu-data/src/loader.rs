use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use zeimu_core::{BracketTable, BracketTableError, RateBracket};

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum BracketTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("table '{table}' is invalid: {source}")]
    InvalidTable {
        table: String,
        #[source]
        source: BracketTableError,
    },

    #[error("table '{0}' not found in file")]
    TableNotFound(String),
}

impl From<csv::Error> for BracketTableLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row from a bracket CSV file.
///
/// - `table`: name grouping the rows into one table (e.g. `gift_general`)
/// - `upper_limit`: inclusive upper limit; empty or `inf` for the last row
/// - `rate`: marginal rate as a decimal fraction (e.g. `0.10`)
/// - `deduction`: subtractive deduction for the row
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub table: String,
    #[serde(deserialize_with = "deserialize_upper_limit")]
    pub upper_limit: Option<u64>,
    pub rate: Decimal,
    pub deduction: u64,
}

impl From<&BracketRecord> for RateBracket {
    fn from(record: &BracketRecord) -> Self {
        RateBracket::new(record.upper_limit, record.rate, record.deduction)
    }
}

fn deserialize_upper_limit<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") | Some("inf") | Some("∞") => Ok(None),
        Some(s) => s
            .replace(',', "")
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Loader for rate tables kept in CSV files.
///
/// One file may hold several tables; rows are grouped by the `table`
/// column and keep their file order within each group.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by table name and validate each table.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableLoaderError::InvalidTable`] naming the first
    /// table that fails validation.
    pub fn build(
        records: &[BracketRecord]
    ) -> Result<BTreeMap<String, BracketTable>, BracketTableLoaderError> {
        let mut groups: BTreeMap<String, Vec<RateBracket>> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.table.clone())
                .or_default()
                .push(RateBracket::from(record));
        }

        groups
            .into_iter()
            .map(|(table, brackets)| {
                debug!(table = %table, rows = brackets.len(), "validating bracket table");
                BracketTable::new(brackets)
                    .map(|t| (table.clone(), t))
                    .map_err(|source| BracketTableLoaderError::InvalidTable { table, source })
            })
            .collect()
    }

    /// Parse and validate every table in a CSV file.
    pub fn load_path(
        path: &Path
    ) -> Result<BTreeMap<String, BracketTable>, BracketTableLoaderError> {
        let file = File::open(path).map_err(|source| BracketTableLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = Self::parse(file)?;
        Self::build(&records)
    }

    /// Parse a CSV file and return the single table called `name`.
    pub fn load_table(
        path: &Path,
        name: &str,
    ) -> Result<BracketTable, BracketTableLoaderError> {
        Self::load_path(path)?
            .remove(name)
            .ok_or_else(|| BracketTableLoaderError::TableNotFound(name.to_string()))
    }
}
