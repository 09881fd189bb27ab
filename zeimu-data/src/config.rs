//! TOML configuration for the calculators.
//!
//! Every section is optional; missing keys fall back to the published
//! defaults.
//!
//! ```toml
//! brackets_file = "tables/brackets.csv"
//!
//! [gift]
//! basic_deduction = 1100000
//! default_type = "special"
//!
//! [retirement]
//! tax_year = 2025
//!
//! [log]
//! level = "debug"
//! file = "zeimu.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeimu_core::GiftType;
use zeimu_core::calculations::GIFT_BASIC_DEDUCTION;
use zeimu_core::calculations::retirement::DEFAULT_TAX_YEAR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    /// CSV file with replacement rate tables.
    pub brackets_file: Option<PathBuf>,
    pub gift: GiftSettings,
    pub retirement: RetirementSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GiftSettings {
    pub basic_deduction: u64,
    pub default_type: GiftType,
}

impl Default for GiftSettings {
    fn default() -> Self {
        Self {
            basic_deduction: GIFT_BASIC_DEDUCTION,
            default_type: GiftType::General,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetirementSettings {
    pub tax_year: i32,
}

impl Default for RetirementSettings {
    fn default() -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Any `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl CalculatorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the config at `path`. Relative `brackets_file` and log file
    /// paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        if let Some(base) = path.parent() {
            config.brackets_file = config.brackets_file.map(|p| resolve(base, p));
            config.log.file = config.log.file.map(|p| resolve(base, p));
        }

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

fn resolve(
    base: &Path,
    path: PathBuf,
) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
