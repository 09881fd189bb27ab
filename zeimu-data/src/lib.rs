pub mod config;
pub mod loader;
pub mod state_file;

pub use config::{CalculatorConfig, ConfigError};
pub use loader::{BracketRecord, BracketTableLoader, BracketTableLoaderError};
pub use state_file::TomlFileStore;
