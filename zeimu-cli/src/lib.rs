pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::run;
