pub mod calculations;
pub mod input;
pub mod models;
pub mod state;

pub use calculations::{ProgressiveTaxError, compute_tax, expand_scenarios};
pub use models::*;
