mod bracket;
mod bracket_table;
mod gift_type;
mod scenario;

pub use bracket::RateBracket;
pub use bracket_table::{BracketTable, BracketTableError};
pub use gift_type::GiftType;
pub use scenario::{CalculationResult, QuickReferenceRow, Scenario};
