use serde::{Deserialize, Serialize};

use crate::calculations::gift::{GENERAL_GIFT_BRACKETS, SPECIAL_GIFT_BRACKETS};
use crate::models::BracketTable;

/// Which gift-tax rate schedule applies.
///
/// `Special` (特例贈与) covers gifts from lineal ascendants to recipients
/// aged 18 or over; everything else is `General` (一般贈与).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftType {
    #[default]
    General,
    Special,
}

impl GiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Special => "special",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "special" => Some(Self::Special),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "一般贈与",
            Self::Special => "特例贈与",
        }
    }

    /// The published rate table for this schedule.
    pub fn brackets(&self) -> BracketTable {
        match self {
            Self::General => BracketTable::from_published(&GENERAL_GIFT_BRACKETS),
            Self::Special => BracketTable::from_published(&SPECIAL_GIFT_BRACKETS),
        }
    }
}
