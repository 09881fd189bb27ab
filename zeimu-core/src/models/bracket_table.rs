use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::RateBracket;

/// Errors raised while validating a bracket table.
///
/// A table that fails validation is a configuration problem, never a user
/// input problem, so callers should surface these loudly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table has no rows")]
    Empty,

    #[error("bracket {index} does not have a higher limit than the row before it")]
    NotAscending { index: usize },

    #[error("bracket {index} is unbounded but is not the last row")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded")]
    MissingUnboundedSentinel,

    #[error("bracket {index} has rate {rate} outside 0..=1")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// An ordered, validated rate table.
///
/// Rows ascend by `upper_limit` and the final row is unbounded, so every
/// non-negative amount maps to exactly one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    brackets: Vec<RateBracket>,
}

impl BracketTable {
    /// Validates `brackets` and wraps them in a table.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the rows are empty, out of order,
    /// have an unbounded row anywhere but last, lack the unbounded final
    /// row, or carry a rate outside `0..=1`.
    pub fn new(brackets: Vec<RateBracket>) -> Result<Self, BracketTableError> {
        validate(&brackets)?;
        Ok(Self { brackets })
    }

    /// Builds a table from a published constant. The constants are covered
    /// by tests that run them through [`BracketTable::new`].
    pub(crate) fn from_published(brackets: &'static [RateBracket]) -> Self {
        debug_assert!(validate(brackets).is_ok());
        Self {
            brackets: brackets.to_vec(),
        }
    }

    pub fn brackets(&self) -> &[RateBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Finds the first row whose limit is at or above `taxable`.
    ///
    /// An amount exactly on a limit belongs to the lower row.
    pub fn find(
        &self,
        taxable: u64,
    ) -> Option<&RateBracket> {
        self.brackets.iter().find(|b| b.admits(taxable))
    }
}

impl TryFrom<Vec<RateBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<RateBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

fn validate(brackets: &[RateBracket]) -> Result<(), BracketTableError> {
    let Some(last) = brackets.last() else {
        return Err(BracketTableError::Empty);
    };

    let mut previous: Option<u64> = None;
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(BracketTableError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }

        match bracket.upper_limit {
            Some(limit) => {
                if previous.is_some_and(|p| limit <= p) {
                    return Err(BracketTableError::NotAscending { index });
                }
                previous = Some(limit);
            }
            None if index + 1 < brackets.len() => {
                return Err(BracketTableError::UnboundedBeforeEnd { index });
            }
            None => {}
        }
    }

    if !last.is_unbounded() {
        return Err(BracketTableError::MissingUnboundedSentinel);
    }

    Ok(())
}
