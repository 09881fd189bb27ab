//! Form state objects and the persistence port they are saved through.
//!
//! Calculators never read ambient state. A front end keeps a state object,
//! hands it to the calculator when it wants results, and persists it through
//! whatever [`StateStore`] it was given.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::{GiftTaxSimulator, ProgressiveTaxError};
use crate::input::{InputError, parse_amount};
use crate::models::{BracketTable, CalculationResult, GiftType};

/// Errors raised while evaluating a form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Tax(#[from] ProgressiveTaxError),
}

/// Errors raised by a [`StateStore`] implementation.
#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("state storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored state could not be decoded: {0}")]
    Decode(String),

    #[error("state could not be encoded: {0}")]
    Encode(String),
}

/// Somewhere a form's state survives between runs.
pub trait StateStore<S> {
    fn load(&self) -> Result<Option<S>, StateStoreError>;

    fn save(
        &self,
        state: &S,
    ) -> Result<(), StateStoreError>;

    fn clear(&self) -> Result<(), StateStoreError>;
}

/// What the gift simulator form holds: the raw amount text and the chosen
/// rate schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftFormState {
    pub amount_input: String,
    pub gift_type: GiftType,
}

impl GiftFormState {
    pub fn new(
        amount_input: impl Into<String>,
        gift_type: GiftType,
    ) -> Self {
        Self {
            amount_input: amount_input.into(),
            gift_type,
        }
    }

    /// Validates the amount and compares the simulator's split patterns on
    /// the published table for this form's gift type.
    ///
    /// Only the simulator's basic deduction and patterns are used; its rate
    /// table is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Input`] for an empty, zero or oversized amount
    /// and [`FormError::Tax`] if the calculation itself fails.
    pub fn evaluate(
        &self,
        simulator: &GiftTaxSimulator,
    ) -> Result<Vec<CalculationResult>, FormError> {
        self.evaluate_with(simulator, |gift_type| {
            Ok::<_, FormError>(gift_type.brackets())
        })
    }

    /// Like [`evaluate`](Self::evaluate), with `table_for` supplying the rate
    /// table for this form's gift type.
    ///
    /// `table_for` is called once, with `self.gift_type`, after the amount
    /// has been validated.
    pub fn evaluate_with<E>(
        &self,
        simulator: &GiftTaxSimulator,
        table_for: impl FnOnce(GiftType) -> Result<BracketTable, E>,
    ) -> Result<Vec<CalculationResult>, E>
    where
        E: From<FormError>,
    {
        let amount = parse_amount(&self.amount_input).map_err(FormError::from)?;
        let table = table_for(self.gift_type)?;
        let results = simulator
            .clone()
            .with_table(table)
            .compare_patterns(amount)
            .map_err(FormError::from)?;
        Ok(results)
    }
}

/// In-process store, for tests and for front ends that do not persist.
#[derive(Debug)]
pub struct MemoryStateStore<S> {
    slot: Mutex<Option<S>>,
}

impl<S> MemoryStateStore<S> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<S> Default for MemoryStateStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> StateStore<S> for MemoryStateStore<S> {
    fn load(&self) -> Result<Option<S>, StateStoreError> {
        Ok(self.slot.lock().map_err(poisoned)?.clone())
    }

    fn save(
        &self,
        state: &S,
    ) -> Result<(), StateStoreError> {
        *self.slot.lock().map_err(poisoned)? = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StateStoreError> {
        *self.slot.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StateStoreError {
    StateStoreError::Io(std::io::Error::other(err.to_string()))
}
