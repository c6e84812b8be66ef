//! Reagent quantities
//!
//! Amounts are fixed-point millimoles so stoichiometry stays exact.

use crate::ReagentId;
use serde::{Deserialize, Serialize};

/// Amount of a reagent in millimoles
pub type Amount = u64;

/// Fixed-point units per mole
pub const AMOUNT_PER_MOLE: f64 = 1000.0;

/// Convert a fixed-point amount to moles
pub fn moles(amount: Amount) -> f64 {
    amount as f64 / AMOUNT_PER_MOLE
}

/// An amount of one reagent at a given temperature
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReagentQuantity {
    pub reagent: ReagentId,
    pub amount: Amount,
    /// Temperature in Celsius
    pub temperature: f32,
}

impl ReagentQuantity {
    pub const EMPTY: ReagentQuantity = ReagentQuantity {
        reagent: ReagentId::EMPTY,
        amount: 0,
        temperature: 0.0,
    };

    pub fn new(reagent: ReagentId, amount: Amount, temperature: f32) -> Self {
        Self {
            reagent,
            amount,
            temperature,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.reagent.is_empty()
    }

    /// Same reagent and temperature with a different amount
    pub fn with_amount(self, amount: Amount) -> Self {
        Self { amount, ..self }
    }
}
