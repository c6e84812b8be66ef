//! Fluid- and item-style views onto a mixture
//!
//! Adapters only ever touch the mixture through a transaction, so whatever
//! drives them can undo a half-finished exchange.

use alembic_chemistry::{Amount, ReagentId, ReagentQuantity, ReagentState};

use crate::mixture::Transaction;

/// Temperature new items enter an empty mixture at, in °C
pub const ROOM_TEMPERATURE: f32 = 20.0;

pub trait ReagentStorage {
    /// Insert up to `amount` of `reagent`, returning the amount accepted
    fn insert(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount;

    /// Extract up to `amount` of `reagent`, returning the amount removed
    fn extract(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount;
}

/// Pipes liquids in and out
#[derive(Clone, Debug)]
pub struct FluidStorage {
    /// Temperature inserted fluid arrives at
    pub inlet_temperature: f32,
}

impl Default for FluidStorage {
    fn default() -> Self {
        Self {
            inlet_temperature: ROOM_TEMPERATURE,
        }
    }
}

impl ReagentStorage for FluidStorage {
    fn insert(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount {
        let def = txn.get(0).catalog().get(reagent);
        if reagent.is_empty() || def.state_at(self.inlet_temperature) != ReagentState::Liquid {
            return 0;
        }
        txn.get_mut(0)
            .add(&ReagentQuantity::new(reagent, amount, self.inlet_temperature))
    }

    fn extract(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount {
        if txn.get(0).state_of(reagent) != ReagentState::Liquid {
            return 0;
        }
        txn.get_mut(0).remove(reagent, amount).amount
    }
}

/// Moves solids in and out as discrete items
#[derive(Clone, Debug, Default)]
pub struct ItemStorage;

impl ReagentStorage for ItemStorage {
    fn insert(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount {
        let mixture = txn.get(0);
        let temperature = if mixture.is_empty() {
            ROOM_TEMPERATURE
        } else {
            mixture.temperature()
        };
        if reagent.is_empty()
            || mixture.catalog().get(reagent).state_at(temperature) != ReagentState::Solid
        {
            return 0;
        }
        txn.get_mut(0)
            .add(&ReagentQuantity::new(reagent, amount, temperature))
    }

    fn extract(&self, txn: &mut Transaction<'_, 1>, reagent: ReagentId, amount: Amount) -> Amount {
        if txn.get(0).state_of(reagent) != ReagentState::Solid {
            return 0;
        }
        txn.get_mut(0).remove(reagent, amount).amount
    }
}
