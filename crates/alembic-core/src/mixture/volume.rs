use std::collections::BTreeMap;

use alembic_chemistry::{Amount, ReagentId, ReagentState, Reagents};

/// Volume bookkeeping for a container of fixed size
///
/// Liquids and solids occupy volume; gas fills whatever headroom is left and
/// is measured separately as pressure. The derived fields are recomputed by
/// the owning mixture after every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeLimit {
    volume: Amount,
    used_volume: Amount,
    solid_volume: Amount,
    gas_amount: Amount,
}

impl VolumeLimit {
    pub fn new(volume: Amount) -> Self {
        Self {
            volume,
            used_volume: 0,
            solid_volume: 0,
            gas_amount: 0,
        }
    }

    pub fn volume(&self) -> Amount {
        self.volume
    }

    /// Volume taken by liquids and solids
    pub fn used_volume(&self) -> Amount {
        self.used_volume
    }

    pub fn solid_volume(&self) -> Amount {
        self.solid_volume
    }

    pub fn liquid_volume(&self) -> Amount {
        self.used_volume - self.solid_volume
    }

    pub fn gas_amount(&self) -> Amount {
        self.gas_amount
    }

    /// Headroom left for gas
    pub fn free_volume(&self) -> Amount {
        self.volume.saturating_sub(self.used_volume)
    }

    /// Fraction of the volume taken by liquids and solids
    pub fn fill_fraction(&self) -> f32 {
        if self.volume == 0 {
            1.0
        } else {
            (self.used_volume as f64 / self.volume as f64) as f32
        }
    }

    /// Gas per unit of headroom
    ///
    /// A container with no headroom counts as one unit so the ratio stays finite.
    pub fn pressure(&self) -> f32 {
        (self.gas_amount as f64 / self.free_volume().max(1) as f64) as f32
    }

    /// How much of `amount` in `state` fits
    ///
    /// Gas is not volume-limited: it is admitted in full unless liquids and
    /// solids already overfill the container.
    pub fn accepts(&self, state: ReagentState, amount: Amount) -> Amount {
        match state {
            ReagentState::Gas if self.used_volume <= self.volume => amount,
            ReagentState::Gas => 0,
            _ => amount.min(self.free_volume()),
        }
    }

    pub(crate) fn refresh(
        &mut self,
        catalog: &Reagents,
        reagents: &BTreeMap<ReagentId, Amount>,
        temperature: f32,
    ) {
        self.used_volume = 0;
        self.solid_volume = 0;
        self.gas_amount = 0;
        for (&id, &amount) in reagents {
            match catalog.get(id).state_at(temperature) {
                ReagentState::Solid => {
                    self.solid_volume += amount;
                    self.used_volume += amount;
                }
                ReagentState::Liquid => self.used_volume += amount,
                ReagentState::Gas => self.gas_amount += amount,
            }
        }
    }
}
