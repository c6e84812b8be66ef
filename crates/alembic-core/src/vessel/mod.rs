//! Vessels - bounded mixtures placed on a grid and ticked together

mod network;
pub mod transport;

use std::sync::Arc;

use alembic_chemistry::{Amount, Reagents};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::mixture::{Mixture, SavedMixture};
use crate::simulation::ReactionProgress;

pub use network::{NetworkError, VesselNetwork};

/// Electrodes dipped into a vessel, feeding two receiver vessels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electrodes {
    /// Applied current in amperes
    pub current: f32,
    pub anode: IVec2,
    pub cathode: IVec2,
}

/// One container in the network
#[derive(Debug, Clone)]
pub struct Vessel {
    pub mixture: Mixture,
    pub progress: ReactionProgress,
    /// Heat added every tick in joules; negative values cool
    pub heater: f64,
    pub electrodes: Option<Electrodes>,
}

impl Vessel {
    pub fn new(catalog: Arc<Reagents>, volume: Amount) -> Self {
        Self::with_mixture(Mixture::bounded(catalog, volume))
    }

    pub fn with_mixture(mixture: Mixture) -> Self {
        Self {
            mixture,
            progress: ReactionProgress::new(),
            heater: 0.0,
            electrodes: None,
        }
    }

    pub fn volume(&self) -> Option<Amount> {
        self.mixture.volume_limit().map(|limit| limit.volume())
    }
}

/// Saved form of one vessel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVessel {
    pub position: [i32; 2],
    pub volume: Option<Amount>,
    pub mixture: SavedMixture,
}
