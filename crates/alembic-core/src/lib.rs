pub mod config;
pub mod mixture;
pub mod simulation;
pub mod storage;
pub mod vessel;

// Re-export the chemistry crate so downstream users need a single dependency
pub mod chemistry {
    pub use alembic_chemistry::*;
}

pub use config::SimulationConfig;
pub use mixture::{Mixture, SavedMixture, SavedReagent, Transaction, VolumeLimit};
pub use simulation::{NoopStats, ReactionProgress, ReactionSystem, SimStats};
pub use vessel::{Vessel, VesselNetwork};
