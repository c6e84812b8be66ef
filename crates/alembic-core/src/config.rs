//! Simulation settings
//!
//! Plain serde structs with compiled defaults. Layered loading from files and
//! the environment is left to the embedding application.

use alembic_chemistry::Amount;
use serde::{Deserialize, Serialize};

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimulationConfig {
    #[serde(default)]
    pub diffusion: DiffusionConfig,

    #[serde(default)]
    pub reactions: ReactionConfig,

    #[serde(default)]
    pub vessels: VesselConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Transport between neighbouring vessels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffusionConfig {
    /// Share of a complete mixing swap spent on diffusion per tick
    pub rate: f32,
    /// Gradients moving less than this are ignored
    pub min_transfer: Amount,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            rate: 0.1,
            min_transfer: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionConfig {
    pub enabled: bool,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VesselConfig {
    /// Volume of a vessel that does not give its own
    pub default_volume: Amount,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            default_volume: 8000,
        }
    }
}

/// Headless run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub ticks: u32,
    /// Seed for reaction ordering
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { ticks: 200, seed: 0 }
    }
}
