//! Scenario definition and RON file loading

use std::path::Path;
use std::sync::Arc;

use alembic_core::chemistry::{
    Amount, DefinitionError, ReactionDefinition, ReactionRegistry, ReagentDef, ReagentQuantity,
    Reagents,
};
use alembic_core::storage::ROOM_TEMPERATURE;
use alembic_core::vessel::{Electrodes, NetworkError};
use alembic_core::{SimulationConfig, Vessel, VesselNetwork};
use anyhow::{Context, Result};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::verification::VerificationCondition;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown reagent '{0}'")]
    UnknownReagent(String),

    #[error("electrodes at {0} need two other distinct vessels")]
    InvalidElectrodes(IVec2),

    #[error("electrodes at {0} feed missing vessel {1}")]
    MissingReceiver(IVec2, IVec2),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Top-level scenario definition loaded from RON files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Reagents registered on top of the built-in catalog
    #[serde(default)]
    pub reagents: Vec<ReagentDef>,

    /// Rules registered on top of the built-in rule set
    #[serde(default)]
    pub reactions: Vec<ReactionDefinition>,

    pub vessels: Vec<VesselSpec>,

    /// Checks to run after the last tick
    #[serde(default)]
    pub verify: Vec<VerificationCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    pub position: [i32; 2],

    /// Falls back to `vessels.default_volume`
    #[serde(default)]
    pub volume: Option<Amount>,

    #[serde(default)]
    pub contents: Vec<ContentSpec>,

    /// Joules per tick
    #[serde(default)]
    pub heater: f64,

    #[serde(default)]
    pub catalyzer: f32,

    #[serde(default)]
    pub electrodes: Option<ElectrodeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    pub reagent: String,
    pub amount: Amount,
    #[serde(default = "room_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectrodeSpec {
    pub current: f32,
    pub anode: [i32; 2],
    pub cathode: [i32; 2],
}

fn room_temperature() -> f32 {
    ROOM_TEMPERATURE
}

impl ScenarioDefinition {
    /// Load scenario from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

        let scenario = ron::from_str(&content)
            .with_context(|| format!("Failed to parse RON scenario: {}", path.display()))?;

        Ok(scenario)
    }

    /// Save scenario to RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize scenario to RON")?;

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!("Failed to write scenario file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Catalog with this scenario's reagents registered
    pub fn catalog(&self) -> Reagents {
        let mut catalog = Reagents::new();
        for def in &self.reagents {
            catalog.register(def.clone());
        }
        catalog
    }

    /// Rule registry with this scenario's rules and `extra_rules` registered
    pub fn registry(
        &self,
        catalog: &Reagents,
        extra_rules: &[ReactionDefinition],
    ) -> Result<ReactionRegistry, ScenarioError> {
        let mut registry = ReactionRegistry::new();
        registry.register_definitions(&self.reactions, catalog)?;
        registry.register_definitions(extra_rules, catalog)?;
        Ok(registry)
    }

    /// Build the vessel network this scenario describes
    pub fn build(
        &self,
        config: SimulationConfig,
        extra_rules: &[ReactionDefinition],
    ) -> Result<VesselNetwork, ScenarioError> {
        let catalog = Arc::new(self.catalog());
        let registry = Arc::new(self.registry(&catalog, extra_rules)?);
        let default_volume = config.vessels.default_volume;
        let mut network = VesselNetwork::new(Arc::clone(&catalog), registry, config);

        for spec in &self.vessels {
            let position = IVec2::from_array(spec.position);
            let mut vessel = Vessel::new(
                Arc::clone(&catalog),
                spec.volume.unwrap_or(default_volume),
            );
            for content in &spec.contents {
                let reagent = catalog
                    .find(&content.reagent)
                    .ok_or_else(|| ScenarioError::UnknownReagent(content.reagent.clone()))?;
                let accepted = vessel.mixture.add(&ReagentQuantity::new(
                    reagent,
                    content.amount,
                    content.temperature,
                ));
                if accepted < content.amount {
                    log::warn!(
                        "Vessel at {} only took {} of {} {}",
                        position,
                        accepted,
                        content.amount,
                        content.reagent
                    );
                }
            }
            vessel.heater = spec.heater;
            vessel.mixture.set_catalyzer(spec.catalyzer);
            vessel.electrodes = spec.electrodes.as_ref().map(|e| Electrodes {
                current: e.current,
                anode: IVec2::from_array(e.anode),
                cathode: IVec2::from_array(e.cathode),
            });
            vessel.mixture.clear_altered();
            network.insert(position, vessel)?;
        }

        for (position, vessel) in network.iter() {
            let Some(electrodes) = &vessel.electrodes else {
                continue;
            };
            if electrodes.anode == position
                || electrodes.cathode == position
                || electrodes.anode == electrodes.cathode
            {
                return Err(ScenarioError::InvalidElectrodes(position));
            }
            for receiver in [electrodes.anode, electrodes.cathode] {
                if network.get(receiver).is_none() {
                    return Err(ScenarioError::MissingReceiver(position, receiver));
                }
            }
        }

        log::info!(
            "Built scenario '{}' with {} vessels and {} rules",
            self.name,
            network.len(),
            network.registry().len()
        );
        Ok(network)
    }

    /// Sulfur burner under a gas collector next to a brine electrolysis cell
    pub fn demo() -> Self {
        let content = |reagent: &str, amount: Amount| ContentSpec {
            reagent: reagent.to_string(),
            amount,
            temperature: ROOM_TEMPERATURE,
        };
        let vessel = |position: [i32; 2], volume: Amount| VesselSpec {
            position,
            volume: Some(volume),
            contents: Vec::new(),
            heater: 0.0,
            catalyzer: 0.0,
            electrodes: None,
        };

        Self {
            name: "demo".to_string(),
            description: "Heated sulfur burns into a collector; brine is split by a current"
                .to_string(),
            reagents: Vec::new(),
            reactions: Vec::new(),
            vessels: vec![
                VesselSpec {
                    contents: vec![content("sulfur", 2000), content("oxygen", 6000)],
                    heater: 1500.0,
                    ..vessel([0, 0], 8000)
                },
                vessel([0, 1], 8000),
                VesselSpec {
                    contents: vec![content("water", 6000), content("sodium_chloride", 4000)],
                    electrodes: Some(ElectrodeSpec {
                        current: 20.0,
                        anode: [5, 0],
                        cathode: [7, 0],
                    }),
                    ..vessel([3, 0], 12_000)
                },
                vessel([5, 0], 4000),
                vessel([7, 0], 4000),
            ],
            verify: vec![
                VerificationCondition::TotalAmountRange {
                    reagent: "sulfur_dioxide".to_string(),
                    min: 1000,
                    max: None,
                },
                VerificationCondition::AmountRange {
                    position: [7, 0],
                    reagent: "hydrogen".to_string(),
                    min: 2000,
                    max: None,
                },
                VerificationCondition::Not {
                    condition: Box::new(VerificationCondition::Burning {
                        position: [7, 0],
                        expected: true,
                    }),
                },
            ],
        }
    }
}
