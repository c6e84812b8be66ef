//! Container tick orchestration
//!
//! Vessels sit on an integer grid with +y pointing up. A tick first moves
//! matter between every vessel and its right and lower neighbour, then runs
//! heaters, electrodes and reactions per vessel. Vessels are visited top row
//! first, left to right, so a run is reproducible from its seed.

use std::collections::HashMap;
use std::sync::Arc;

use alembic_chemistry::{ReactionRegistry, ReagentState, Reagents};
use glam::IVec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use thiserror::Error;

use super::{SavedVessel, Vessel, transport};
use crate::config::SimulationConfig;
use crate::simulation::{ReactionSystem, SimStats};

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("position {0} already holds a vessel")]
    Occupied(IVec2),

    #[error("vessel at {0} has no volume limit")]
    Unbounded(IVec2),
}

#[derive(Debug)]
pub struct VesselNetwork {
    catalog: Arc<Reagents>,
    registry: Arc<ReactionRegistry>,
    config: SimulationConfig,
    vessels: HashMap<IVec2, Vessel>,
    rng: Xoshiro256StarStar,
    ticks: u64,
}

impl VesselNetwork {
    pub fn new(
        catalog: Arc<Reagents>,
        registry: Arc<ReactionRegistry>,
        config: SimulationConfig,
    ) -> Self {
        let rng = Xoshiro256StarStar::seed_from_u64(config.run.seed);
        Self {
            catalog,
            registry,
            config,
            vessels: HashMap::new(),
            rng,
            ticks: 0,
        }
    }

    pub fn catalog(&self) -> &Arc<Reagents> {
        &self.catalog
    }

    pub fn registry(&self) -> &ReactionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn insert(&mut self, position: IVec2, vessel: Vessel) -> Result<(), NetworkError> {
        if vessel.mixture.volume_limit().is_none() {
            return Err(NetworkError::Unbounded(position));
        }
        if self.vessels.contains_key(&position) {
            return Err(NetworkError::Occupied(position));
        }
        self.vessels.insert(position, vessel);
        Ok(())
    }

    /// Place an empty vessel of the configured default volume
    pub fn add_vessel(&mut self, position: IVec2) -> Result<&mut Vessel, NetworkError> {
        let vessel = Vessel::new(
            Arc::clone(&self.catalog),
            self.config.vessels.default_volume,
        );
        self.insert(position, vessel)?;
        self.vessels
            .get_mut(&position)
            .ok_or(NetworkError::Occupied(position))
    }

    pub fn remove(&mut self, position: IVec2) -> Option<Vessel> {
        self.vessels.remove(&position)
    }

    pub fn get(&self, position: IVec2) -> Option<&Vessel> {
        self.vessels.get(&position)
    }

    pub fn get_mut(&mut self, position: IVec2) -> Option<&mut Vessel> {
        self.vessels.get_mut(&position)
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    /// Occupied positions in tick order: top row first, then left to right
    pub fn positions(&self) -> Vec<IVec2> {
        let mut positions: Vec<IVec2> = self.vessels.keys().copied().collect();
        positions.sort_by_key(|pos| (-pos.y, pos.x));
        positions
    }

    /// Vessels in tick order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Vessel)> {
        self.positions()
            .into_iter()
            .filter_map(move |pos| self.vessels.get(&pos).map(|vessel| (pos, vessel)))
    }

    /// Advance the whole network by one step
    pub fn tick(&mut self, stats: &mut dyn SimStats) {
        let positions = self.positions();

        for &pos in &positions {
            let below = pos - IVec2::Y;
            if self.vessels.contains_key(&below) {
                self.exchange(pos, below, true, stats);
            }
            let right = pos + IVec2::X;
            if self.vessels.contains_key(&right) {
                self.exchange(pos, right, false, stats);
            }
        }

        for &pos in &positions {
            if let Some(vessel) = self.vessels.get_mut(&pos)
                && vessel.heater != 0.0
            {
                vessel.mixture.heat(vessel.heater);
            }
        }

        for &pos in &positions {
            self.run_electrodes(pos, stats);
        }

        if self.config.reactions.enabled {
            for &pos in &positions {
                if let Some(vessel) = self.vessels.get_mut(&pos) {
                    ReactionSystem::react(
                        &mut vessel.mixture,
                        &self.registry,
                        &mut vessel.progress,
                        stats,
                        &mut self.rng,
                    );
                }
            }
        }

        self.ticks += 1;
        log::debug!("Tick {} done for {} vessels", self.ticks, positions.len());
    }

    /// Transport between two neighbours; `vertical` means `a` sits on top of `b`
    fn exchange(&mut self, a: IVec2, b: IVec2, vertical: bool, stats: &mut dyn SimStats) {
        let Some(mut first) = self.vessels.remove(&a) else {
            return;
        };
        let Some(mut second) = self.vessels.remove(&b) else {
            self.vessels.insert(a, first);
            return;
        };

        let config = &self.config.diffusion;
        let (upper, lower) = (&mut first.mixture, &mut second.mixture);
        if vertical {
            transport::settle(upper, lower, stats);
        } else {
            transport::level(upper, lower, config, stats);
        }
        transport::equalize_gas(upper, lower, config, stats);
        transport::mix(upper, lower, ReagentState::Liquid, config, stats);
        transport::mix(upper, lower, ReagentState::Gas, config, stats);

        self.vessels.insert(a, first);
        self.vessels.insert(b, second);
    }

    fn run_electrodes(&mut self, pos: IVec2, stats: &mut dyn SimStats) {
        let Some(electrodes) = self.vessels.get(&pos).and_then(|v| v.electrodes.clone()) else {
            return;
        };
        if electrodes.anode == pos
            || electrodes.cathode == pos
            || electrodes.anode == electrodes.cathode
        {
            log::debug!("Electrodes at {} need two other distinct vessels", pos);
            return;
        }

        let Some(mut source) = self.vessels.remove(&pos) else {
            return;
        };
        let Some(mut anode) = self.vessels.remove(&electrodes.anode) else {
            self.vessels.insert(pos, source);
            return;
        };
        let Some(mut cathode) = self.vessels.remove(&electrodes.cathode) else {
            self.vessels.insert(pos, source);
            self.vessels.insert(electrodes.anode, anode);
            return;
        };

        ReactionSystem::electrolyze(
            &mut source.mixture,
            &mut anode.mixture,
            &mut cathode.mixture,
            electrodes.current,
            &self.registry,
            &mut source.progress,
            stats,
        );

        self.vessels.insert(pos, source);
        self.vessels.insert(electrodes.anode, anode);
        self.vessels.insert(electrodes.cathode, cathode);
    }

    /// Saved form of every vessel, in tick order
    pub fn to_saved(&self) -> Vec<SavedVessel> {
        self.iter()
            .map(|(pos, vessel)| SavedVessel {
                position: pos.to_array(),
                volume: vessel.volume(),
                mixture: vessel.mixture.to_saved(),
            })
            .collect()
    }
}
