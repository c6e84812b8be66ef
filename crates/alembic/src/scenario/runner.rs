//! Run loop, counters and reporting

use std::path::Path;

use alembic_core::chemistry::Amount;
use alembic_core::vessel::SavedVessel;
use alembic_core::{SimStats, VesselNetwork};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::definition::ScenarioDefinition;
use super::verification::VerificationResult;

/// Counts what the simulation did over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub reactions: u64,
    pub transfers: u64,
    pub transferred: Amount,
    pub diffusions: u64,
    pub diffused: Amount,
}

impl SimStats for RunCounters {
    fn record_reaction(&mut self) {
        self.reactions += 1;
    }

    fn record_transfer(&mut self, amount: Amount) {
        self.transfers += 1;
        self.transferred += amount;
    }

    fn record_diffusion(&mut self, amount: Amount) {
        self.diffusions += 1;
        self.diffused += amount;
    }
}

/// Report from a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario_name: String,
    pub ticks: u64,
    pub counters: RunCounters,
    pub verification: Vec<VerificationResult>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.verification.iter().all(|r| r.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.verification.iter().filter(|r| !r.passed).count()
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Scenario '{}' after {} ticks: {} reactions | {} transfers ({} moved) | {} diffusions ({} exchanged)",
            self.scenario_name,
            self.ticks,
            self.counters.reactions,
            self.counters.transfers,
            self.counters.transferred,
            self.counters.diffusions,
            self.counters.diffused
        );
        for result in &self.verification {
            let status = if result.passed { "PASS" } else { "FAIL" };
            summary.push_str(&format!("\n  [{}] {}", status, result.message));
            if let Some(actual) = &result.actual_value {
                summary.push_str(&format!(" (actual: {})", actual));
            }
        }
        summary
    }
}

/// Saved state of a whole network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRun {
    pub scenario: String,
    pub ticks: u64,
    pub vessels: Vec<SavedVessel>,
}

/// Drives a vessel network built from a scenario
pub struct ScenarioRunner {
    scenario: ScenarioDefinition,
    network: VesselNetwork,
    counters: RunCounters,
}

impl ScenarioRunner {
    pub fn new(scenario: ScenarioDefinition, network: VesselNetwork) -> Self {
        Self {
            scenario,
            network,
            counters: RunCounters::default(),
        }
    }

    pub fn network(&self) -> &VesselNetwork {
        &self.network
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Advance `ticks` steps, logging a summary every `report_every` ticks
    pub fn run(&mut self, ticks: u32, report_every: u32) -> RunReport {
        log::info!("Running '{}' for {} ticks", self.scenario.name, ticks);

        for tick in 1..=ticks {
            self.network.tick(&mut self.counters);
            if report_every > 0 && tick % report_every == 0 {
                log_vessels(&self.network);
            }
        }
        log_vessels(&self.network);

        let verification: Vec<_> = self
            .scenario
            .verify
            .iter()
            .map(|condition| condition.check(&self.network))
            .collect();
        for result in verification.iter().filter(|r| !r.passed) {
            log::warn!(
                "Check failed: {} (actual: {})",
                result.message,
                result.actual_value.as_deref().unwrap_or("-")
            );
        }

        RunReport {
            scenario_name: self.scenario.name.clone(),
            ticks: self.network.ticks(),
            counters: self.counters,
            verification,
        }
    }

    pub fn to_saved(&self) -> SavedRun {
        SavedRun {
            scenario: self.scenario.name.clone(),
            ticks: self.network.ticks(),
            vessels: self.network.to_saved(),
        }
    }

    /// Write every vessel's mixture to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ron = ron::ser::to_string_pretty(&self.to_saved(), ron::ser::PrettyConfig::default())
            .context("Failed to serialize run to RON")?;

        std::fs::write(path, ron)
            .with_context(|| format!("Failed to write run file: {}", path.display()))?;

        log::info!("Saved {} vessels to {}", self.network.len(), path.display());
        Ok(())
    }
}

fn log_vessels(network: &VesselNetwork) {
    let catalog = network.catalog();
    log::info!("Tick {}", network.ticks());
    for (position, vessel) in network.iter() {
        let mixture = &vessel.mixture;
        let contents: Vec<String> = mixture
            .reagents()
            .map(|(id, amount)| format!("{} {}", catalog.name(id), amount))
            .collect();
        log::info!(
            "  {} {:>8.1} °C{} [{}]",
            position,
            mixture.temperature(),
            if mixture.is_burning() { " burning" } else { "" },
            contents.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use alembic_core::SimulationConfig;
    use alembic_core::mixture::Mixture;
    use glam::IVec2;

    use super::*;

    fn demo_runner(ticks: u32) -> ScenarioRunner {
        let scenario = ScenarioDefinition::demo();
        let config = SimulationConfig {
            run: alembic_core::config::RunConfig { ticks, seed: 7 },
            ..SimulationConfig::default()
        };
        let network = scenario.build(config, &[]).unwrap();
        ScenarioRunner::new(scenario, network)
    }

    #[test]
    fn test_counters_accumulate() {
        let mut counters = RunCounters::default();
        counters.record_reaction();
        counters.record_transfer(30);
        counters.record_transfer(12);
        counters.record_diffusion(5);

        assert_eq!(counters.reactions, 1);
        assert_eq!(counters.transfers, 2);
        assert_eq!(counters.transferred, 42);
        assert_eq!(counters.diffused, 5);
    }

    #[test]
    fn test_demo_passes_its_checks() {
        let mut runner = demo_runner(200);
        let report = runner.run(200, 0);

        assert_eq!(report.ticks, 200);
        assert!(report.passed(), "{}", report.summary());
        assert!(report.counters.reactions > 0);
        assert!(report.counters.diffusions > 0);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let mut a = demo_runner(60);
        let mut b = demo_runner(60);
        a.run(60, 0);
        b.run(60, 0);

        assert_eq!(a.to_saved(), b.to_saved());
        assert_eq!(a.counters(), b.counters());
    }

    #[test]
    fn test_save_writes_every_vessel() {
        let mut runner = demo_runner(5);
        runner.run(5, 0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ron");
        runner.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let saved: SavedRun = ron::from_str(&text).unwrap();
        assert_eq!(saved.ticks, 5);
        assert_eq!(saved.vessels.len(), 5);

        let cell = saved
            .vessels
            .iter()
            .find(|v| v.position == [3, 0])
            .unwrap();
        let restored = Mixture::from_saved(
            std::sync::Arc::clone(runner.network().catalog()),
            cell.volume,
            &cell.mixture,
        );
        let original = &runner.network().get(IVec2::new(3, 0)).unwrap().mixture;
        assert_eq!(restored.total_amount(), original.total_amount());
        assert!((restored.temperature() - original.temperature()).abs() < 1e-2);
    }
}
