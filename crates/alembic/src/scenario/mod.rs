//! RON-defined vessel scenarios for headless runs
//!
//! - Scenario definitions: extra reagents and rules, vessel layout, contents
//! - Verification conditions checked after the last tick
//! - Run loop with counters and RON save of the final state

mod definition;
mod runner;
mod verification;

pub use definition::{ContentSpec, ElectrodeSpec, ScenarioDefinition, ScenarioError, VesselSpec};
pub use runner::{RunCounters, RunReport, SavedRun, ScenarioRunner};
pub use verification::{VerificationCondition, VerificationResult};
