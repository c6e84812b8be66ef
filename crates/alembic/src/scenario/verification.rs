//! Verification conditions checked against a vessel network after a run

use alembic_core::VesselNetwork;
use alembic_core::chemistry::Amount;
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Conditions that can be verified against network state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerificationCondition {
    /// Assert a reagent amount in one vessel lies within a range
    AmountRange {
        position: [i32; 2],
        reagent: String,
        min: Amount,
        max: Option<Amount>,
    },

    /// Assert a reagent amount summed over every vessel lies within a range
    TotalAmountRange {
        reagent: String,
        min: Amount,
        max: Option<Amount>,
    },

    /// Assert a vessel's temperature in °C
    TemperatureRange {
        position: [i32; 2],
        min: f32,
        max: f32,
    },

    /// Assert whether a vessel is burning
    Burning { position: [i32; 2], expected: bool },

    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// Any condition must pass
    Any {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Result of a verification check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>,
}

impl VerificationResult {
    fn pass(message: String, actual: impl ToString) -> Self {
        Self {
            passed: true,
            message,
            actual_value: Some(actual.to_string()),
        }
    }

    fn fail(message: String, actual: Option<String>) -> Self {
        Self {
            passed: false,
            message,
            actual_value: actual,
        }
    }

    fn check(passed: bool, message: String, actual: impl ToString) -> Self {
        if passed {
            Self::pass(message, actual)
        } else {
            Self::fail(message, Some(actual.to_string()))
        }
    }
}

impl VerificationCondition {
    pub fn check(&self, network: &VesselNetwork) -> VerificationResult {
        match self {
            Self::AmountRange {
                position,
                reagent,
                min,
                max,
            } => {
                let message = format!(
                    "{} at {:?} in {}",
                    reagent,
                    position,
                    describe_range(*min, *max)
                );
                let Some(vessel) = network.get(IVec2::from_array(*position)) else {
                    return VerificationResult::fail(message, Some("no vessel".to_string()));
                };
                let Some(id) = network.catalog().find(reagent) else {
                    return VerificationResult::fail(message, Some("unknown reagent".to_string()));
                };
                let amount = vessel.mixture.amount(id);
                VerificationResult::check(in_range(amount, *min, *max), message, amount)
            }

            Self::TotalAmountRange { reagent, min, max } => {
                let message = format!("total {} in {}", reagent, describe_range(*min, *max));
                let Some(id) = network.catalog().find(reagent) else {
                    return VerificationResult::fail(message, Some("unknown reagent".to_string()));
                };
                let total: Amount = network
                    .iter()
                    .map(|(_, vessel)| vessel.mixture.amount(id))
                    .sum();
                VerificationResult::check(in_range(total, *min, *max), message, total)
            }

            Self::TemperatureRange { position, min, max } => {
                let message = format!("temperature at {:?} in {}..={} °C", position, min, max);
                let Some(vessel) = network.get(IVec2::from_array(*position)) else {
                    return VerificationResult::fail(message, Some("no vessel".to_string()));
                };
                let temperature = vessel.mixture.temperature();
                VerificationResult::check(
                    (*min..=*max).contains(&temperature),
                    message,
                    format!("{:.1}", temperature),
                )
            }

            Self::Burning { position, expected } => {
                let message = format!("burning at {:?} is {}", position, expected);
                let Some(vessel) = network.get(IVec2::from_array(*position)) else {
                    return VerificationResult::fail(message, Some("no vessel".to_string()));
                };
                let burning = vessel.mixture.is_burning();
                VerificationResult::check(burning == *expected, message, burning)
            }

            Self::All { conditions } => {
                let results: Vec<_> = conditions.iter().map(|c| c.check(network)).collect();
                let failed: Vec<_> = results
                    .iter()
                    .filter(|r| !r.passed)
                    .map(|r| r.message.as_str())
                    .collect();
                let message = format!("all of {} conditions", conditions.len());
                if failed.is_empty() {
                    VerificationResult::pass(message, "all passed")
                } else {
                    VerificationResult::fail(message, Some(format!("failed: {}", failed.join("; "))))
                }
            }

            Self::Any { conditions } => {
                let message = format!("any of {} conditions", conditions.len());
                match conditions.iter().map(|c| c.check(network)).find(|r| r.passed) {
                    Some(result) => VerificationResult::pass(message, result.message),
                    None => VerificationResult::fail(message, Some("none passed".to_string())),
                }
            }

            Self::Not { condition } => {
                let inner = condition.check(network);
                VerificationResult {
                    passed: !inner.passed,
                    message: format!("not ({})", inner.message),
                    actual_value: inner.actual_value,
                }
            }
        }
    }
}

fn in_range(value: Amount, min: Amount, max: Option<Amount>) -> bool {
    value >= min && max.is_none_or(|max| value <= max)
}

fn describe_range(min: Amount, max: Option<Amount>) -> String {
    match max {
        Some(max) => format!("{}..={}", min, max),
        None => format!("{}..", min),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alembic_core::chemistry::{ReactionRegistry, ReagentId, ReagentQuantity, Reagents};
    use alembic_core::{SimulationConfig, Vessel};

    use super::*;

    fn network() -> VesselNetwork {
        let catalog = Arc::new(Reagents::new());
        let mut network = VesselNetwork::new(
            Arc::clone(&catalog),
            Arc::new(ReactionRegistry::new()),
            SimulationConfig::default(),
        );
        let mut vessel = Vessel::new(Arc::clone(&catalog), 4000);
        vessel
            .mixture
            .add(&ReagentQuantity::new(ReagentId::WATER, 1500, 40.0));
        network.insert(IVec2::ZERO, vessel).unwrap();
        let mut vessel = Vessel::new(catalog, 4000);
        vessel
            .mixture
            .add(&ReagentQuantity::new(ReagentId::WATER, 500, 40.0));
        network.insert(IVec2::new(5, 0), vessel).unwrap();
        network
    }

    fn water_at(position: [i32; 2], min: Amount, max: Option<Amount>) -> VerificationCondition {
        VerificationCondition::AmountRange {
            position,
            reagent: "water".to_string(),
            min,
            max,
        }
    }

    #[test]
    fn test_amount_range() {
        let network = network();
        assert!(water_at([0, 0], 1000, Some(2000)).check(&network).passed);
        assert!(water_at([0, 0], 1000, None).check(&network).passed);

        let result = water_at([0, 0], 1600, None).check(&network);
        assert!(!result.passed);
        assert_eq!(result.actual_value.as_deref(), Some("1500"));
    }

    #[test]
    fn test_missing_vessel_fails() {
        let result = water_at([9, 9], 0, None).check(&network());
        assert!(!result.passed);
        assert_eq!(result.actual_value.as_deref(), Some("no vessel"));
    }

    #[test]
    fn test_total_amount_sums_vessels() {
        let condition = VerificationCondition::TotalAmountRange {
            reagent: "water".to_string(),
            min: 2000,
            max: Some(2000),
        };
        assert!(condition.check(&network()).passed);
    }

    #[test]
    fn test_temperature_and_burning() {
        let network = network();
        let warm = VerificationCondition::TemperatureRange {
            position: [0, 0],
            min: 39.0,
            max: 41.0,
        };
        let burning = VerificationCondition::Burning {
            position: [0, 0],
            expected: false,
        };
        assert!(warm.check(&network).passed);
        assert!(burning.check(&network).passed);
    }

    #[test]
    fn test_logical_operators() {
        let network = network();
        let pass = water_at([0, 0], 0, None);
        let fail = water_at([0, 0], 9000, None);

        let all = VerificationCondition::All {
            conditions: vec![pass.clone(), fail.clone()],
        };
        let any = VerificationCondition::Any {
            conditions: vec![fail.clone(), pass.clone()],
        };
        let not = VerificationCondition::Not {
            condition: Box::new(fail),
        };

        assert!(!all.check(&network).passed);
        assert!(any.check(&network).passed);
        assert!(not.check(&network).passed);
    }
}
