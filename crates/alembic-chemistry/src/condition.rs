//! Reaction preconditions

use crate::{MixtureView, ReagentId, ReagentState};
use serde::{Deserialize, Serialize};

/// A condition the mixture must satisfy for a reaction to run
///
/// Ranges include their lower bound and exclude their upper bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition<R = ReagentId> {
    /// Mixture temperature range in Celsius
    Temperature {
        #[serde(default)]
        min: Option<f32>,
        #[serde(default)]
        max: Option<f32>,
    },
    /// Concentration range of one reagent, optionally only counted while it
    /// is in the given state
    Concentration {
        reagent: R,
        #[serde(default)]
        min: Option<f32>,
        #[serde(default)]
        max: Option<f32>,
        #[serde(default)]
        state: Option<ReagentState>,
    },
    /// Minimum catalyzer level
    Catalyzer { min: f32 },
}

impl Condition<ReagentId> {
    /// Temperature condition every rule gets unless it declares its own
    pub const DEFAULT_TEMPERATURE: Condition = Condition::Temperature {
        min: Some(0.0),
        max: None,
    };

    pub fn holds<V: MixtureView + ?Sized>(&self, mixture: &V) -> bool {
        match self {
            Condition::Temperature { min, max } => in_range(mixture.temperature(), *min, *max),
            Condition::Concentration {
                reagent,
                min,
                max,
                state,
            } => {
                let concentration = match state {
                    Some(state) if mixture.state_of(*reagent) != *state => 0.0,
                    _ => mixture.concentration(*reagent),
                };
                in_range(concentration, *min, *max)
            }
            Condition::Catalyzer { min } => mixture.catalyzer() >= *min,
        }
    }
}

impl<R> Condition<R> {
    pub fn is_temperature(&self) -> bool {
        matches!(self, Condition::Temperature { .. })
    }

    pub fn try_map<S, E>(
        &self,
        f: &mut dyn FnMut(&R) -> Result<S, E>,
    ) -> Result<Condition<S>, E> {
        Ok(match self {
            Condition::Temperature { min, max } => Condition::Temperature {
                min: *min,
                max: *max,
            },
            Condition::Concentration {
                reagent,
                min,
                max,
                state,
            } => Condition::Concentration {
                reagent: f(reagent)?,
                min: *min,
                max: *max,
                state: *state,
            },
            Condition::Catalyzer { min } => Condition::Catalyzer { min: *min },
        })
    }
}

fn in_range(value: f32, min: Option<f32>, max: Option<f32>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value < max)
}
