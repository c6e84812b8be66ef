//! Read-only view of a mixture used by conditions and rate equations

use crate::{Amount, ReagentId, ReagentState};

/// Mixture state that reaction rules are evaluated against
///
/// Implemented by the mixture store in `alembic-core`; kept as a trait so
/// rules can be tested without a full mixture.
pub trait MixtureView {
    /// Held amount of `reagent` (0 if absent)
    fn amount(&self, reagent: ReagentId) -> Amount;

    /// Mixture temperature in Celsius
    fn temperature(&self) -> f32;

    /// Share of `reagent` in the total amount (0.0 - 1.0)
    fn concentration(&self, reagent: ReagentId) -> f32;

    /// Current state of `reagent` at the mixture temperature
    fn state_of(&self, reagent: ReagentId) -> ReagentState;

    /// Catalyzer level of the mixture
    fn catalyzer(&self) -> f32;

    /// Whether a combustion reaction kept the mixture burning last tick
    fn is_burning(&self) -> bool;

    fn contains(&self, reagent: ReagentId) -> bool {
        self.amount(reagent) > 0
    }
}
