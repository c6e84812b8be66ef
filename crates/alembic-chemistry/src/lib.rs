//! Reagent catalog and reaction rules for Alembic
//!
//! This crate provides the foundational data types for mixture simulation:
//! - Reagent definitions (ReagentId, ReagentDef, Reagents)
//! - Physical state (ReagentState) and quantities (ReagentQuantity, Amount)
//! - Reaction rules (ReactionRule, Condition, RateEquation, ReactionFlags)
//! - Rule selection (ReactionRegistry) and rule definitions (ReactionDefinition)

mod condition;
mod definition;
mod equation;
mod quantity;
mod reactions;
mod reagents;
mod registry;
mod view;

pub use condition::Condition;
pub use definition::{
    DefinitionError, ReactionDefinition, decode_definitions, encode_definitions, load_ron,
};
pub use equation::{Rate, RateEquation};
pub use quantity::{AMOUNT_PER_MOLE, Amount, ReagentQuantity, moles};
pub use reactions::{Electrode, Ingredient, Product, ReactionFlags, ReactionRule};
pub use reagents::{KELVIN_OFFSET, ReagentDef, ReagentId, ReagentState, Reagents};
pub use registry::{ReactionId, ReactionRegistry};
pub use view::MixtureView;
