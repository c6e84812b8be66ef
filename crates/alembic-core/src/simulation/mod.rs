//! Per-tick systems operating on mixtures

mod progress;
mod reaction_system;
pub mod stats;
pub mod transfer;

pub use progress::ReactionProgress;
pub use reaction_system::ReactionSystem;
pub use stats::{NoopStats, SimStats};
pub use transfer::{diffuse, move_reagents};
