//! # Alembic - headless reagent mixture simulation
//!
//! Loads layered configuration, builds a vessel network from a RON scenario
//! and runs it for a number of ticks.

pub mod config;
pub mod scenario;

// Re-export core modules for convenience
pub use alembic_core::chemistry;
pub use alembic_core::mixture;
pub use alembic_core::simulation;
pub use alembic_core::vessel;
