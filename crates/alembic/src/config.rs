//! Simulation configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `alembic.ron` file (if exists)
//! 3. Environment variables prefixed with `ALEMBIC_`
//!
//! Example environment variable: `ALEMBIC_DIFFUSION__RATE=0.25`

use std::path::Path;

use alembic_core::SimulationConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Base name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "alembic";

/// Load configuration from `file` (extension optional) layered over the
/// compiled defaults and under the environment
pub fn load(file: impl AsRef<Path>) -> Result<SimulationConfig> {
    let defaults = SimulationConfig::default();
    let file = file.as_ref().to_string_lossy();

    let builder = Config::builder()
        // Layer 1: Compiled defaults
        .set_default("diffusion.rate", defaults.diffusion.rate as f64)?
        .set_default(
            "diffusion.min_transfer",
            defaults.diffusion.min_transfer as i64,
        )?
        .set_default("reactions.enabled", defaults.reactions.enabled)?
        .set_default(
            "vessels.default_volume",
            defaults.vessels.default_volume as i64,
        )?
        .set_default("run.ticks", defaults.run.ticks as i64)?
        .set_default("run.seed", defaults.run.seed as i64)?
        // Layer 2: Config file (optional, won't error if missing)
        .add_source(
            File::with_name(&file)
                .format(FileFormat::Ron)
                .required(false),
        )
        // Layer 3: Environment variables (ALEMBIC_RUN__TICKS, etc.)
        .add_source(
            Environment::with_prefix("ALEMBIC")
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build().context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path().join("missing")).expect("Failed to load config");
        assert_eq!(config.diffusion.rate, 0.1);
        assert_eq!(config.vessels.default_volume, 8000);
        assert!(config.reactions.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("alembic.ron"),
            "(diffusion: (rate: 0.25), run: (ticks: 12, seed: 99))",
        )
        .unwrap();

        let config = load(dir.path().join(CONFIG_FILE)).expect("Failed to load config");
        assert_eq!(config.diffusion.rate, 0.25);
        assert_eq!(config.diffusion.min_transfer, 1);
        assert_eq!(config.run.ticks, 12);
        assert_eq!(config.run.seed, 99);
        assert_eq!(config.vessels.default_volume, 8000);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alembic.ron"), "(diffusion: (rate: ").unwrap();

        assert!(load(dir.path().join(CONFIG_FILE)).is_err());
    }
}
