//! Saved form of a mixture
//!
//! Reagents are stored by name so saves survive catalog reordering. Unknown
//! names on load are dropped with a warning instead of failing the load.

use std::sync::Arc;

use alembic_chemistry::{Amount, Reagents};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Mixture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReagent {
    pub reagent: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMixture {
    pub reagents: Vec<SavedReagent>,
    pub energy: f64,
    #[serde(default)]
    pub burning: bool,
}

impl Mixture {
    pub fn to_saved(&self) -> SavedMixture {
        SavedMixture {
            reagents: self
                .reagents()
                .map(|(id, amount)| SavedReagent {
                    reagent: self.catalog.name(id).to_string(),
                    amount,
                })
                .collect(),
            energy: self.energy,
            burning: self.burning,
        }
    }

    /// Rebuild a mixture; `volume` makes it bounded
    pub fn from_saved(catalog: Arc<Reagents>, volume: Option<Amount>, saved: &SavedMixture) -> Self {
        let mut mixture = match volume {
            Some(volume) => Mixture::bounded(catalog, volume),
            None => Mixture::new(catalog),
        };

        for entry in &saved.reagents {
            let Some(id) = mixture.catalog.find(&entry.reagent) else {
                log::warn!("Skipping unknown reagent '{}' in saved mixture", entry.reagent);
                continue;
            };
            if entry.amount == 0 || id.is_empty() {
                continue;
            }
            *mixture.reagents.entry(id).or_insert(0) += entry.amount;
            mixture.total_amount += entry.amount;
        }

        mixture.energy = saved.energy;
        mixture.burning = saved.burning && !mixture.reagents.is_empty();
        mixture.after_mutation();
        mixture.altered = false;
        mixture
    }
}

pub fn encode_ron(saved: &SavedMixture) -> Result<String> {
    ron::ser::to_string_pretty(saved, Default::default()).context("Failed to serialize mixture")
}

pub fn decode_ron(text: &str) -> Result<SavedMixture> {
    ron::from_str(text).context("Failed to parse saved mixture")
}

pub fn encode_binary(saved: &SavedMixture) -> Result<Vec<u8>> {
    bincode_next::serde::encode_to_vec(saved, bincode_next::config::standard())
        .context("Failed to serialize mixture")
}

pub fn decode_binary(bytes: &[u8]) -> Result<SavedMixture> {
    let (saved, _): (SavedMixture, _) =
        bincode_next::serde::decode_from_slice(bytes, bincode_next::config::standard())
            .map_err(|e| anyhow::anyhow!("Failed to deserialize mixture: {:?}", e))?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use alembic_chemistry::{ReagentId, ReagentQuantity};

    use super::*;

    fn sample() -> Mixture {
        let mut mixture = Mixture::bounded(Arc::new(Reagents::new()), 8000);
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 2500, 45.0));
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 700, 45.0));
        mixture.set_burning(true);
        mixture
    }

    #[test]
    fn test_saved_form_lists_reagents_by_name() {
        let saved = sample().to_saved();
        assert_eq!(
            saved.reagents,
            vec![
                SavedReagent {
                    reagent: "water".to_string(),
                    amount: 2500,
                },
                SavedReagent {
                    reagent: "oxygen".to_string(),
                    amount: 700,
                },
            ]
        );
        assert!(saved.burning);
    }

    #[test]
    fn test_restore_preserves_state() {
        let original = sample();
        let restored = Mixture::from_saved(
            Arc::clone(original.catalog()),
            Some(8000),
            &original.to_saved(),
        );

        assert_eq!(restored.amount(ReagentId::WATER), 2500);
        assert_eq!(restored.amount(ReagentId::OXYGEN), 700);
        assert_eq!(restored.energy(), original.energy());
        assert!((restored.temperature() - 45.0).abs() < 1e-3);
        assert!(restored.is_burning());
        assert!(!restored.is_altered());
        assert_eq!(restored.volume_limit().map(|l| l.used_volume()), Some(2500));
    }

    #[test]
    fn test_unknown_reagent_skipped() {
        let mut saved = sample().to_saved();
        saved.reagents.push(SavedReagent {
            reagent: "unobtainium".to_string(),
            amount: 100,
        });

        let restored = Mixture::from_saved(Arc::new(Reagents::new()), None, &saved);
        assert_eq!(restored.total_amount(), 3200);
    }

    #[test]
    fn test_missing_burning_defaults_to_false() {
        let saved = decode_ron(r#"(reagents: [(reagent: "water", amount: 10)], energy: 200.0)"#)
            .unwrap();
        assert!(!saved.burning);
    }

    #[test]
    fn test_text_and_binary_forms() -> Result<()> {
        let saved = sample().to_saved();
        assert_eq!(decode_ron(&encode_ron(&saved)?)?, saved);
        assert_eq!(decode_binary(&encode_binary(&saved)?)?, saved);
        Ok(())
    }
}
