//! Reaction selection and application for one mixture per tick

use alembic_chemistry::{ReactionId, ReactionRegistry};
use rand::Rng;
use rand::seq::SliceRandom;

use super::{ReactionProgress, SimStats};
use crate::mixture::Mixture;

/// Handles selecting and running reactions
pub struct ReactionSystem;

impl ReactionSystem {
    /// Run every currently valid reaction once, in random order
    ///
    /// Each rule is re-tested right before it runs since an earlier rule may
    /// have used up its ingredients. The mixture keeps burning only if a
    /// combustion rule ran. Returns the number of rules that ran.
    pub fn react<R: Rng + ?Sized>(
        mixture: &mut Mixture,
        registry: &ReactionRegistry,
        progress: &mut ReactionProgress,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> usize {
        let mut valid: Vec<ReactionId> = registry.valid_reactions(&*mixture);
        valid.shuffle(rng);

        let mut applied = 0;
        let mut combustion = false;
        for id in valid {
            let Some(rule) = registry.get(id) else {
                continue;
            };
            if !rule.test(&*mixture) {
                continue;
            }

            let units = mixture.apply_reaction(id, rule, progress);
            applied += 1;
            combustion |= rule.is_combustion();
            if units > 0 {
                stats.record_reaction();
            }
        }

        mixture.set_burning(combustion);
        applied
    }

    /// Drive every applicable electrolysis rule with `current`
    ///
    /// Returns the number of rules that produced at least one unit.
    pub fn electrolyze(
        source: &mut Mixture,
        anode: &mut Mixture,
        cathode: &mut Mixture,
        current: f32,
        registry: &ReactionRegistry,
        progress: &mut ReactionProgress,
        stats: &mut dyn SimStats,
    ) -> usize {
        let mut ran = 0;
        for id in registry.electrolysis_reactions(&*source) {
            let Some(rule) = registry.get(id) else {
                continue;
            };
            if !rule.test(&*source) {
                continue;
            }
            if source.apply_electrolysis(id, rule, current, anode, cathode, progress) > 0 {
                stats.record_reaction();
                ran += 1;
            }
        }
        ran
    }
}
