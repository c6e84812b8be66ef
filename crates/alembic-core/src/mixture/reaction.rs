//! Applying reaction rules to a mixture

use alembic_chemistry::{
    Amount, Electrode, KELVIN_OFFSET, Product, ReactionId, ReactionRule, ReagentQuantity, Reagents,
    moles,
};

use super::{Mixture, Transaction};
use crate::simulation::ReactionProgress;

/// Reaction units per tick driven by one ampere of applied current
pub const ELECTROLYSIS_RATE_PER_AMPERE: f32 = 0.1;

impl Mixture {
    /// Run `rule` for as many whole units as its rate allows this tick
    ///
    /// The caller must have checked `rule.test(self)`; without it the rule
    /// still never consumes more than is held. Returns the whole units
    /// applied. The fractional rest of the rate is left in `progress`.
    pub fn apply_reaction(
        &mut self,
        id: ReactionId,
        rule: &ReactionRule,
        progress: &mut ReactionProgress,
    ) -> Amount {
        let candidate = rule.rate.evaluate(&*self) + progress.get(id);
        let (units, remainder) = self.clamp_rate(rule, candidate);
        progress.set(id, remainder);
        if units == 0 {
            return 0;
        }

        let energy = self.consume_ingredients(rule, units) + rule.energy as f64 * units as f64;
        match blended_temperature(&self.catalog, &rule.results, units, energy) {
            Some(temperature) => {
                for result in &rule.results {
                    self.add(&ReagentQuantity::new(
                        result.reagent,
                        result.amount * units,
                        temperature,
                    ));
                }
            }
            None => {
                self.energy += energy;
                self.after_mutation();
            }
        }

        if rule.is_combustion() {
            self.set_burning(true);
        }

        log::trace!("Applied {} x{}", rule.name, units);
        units
    }

    /// Run an electrolysis rule driven by `current`, routing products by polarity
    ///
    /// Ingredients come from this mixture. If a receiver cannot take all of
    /// its products the whole step is undone and retried with fewer units.
    pub fn apply_electrolysis(
        &mut self,
        id: ReactionId,
        rule: &ReactionRule,
        current: f32,
        anode: &mut Mixture,
        cathode: &mut Mixture,
        progress: &mut ReactionProgress,
    ) -> Amount {
        let candidate = current.max(0.0) * ELECTROLYSIS_RATE_PER_AMPERE + progress.get(id);
        let (mut units, remainder) = self.clamp_rate(rule, candidate);
        progress.set(id, remainder);

        while units > 0 {
            let mut txn = Transaction::open([&mut *self, &mut *anode, &mut *cathode]);
            let [source, anode, cathode] = txn.all_mut();

            let energy =
                source.consume_ingredients(rule, units) + rule.energy as f64 * units as f64;
            let Some(temperature) =
                blended_temperature(&source.catalog, &rule.results, units, energy)
            else {
                source.energy += energy;
                source.after_mutation();
                txn.commit();
                return units;
            };

            let mut offered = 0;
            let mut accepted = 0;
            for result in &rule.results {
                let receiver = match result.electrode {
                    Electrode::Anode => &mut *anode,
                    Electrode::Cathode => &mut *cathode,
                };
                let amount = result.amount * units;
                offered += amount;
                accepted += receiver.add(&ReagentQuantity::new(result.reagent, amount, temperature));
            }

            if accepted < offered {
                txn.abort();
                let reduced = (units as u128 * accepted as u128 / offered as u128) as Amount;
                log::debug!(
                    "Electrolysis {} limited by receivers: {} -> {} units",
                    rule.name,
                    units,
                    reduced
                );
                units = reduced.min(units - 1);
                continue;
            }

            txn.commit();
            return units;
        }
        0
    }

    /// Whole units to run and the fraction left over
    ///
    /// Units are capped by the held ingredients and by how many units of
    /// products the mixture can still count.
    fn clamp_rate(&self, rule: &ReactionRule, candidate: f32) -> (Amount, f32) {
        let candidate = if candidate.is_finite() {
            candidate.max(0.0)
        } else {
            0.0
        };
        let max = rule
            .max_units(self)
            .unwrap_or(Amount::MAX)
            .min(self.product_headroom(rule));

        let whole = candidate.floor();
        let units = whole as Amount;
        if units >= max {
            (max, 0.0)
        } else {
            (units, candidate - whole)
        }
    }

    /// Units of `rule` whose products still fit in an `Amount` total
    fn product_headroom(&self, rule: &ReactionRule) -> Amount {
        let per_unit = rule
            .results
            .iter()
            .fold(0, |sum: Amount, result| sum.saturating_add(result.amount));
        if per_unit == 0 {
            return Amount::MAX;
        }
        (Amount::MAX - self.total_amount) / per_unit
    }

    /// Remove `units` worth of ingredients, returning the thermal energy they carried
    fn consume_ingredients(&mut self, rule: &ReactionRule, units: Amount) -> f64 {
        let kelvin = self.kelvin();
        let mut freed = 0.0;
        for ingredient in &rule.ingredients {
            let removed = self.remove(ingredient.reagent, ingredient.amount * units);
            let heat_capacity = self.catalog.get(ingredient.reagent).heat_capacity as f64;
            freed += kelvin * moles(removed.amount) * heat_capacity;
        }
        freed
    }
}

/// Temperature the products take on when they carry `energy` between them
///
/// `None` when the products have no heat mass to carry it.
fn blended_temperature(
    catalog: &Reagents,
    results: &[Product],
    units: Amount,
    energy: f64,
) -> Option<f32> {
    let heat_mass: f64 = results
        .iter()
        .map(|result| moles(result.amount * units) * catalog.get(result.reagent).heat_capacity as f64)
        .sum();
    if heat_mass <= 0.0 {
        return None;
    }
    let kelvin = (energy / heat_mass).max(0.0);
    Some((kelvin - KELVIN_OFFSET) as f32)
}
