//! Mixture store - reagent amounts plus aggregate thermal energy
//!
//! Energy is tracked for the whole mixture, not per reagent: everything in a
//! mixture shares one temperature, `energy / heat_mass` in Kelvin.

mod persistence;
mod reaction;
mod transaction;
mod volume;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use alembic_chemistry::{
    Amount, KELVIN_OFFSET, MixtureView, ReagentId, ReagentQuantity, ReagentState, Reagents, moles,
};

pub use persistence::{
    SavedMixture, SavedReagent, decode_binary, decode_ron, encode_binary, encode_ron,
};
pub use reaction::ELECTROLYSIS_RATE_PER_AMPERE;
pub use transaction::Transaction;
pub use volume::VolumeLimit;

/// A container's worth of reagents
#[derive(Clone)]
pub struct Mixture {
    catalog: Arc<Reagents>,
    reagents: BTreeMap<ReagentId, Amount>,
    total_amount: Amount,
    /// Thermal capacity in J/K
    heat_mass: f64,
    /// Thermal energy in J
    energy: f64,
    burning: bool,
    catalyzer: f32,
    /// Set by every mutation; cleared by whoever persists the mixture
    altered: bool,
    limit: Option<VolumeLimit>,
}

/// Copy of everything a transaction may need to restore
#[derive(Clone, Debug)]
pub(crate) struct MixtureSnapshot {
    reagents: BTreeMap<ReagentId, Amount>,
    total_amount: Amount,
    heat_mass: f64,
    energy: f64,
    burning: bool,
    altered: bool,
}

impl Mixture {
    /// Empty mixture without a volume limit
    pub fn new(catalog: Arc<Reagents>) -> Self {
        Self {
            catalog,
            reagents: BTreeMap::new(),
            total_amount: 0,
            heat_mass: 0.0,
            energy: 0.0,
            burning: false,
            catalyzer: 0.0,
            altered: false,
            limit: None,
        }
    }

    /// Empty mixture holding at most `volume` of liquids and solids
    pub fn bounded(catalog: Arc<Reagents>, volume: Amount) -> Self {
        Self {
            limit: Some(VolumeLimit::new(volume)),
            ..Self::new(catalog)
        }
    }

    pub fn catalog(&self) -> &Arc<Reagents> {
        &self.catalog
    }

    pub fn amount(&self, reagent: ReagentId) -> Amount {
        self.reagents.get(&reagent).copied().unwrap_or(0)
    }

    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    pub fn heat_mass(&self) -> f64 {
        self.heat_mass
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Absolute temperature; an empty mixture reads as 0°C
    pub fn kelvin(&self) -> f64 {
        if self.heat_mass > 0.0 {
            self.energy / self.heat_mass
        } else {
            KELVIN_OFFSET
        }
    }

    /// Temperature in Celsius
    pub fn temperature(&self) -> f32 {
        (self.kelvin() - KELVIN_OFFSET) as f32
    }

    pub fn concentration(&self, reagent: ReagentId) -> f32 {
        if self.total_amount == 0 {
            0.0
        } else {
            (self.amount(reagent) as f64 / self.total_amount as f64) as f32
        }
    }

    pub fn state_of(&self, reagent: ReagentId) -> ReagentState {
        self.catalog.get(reagent).state_at(self.temperature())
    }

    /// Held reagents in id order
    pub fn reagents(&self) -> impl Iterator<Item = (ReagentId, Amount)> + '_ {
        self.reagents.iter().map(|(&id, &amount)| (id, amount))
    }

    /// Held reagents currently in `state`
    pub fn reagents_in_state(&self, state: ReagentState) -> Vec<ReagentId> {
        let temperature = self.temperature();
        self.reagents
            .keys()
            .copied()
            .filter(|&id| self.catalog.get(id).state_at(temperature) == state)
            .collect()
    }

    /// Total held amount of reagents currently in `state`
    pub fn amount_in_state(&self, state: ReagentState) -> Amount {
        let temperature = self.temperature();
        self.reagents
            .iter()
            .filter(|&(&id, _)| self.catalog.get(id).state_at(temperature) == state)
            .map(|(_, &amount)| amount)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_amount == 0
    }

    pub fn is_burning(&self) -> bool {
        self.burning
    }

    pub fn set_burning(&mut self, burning: bool) {
        if self.burning != burning {
            self.burning = burning;
            self.altered = true;
        }
    }

    pub fn catalyzer(&self) -> f32 {
        self.catalyzer
    }

    pub fn set_catalyzer(&mut self, catalyzer: f32) {
        self.catalyzer = catalyzer.max(0.0);
    }

    /// Whether persisted state changed since the flag was last cleared
    pub fn is_altered(&self) -> bool {
        self.altered
    }

    pub fn clear_altered(&mut self) {
        self.altered = false;
    }

    pub fn volume_limit(&self) -> Option<&VolumeLimit> {
        self.limit.as_ref()
    }

    /// How much of `stack` this mixture would take right now
    ///
    /// Reagents missing from the catalog are never taken.
    pub fn accepts(&self, stack: &ReagentQuantity) -> Amount {
        if !self.catalog.contains(stack.reagent) {
            return 0;
        }
        match &self.limit {
            Some(limit) => {
                let state = self.catalog.get(stack.reagent).state_at(stack.temperature);
                limit.accepts(state, stack.amount)
            }
            None => stack.amount,
        }
    }

    /// Add as much of `stack` as is accepted, returning the amount added
    pub fn add(&mut self, stack: &ReagentQuantity) -> Amount {
        if stack.is_empty() {
            return 0;
        }

        let added = self
            .accepts(stack)
            .min(stack.amount)
            .min(Amount::MAX - self.total_amount);
        if added == 0 {
            return 0;
        }

        let heat_capacity = self.catalog.get(stack.reagent).heat_capacity as f64;
        self.energy +=
            (stack.temperature as f64 + KELVIN_OFFSET) * moles(added) * heat_capacity;
        *self.reagents.entry(stack.reagent).or_insert(0) += added;
        self.total_amount += added;
        self.after_mutation();
        added
    }

    /// Remove up to `amount` of `reagent` at the current temperature
    pub fn remove(&mut self, reagent: ReagentId, amount: Amount) -> ReagentQuantity {
        let temperature = self.temperature();
        let held = self.amount(reagent);
        let removed = amount.min(held);
        if removed == 0 {
            return ReagentQuantity::new(reagent, 0, temperature);
        }

        let heat_capacity = self.catalog.get(reagent).heat_capacity as f64;
        self.energy -= self.kelvin() * moles(removed) * heat_capacity;
        if removed == held {
            self.reagents.remove(&reagent);
        } else {
            *self.reagents.entry(reagent).or_insert(0) -= removed;
        }
        self.total_amount -= removed;
        self.after_mutation();
        ReagentQuantity::new(reagent, removed, temperature)
    }

    /// Add every reagent of `other` at its temperature, returning the total added
    pub fn add_mixture(&mut self, other: &Mixture) -> Amount {
        let temperature = other.temperature();
        other
            .reagents()
            .map(|(reagent, amount)| self.add(&ReagentQuantity::new(reagent, amount, temperature)))
            .sum()
    }

    /// Remove up to `amount` in total from the given reagents
    ///
    /// The request is split in proportion to each reagent's share of the
    /// selection, so the extracted mixture keeps the selection's relative
    /// concentrations. Every held reagent gets at least one unit while budget
    /// remains.
    pub fn remove_from(&mut self, reagents: &[ReagentId], amount: Amount) -> Mixture {
        let selection: Vec<(ReagentId, Amount)> = reagents
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|id| (id, self.amount(id)))
            .filter(|&(_, held)| held > 0)
            .collect();
        let selection_total: Amount = selection.iter().map(|&(_, held)| held).sum();

        let mut extracted = Mixture::new(Arc::clone(&self.catalog));
        if selection_total == 0 || amount == 0 {
            return extracted;
        }

        let request = amount.min(selection_total);
        let mut budget = request;
        for (reagent, held) in selection {
            if budget == 0 {
                break;
            }
            let share = proportional_share(request, held, selection_total)
                .max(1)
                .min(budget)
                .min(held);
            let removed = self.remove(reagent, share);
            budget -= removed.amount;
            extracted.add(&removed);
        }
        extracted
    }

    /// Add or withdraw heat directly (joules)
    pub fn heat(&mut self, joules: f64) {
        if self.heat_mass <= 0.0 || joules == 0.0 {
            return;
        }
        self.energy += joules;
        self.after_mutation();
    }

    /// Copy with every amount multiplied by `factor` at the same temperature
    pub fn scaled_by(&self, factor: f64) -> Mixture {
        let kelvin = self.kelvin();
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };

        let mut scaled = Mixture::new(Arc::clone(&self.catalog));
        scaled.burning = self.burning;
        scaled.catalyzer = self.catalyzer;
        for (reagent, amount) in self.reagents() {
            let amount = (amount as f64 * factor).round() as Amount;
            if amount > 0 {
                scaled.reagents.insert(reagent, amount);
                scaled.total_amount += amount;
            }
        }
        scaled.recompute_heat_mass();
        scaled.energy = kelvin * scaled.heat_mass;
        scaled.refresh_limit();
        scaled
    }

    /// Copy scaled so its total amount is `target` at the same temperature
    pub fn scaled_to(&self, target: Amount) -> Mixture {
        if self.total_amount == 0 {
            return self.scaled_by(0.0);
        }
        self.scaled_by(target as f64 / self.total_amount as f64)
    }

    pub(crate) fn snapshot(&self) -> MixtureSnapshot {
        MixtureSnapshot {
            reagents: self.reagents.clone(),
            total_amount: self.total_amount,
            heat_mass: self.heat_mass,
            energy: self.energy,
            burning: self.burning,
            altered: self.altered,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: MixtureSnapshot) {
        self.reagents = snapshot.reagents;
        self.total_amount = snapshot.total_amount;
        self.heat_mass = snapshot.heat_mass;
        self.energy = snapshot.energy;
        self.burning = snapshot.burning;
        self.altered = snapshot.altered;
        self.refresh_limit();
    }

    /// Re-derive aggregates after the reagent map or energy changed
    fn after_mutation(&mut self) {
        self.recompute_heat_mass();
        if self.total_amount == 0 || self.heat_mass <= 0.0 {
            self.energy = 0.0;
        } else {
            self.energy = self.energy.max(0.0);
        }
        self.refresh_limit();
        self.altered = true;
    }

    fn recompute_heat_mass(&mut self) {
        self.heat_mass = self
            .reagents
            .iter()
            .map(|(&id, &amount)| moles(amount) * self.catalog.get(id).heat_capacity as f64)
            .sum();
    }

    fn refresh_limit(&mut self) {
        let temperature = self.temperature();
        if let Some(limit) = &mut self.limit {
            limit.refresh(&self.catalog, &self.reagents, temperature);
        }
    }
}

/// `request * held / total`, rounded to nearest
fn proportional_share(request: Amount, held: Amount, total: Amount) -> Amount {
    let total = total as u128;
    ((request as u128 * held as u128 + total / 2) / total) as Amount
}

impl MixtureView for Mixture {
    fn amount(&self, reagent: ReagentId) -> Amount {
        Mixture::amount(self, reagent)
    }

    fn temperature(&self) -> f32 {
        Mixture::temperature(self)
    }

    fn concentration(&self, reagent: ReagentId) -> f32 {
        Mixture::concentration(self, reagent)
    }

    fn state_of(&self, reagent: ReagentId) -> ReagentState {
        Mixture::state_of(self, reagent)
    }

    fn catalyzer(&self) -> f32 {
        self.catalyzer
    }

    fn is_burning(&self) -> bool {
        self.burning
    }
}

impl fmt::Debug for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: Vec<_> = self
            .reagents()
            .map(|(id, amount)| (self.catalog.name(id).to_string(), amount))
            .collect();
        f.debug_struct("Mixture")
            .field("contents", &contents)
            .field("temperature", &self.temperature())
            .field("burning", &self.burning)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<Reagents> {
        Arc::new(Reagents::new())
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_add_to_empty_takes_stack_temperature() {
        let mut mixture = Mixture::new(catalog());
        let added = mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 22.0));

        assert_eq!(added, 1000);
        assert_eq!(mixture.amount(ReagentId::WATER), 1000);
        assert_eq!(mixture.total_amount(), 1000);
        assert_close(mixture.temperature(), 22.0);
        assert!(mixture.is_altered());
    }

    #[test]
    fn test_empty_mixture_reads_zero_celsius() {
        let mixture = Mixture::new(catalog());
        assert_eq!(mixture.temperature(), 0.0);
        assert_eq!(mixture.heat_mass(), 0.0);
        assert_eq!(mixture.concentration(ReagentId::WATER), 0.0);
    }

    #[test]
    fn test_add_empty_reagent_is_noop() {
        let mut mixture = Mixture::new(catalog());
        assert_eq!(
            mixture.add(&ReagentQuantity::new(ReagentId::EMPTY, 1000, 20.0)),
            0
        );
        assert!(mixture.is_empty());
        assert!(!mixture.is_altered());
    }

    #[test]
    fn test_add_unregistered_reagent_is_noop() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 20.0));
        mixture.clear_altered();
        let energy = mixture.energy();

        let stray = ReagentQuantity::new(ReagentId(999), 1000, 20.0);
        assert_eq!(mixture.accepts(&stray), 0);
        assert_eq!(mixture.add(&stray), 0);
        assert_eq!(mixture.total_amount(), 1000);
        assert_eq!(mixture.amount(ReagentId(999)), 0);
        assert_close(mixture.concentration(ReagentId::WATER), 1.0);
        assert_eq!(mixture.energy(), energy);
        assert!(!mixture.is_altered());
        assert_eq!(mixture.to_saved().reagents.len(), 1);
    }

    #[test]
    fn test_handles_beyond_a_smaller_catalog_are_refused() {
        let mut mixture = Mixture::bounded(Arc::new(Reagents::empty()), 10_000);
        assert_eq!(
            mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 20.0)),
            0
        );
        assert!(mixture.is_empty());
    }

    #[test]
    fn test_blended_temperature_is_energy_weighted() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 1000, 100.0));
        mixture.add(&ReagentQuantity::new(ReagentId::NITROGEN, 1000, 0.0));

        let cp_o2 = 29.37_f32 as f64;
        let cp_n2 = 29.12_f32 as f64;
        let energy = (100.0 + KELVIN_OFFSET) * cp_o2 + KELVIN_OFFSET * cp_n2;
        let expected = energy / (cp_o2 + cp_n2) - KELVIN_OFFSET;

        assert!((mixture.energy() - energy).abs() < 1e-6);
        assert_close(mixture.temperature(), expected as f32);
    }

    #[test]
    fn test_concentrations_sum_to_one() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 333, 20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::NITROGEN, 1234, 20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 7, 20.0));

        let sum: f32 = mixture
            .reagents()
            .map(|(id, _)| mixture.concentration(id))
            .sum();
        assert_close(sum, 1.0);
    }

    #[test]
    fn test_remove_more_than_held_clamps() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1500, 40.0));
        mixture.add(&ReagentQuantity::new(ReagentId::SULFUR, 500, 40.0));

        let removed = mixture.remove(ReagentId::WATER, 1500 + 1000);
        assert_eq!(removed.amount, 1500);
        assert_close(removed.temperature, 40.0);
        assert_eq!(mixture.amount(ReagentId::WATER), 0);
        assert!(mixture.reagents().all(|(id, _)| id != ReagentId::WATER));
        // Temperature of what is left is unchanged
        assert_close(mixture.temperature(), 40.0);
    }

    #[test]
    fn test_remove_everything_zeroes_energy() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 80.0));
        mixture.remove(ReagentId::WATER, 1000);
        assert!(mixture.is_empty());
        assert_eq!(mixture.energy(), 0.0);
        assert_eq!(mixture.heat_mass(), 0.0);
    }

    #[test]
    fn test_remove_absent_returns_nothing() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 20.0));
        mixture.clear_altered();

        let removed = mixture.remove(ReagentId::OXYGEN, 100);
        assert_eq!(removed.amount, 0);
        assert!(!mixture.is_altered());
    }

    #[test]
    fn test_remove_from_keeps_relative_concentrations() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 3000, 20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::NITROGEN, 1000, 20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 5000, 20.0));

        let extracted =
            mixture.remove_from(&[ReagentId::OXYGEN, ReagentId::NITROGEN], 2000);
        assert_eq!(extracted.amount(ReagentId::OXYGEN), 1500);
        assert_eq!(extracted.amount(ReagentId::NITROGEN), 500);
        assert_eq!(extracted.amount(ReagentId::WATER), 0);
        assert_close(extracted.temperature(), 20.0);

        assert_eq!(mixture.amount(ReagentId::OXYGEN), 1500);
        assert_eq!(mixture.amount(ReagentId::NITROGEN), 500);
        assert_eq!(mixture.amount(ReagentId::WATER), 5000);
    }

    #[test]
    fn test_remove_from_gives_trace_reagents_at_least_one_unit() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 10_000, 20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::NITROGEN, 1, 20.0));

        let extracted =
            mixture.remove_from(&[ReagentId::OXYGEN, ReagentId::NITROGEN], 10);
        assert_eq!(extracted.amount(ReagentId::NITROGEN), 1);
        assert!(extracted.total_amount() <= 10);
    }

    #[test]
    fn test_remove_from_never_exceeds_request() {
        let mut mixture = Mixture::new(catalog());
        for (id, amount) in [
            (ReagentId::OXYGEN, 7),
            (ReagentId::NITROGEN, 7),
            (ReagentId::HYDROGEN, 7),
        ] {
            mixture.add(&ReagentQuantity::new(id, amount, 20.0));
        }

        let extracted = mixture.remove_from(
            &[ReagentId::OXYGEN, ReagentId::NITROGEN, ReagentId::HYDROGEN],
            2,
        );
        assert_eq!(extracted.total_amount(), 2);
        assert_eq!(mixture.total_amount(), 19);
    }

    #[test]
    fn test_add_mixture_conserves_energy() {
        let mut hot = Mixture::new(catalog());
        hot.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 90.0));
        let mut cold = Mixture::new(catalog());
        cold.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 10.0));

        let total_energy = hot.energy() + cold.energy();
        assert_eq!(cold.add_mixture(&hot), 1000);
        assert!((cold.energy() - total_energy).abs() < 1e-6);
        assert_close(cold.temperature(), 50.0);
    }

    #[test]
    fn test_scaling_preserves_temperature() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 35.0));
        mixture.add(&ReagentQuantity::new(ReagentId::SULFUR, 3000, 35.0));

        let doubled = mixture.scaled_by(2.0);
        assert_eq!(doubled.amount(ReagentId::WATER), 2000);
        assert_eq!(doubled.amount(ReagentId::SULFUR), 6000);
        assert_close(doubled.temperature(), mixture.temperature());

        let back = doubled.scaled_by(0.5);
        assert_eq!(back.amount(ReagentId::WATER), 1000);
        assert_eq!(back.amount(ReagentId::SULFUR), 3000);
        assert_close(back.temperature(), mixture.temperature());
    }

    #[test]
    fn test_scaled_to_target_total() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::OXYGEN, 1000, -20.0));
        mixture.add(&ReagentQuantity::new(ReagentId::NITROGEN, 3000, -20.0));

        let scaled = mixture.scaled_to(1000);
        assert_eq!(scaled.total_amount(), 1000);
        assert_eq!(scaled.amount(ReagentId::OXYGEN), 250);
        assert_close(scaled.temperature(), -20.0);
    }

    #[test]
    fn test_state_follows_temperature() {
        let mut mixture = Mixture::new(catalog());
        mixture.add(&ReagentQuantity::new(ReagentId::WATER, 1000, 50.0));
        assert_eq!(mixture.state_of(ReagentId::WATER), ReagentState::Liquid);
        assert_eq!(mixture.reagents_in_state(ReagentState::Liquid), vec![ReagentId::WATER]);

        // 75.3 J/K per mole; push it well past boiling
        mixture.heat(75.3 * 100.0);
        assert_eq!(mixture.state_of(ReagentId::WATER), ReagentState::Gas);
        assert_eq!(mixture.amount_in_state(ReagentState::Gas), 1000);
    }
}
