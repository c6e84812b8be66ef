//! Reaction rules
//!
//! A rule turns whole multiples of its ingredients into whole multiples of
//! its results. How many multiples run per tick is decided by its rate.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{Amount, Condition, MixtureView, Rate, ReagentId};

bitflags! {
    /// Behaviour flags of a reaction
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ReactionFlags: u8 {
        /// Keeps the mixture burning while it runs
        const COMBUSTION = 1 << 0;
        /// Only runs when driven by an applied current
        const ELECTROLYSIS = 1 << 1;
    }
}

/// Which receiver an electrolysis product is routed to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Electrode {
    Anode,
    #[default]
    Cathode,
}

/// Amount of a reagent consumed per reaction unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient<R = ReagentId> {
    pub reagent: R,
    pub amount: Amount,
}

/// Amount of a reagent produced per reaction unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product<R = ReagentId> {
    pub reagent: R,
    pub amount: Amount,
    #[serde(default)]
    pub electrode: Electrode,
}

/// Compiled reaction rule with reagent handles
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionRule {
    /// Human-readable name
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub results: Vec<Product>,
    pub conditions: Vec<Condition>,
    pub flags: ReactionFlags,
    /// Energy released per reaction unit in joules (negative = endothermic)
    pub energy: i64,
    pub rate: Rate,
}

impl ReactionRule {
    /// Build a rule, adding the default temperature condition when none is given
    pub fn new(
        name: &str,
        ingredients: Vec<Ingredient>,
        results: Vec<Product>,
        mut conditions: Vec<Condition>,
        flags: ReactionFlags,
        energy: i64,
        rate: Rate,
    ) -> Self {
        if !conditions.iter().any(Condition::is_temperature) {
            conditions.push(Condition::DEFAULT_TEMPERATURE);
        }

        Self {
            name: name.to_string(),
            ingredients,
            results,
            conditions,
            flags,
            energy,
            rate,
        }
    }

    pub fn is_combustion(&self) -> bool {
        self.flags.contains(ReactionFlags::COMBUSTION)
    }

    pub fn is_electrolysis(&self) -> bool {
        self.flags.contains(ReactionFlags::ELECTROLYSIS)
    }

    /// Every ingredient is present in some amount
    pub fn ingredients_present<V: MixtureView + ?Sized>(&self, mixture: &V) -> bool {
        self.ingredients
            .iter()
            .all(|ingredient| mixture.contains(ingredient.reagent))
    }

    /// Whether the rule can run on `mixture` right now
    ///
    /// A burning mixture no longer needs to meet the temperature conditions
    /// of its combustion rules.
    pub fn test<V: MixtureView + ?Sized>(&self, mixture: &V) -> bool {
        if self
            .ingredients
            .iter()
            .any(|ingredient| mixture.amount(ingredient.reagent) < ingredient.amount)
        {
            return false;
        }

        let burning = self.is_combustion() && mixture.is_burning();
        self.conditions
            .iter()
            .filter(|condition| !(burning && condition.is_temperature()))
            .all(|condition| condition.holds(mixture))
    }

    /// Largest whole number of units the held ingredients allow
    ///
    /// `None` when the rule has no ingredients and is therefore unbounded.
    pub fn max_units<V: MixtureView + ?Sized>(&self, mixture: &V) -> Option<Amount> {
        self.ingredients
            .iter()
            .filter(|ingredient| ingredient.amount > 0)
            .map(|ingredient| mixture.amount(ingredient.reagent) / ingredient.amount)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::fake::FakeMixture;

    fn sulfur_burning() -> ReactionRule {
        ReactionRule::new(
            "sulfur_burning",
            vec![
                Ingredient {
                    reagent: ReagentId::SULFUR,
                    amount: 1000,
                },
                Ingredient {
                    reagent: ReagentId::OXYGEN,
                    amount: 2000,
                },
            ],
            vec![Product {
                reagent: ReagentId::SULFUR_DIOXIDE,
                amount: 1000,
                electrode: Electrode::default(),
            }],
            vec![Condition::Temperature {
                min: Some(250.0),
                max: None,
            }],
            ReactionFlags::COMBUSTION,
            297_000,
            Rate::Fixed(1),
        )
    }

    #[test]
    fn test_default_temperature_condition_added() {
        let rule = ReactionRule::new(
            "noop",
            vec![],
            vec![],
            vec![Condition::Catalyzer { min: 1.0 }],
            ReactionFlags::empty(),
            0,
            Rate::Fixed(1),
        );
        assert!(rule.conditions.contains(&Condition::DEFAULT_TEMPERATURE));

        // An explicit temperature condition is kept as the only one
        let rule = sulfur_burning();
        assert_eq!(
            rule.conditions.iter().filter(|c| c.is_temperature()).count(),
            1
        );
    }

    #[test]
    fn test_insufficient_ingredients_fail_fast() {
        let rule = sulfur_burning();
        let mixture = FakeMixture::with(
            &[(ReagentId::SULFUR, 1000), (ReagentId::OXYGEN, 1999)],
            300.0,
        );
        assert!(rule.ingredients_present(&mixture));
        assert!(!rule.test(&mixture));
    }

    #[test]
    fn test_temperature_gate() {
        let rule = sulfur_burning();
        let cold = FakeMixture::with(
            &[(ReagentId::SULFUR, 1000), (ReagentId::OXYGEN, 2000)],
            20.0,
        );
        assert!(!rule.test(&cold));

        let hot = FakeMixture::with(
            &[(ReagentId::SULFUR, 1000), (ReagentId::OXYGEN, 2000)],
            300.0,
        );
        assert!(rule.test(&hot));
    }

    #[test]
    fn test_burning_mixture_skips_temperature() {
        let rule = sulfur_burning();
        let mut mixture = FakeMixture::with(
            &[(ReagentId::SULFUR, 1000), (ReagentId::OXYGEN, 2000)],
            20.0,
        );
        mixture.burning = true;
        assert!(rule.test(&mixture));
    }

    #[test]
    fn test_burning_does_not_exempt_non_combustion() {
        let mut rule = sulfur_burning();
        rule.flags = ReactionFlags::empty();
        let mut mixture = FakeMixture::with(
            &[(ReagentId::SULFUR, 1000), (ReagentId::OXYGEN, 2000)],
            20.0,
        );
        mixture.burning = true;
        assert!(!rule.test(&mixture));
    }

    #[test]
    fn test_max_units() {
        let rule = sulfur_burning();
        let mixture = FakeMixture::with(
            &[(ReagentId::SULFUR, 5000), (ReagentId::OXYGEN, 20000)],
            20.0,
        );
        assert_eq!(rule.max_units(&mixture), Some(5));

        let unbounded = ReactionRule::new(
            "spawn",
            vec![],
            vec![],
            vec![],
            ReactionFlags::empty(),
            0,
            Rate::Fixed(1),
        );
        assert_eq!(unbounded.max_units(&mixture), None);
    }
}
