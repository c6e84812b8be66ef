//! Reaction registry and selection
//!
//! Selection runs in two passes: a cheap presence filter over every rule's
//! ingredients, then the full `test` on the survivors.

use ahash::AHashMap;

use crate::{
    Amount, Condition, DefinitionError, Electrode, Ingredient, MixtureView, Product, Rate,
    RateEquation, ReactionDefinition, ReactionFlags, ReactionRule, ReagentId, Reagents,
};

/// Index of a rule in the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReactionId(pub u32);

/// Registry of all reaction rules
#[derive(Debug)]
pub struct ReactionRegistry {
    reactions: Vec<ReactionRule>,
    by_name: AHashMap<String, ReactionId>,
}

impl ReactionRegistry {
    /// Registry pre-populated with the built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_default_reactions();
        registry
    }

    pub fn empty() -> Self {
        Self {
            reactions: Vec::new(),
            by_name: AHashMap::new(),
        }
    }

    fn register_default_reactions(&mut self) {
        // S + O2 → SO2
        self.register(ReactionRule::new(
            "sulfur_combustion",
            vec![
                ingredient(ReagentId::SULFUR, 1000),
                ingredient(ReagentId::OXYGEN, 1000),
            ],
            vec![product(ReagentId::SULFUR_DIOXIDE, 1000)],
            vec![Condition::Temperature {
                min: Some(232.0),
                max: None,
            }],
            ReactionFlags::COMBUSTION,
            297_000,
            Rate::Equation(RateEquation::Multiply(vec![
                RateEquation::Constant(20.0),
                RateEquation::Concentration(ReagentId::OXYGEN),
            ])),
        ));

        // 2 H2 + O2 → 2 H2O
        self.register(ReactionRule::new(
            "hydrogen_combustion",
            vec![
                ingredient(ReagentId::HYDROGEN, 2000),
                ingredient(ReagentId::OXYGEN, 1000),
            ],
            vec![product(ReagentId::WATER, 2000)],
            vec![Condition::Temperature {
                min: Some(500.0),
                max: None,
            }],
            ReactionFlags::COMBUSTION,
            483_600,
            Rate::Equation(RateEquation::Multiply(vec![
                RateEquation::Constant(40.0),
                RateEquation::Concentration(ReagentId::HYDROGEN),
                RateEquation::Concentration(ReagentId::OXYGEN),
            ])),
        ));

        // CH4 + 2 O2 → CO2 + 2 H2O
        self.register(ReactionRule::new(
            "methane_combustion",
            vec![
                ingredient(ReagentId::METHANE, 1000),
                ingredient(ReagentId::OXYGEN, 2000),
            ],
            vec![
                product(ReagentId::CARBON_DIOXIDE, 1000),
                product(ReagentId::WATER, 2000),
            ],
            vec![Condition::Temperature {
                min: Some(580.0),
                max: None,
            }],
            ReactionFlags::COMBUSTION,
            802_300,
            Rate::Equation(RateEquation::Multiply(vec![
                RateEquation::Constant(30.0),
                RateEquation::Concentration(ReagentId::METHANE),
            ])),
        ));

        // 2 Na + Cl2 → 2 NaCl
        self.register(ReactionRule::new(
            "sodium_chlorination",
            vec![
                ingredient(ReagentId::SODIUM, 2000),
                ingredient(ReagentId::CHLORINE, 1000),
            ],
            vec![product(ReagentId::SODIUM_CHLORIDE, 2000)],
            vec![],
            ReactionFlags::empty(),
            822_000,
            Rate::Fixed(2),
        ));

        // 4 Fe + 3 O2 → 2 Fe2O3, only while wet
        self.register(ReactionRule::new(
            "iron_rusting",
            vec![
                ingredient(ReagentId::IRON, 4000),
                ingredient(ReagentId::OXYGEN, 3000),
            ],
            vec![product(ReagentId::IRON_OXIDE, 2000)],
            vec![Condition::Concentration {
                reagent: ReagentId::WATER,
                min: Some(0.05),
                max: None,
                state: Some(crate::ReagentState::Liquid),
            }],
            ReactionFlags::empty(),
            1_648_000,
            Rate::Equation(RateEquation::Polynomial {
                input: Box::new(RateEquation::Concentration(ReagentId::WATER)),
                coefficients: vec![0.0, 0.2],
            }),
        ));

        // 2 H2O → 2 H2 (cathode) + O2 (anode)
        self.register(ReactionRule::new(
            "water_electrolysis",
            vec![ingredient(ReagentId::WATER, 2000)],
            vec![
                electrode_product(ReagentId::HYDROGEN, 2000, Electrode::Cathode),
                electrode_product(ReagentId::OXYGEN, 1000, Electrode::Anode),
            ],
            vec![],
            ReactionFlags::ELECTROLYSIS,
            // The supply provides the enthalpy
            0,
            Rate::Fixed(1),
        ));

        // 2 NaCl + 2 H2O → 2 NaOH + H2 (cathode) + Cl2 (anode)
        self.register(ReactionRule::new(
            "brine_electrolysis",
            vec![
                ingredient(ReagentId::SODIUM_CHLORIDE, 2000),
                ingredient(ReagentId::WATER, 2000),
            ],
            vec![
                electrode_product(ReagentId::SODIUM_HYDROXIDE, 2000, Electrode::Cathode),
                electrode_product(ReagentId::HYDROGEN, 1000, Electrode::Cathode),
                electrode_product(ReagentId::CHLORINE, 1000, Electrode::Anode),
            ],
            vec![],
            ReactionFlags::ELECTROLYSIS,
            0,
            Rate::Fixed(1),
        ));
    }

    /// Register a rule and return its id
    ///
    /// A rule reusing an existing name replaces that rule in place.
    pub fn register(&mut self, rule: ReactionRule) -> ReactionId {
        if let Some(&existing) = self.by_name.get(&rule.name) {
            log::debug!("Replacing reaction '{}'", rule.name);
            self.reactions[existing.0 as usize] = rule;
            return existing;
        }

        let id = ReactionId(self.reactions.len() as u32);
        self.by_name.insert(rule.name.clone(), id);
        self.reactions.push(rule);
        id
    }

    /// Compile and register rule definitions
    pub fn register_definitions(
        &mut self,
        definitions: &[ReactionDefinition],
        reagents: &Reagents,
    ) -> Result<Vec<ReactionId>, DefinitionError> {
        let rules = definitions
            .iter()
            .map(|definition| definition.compile(reagents))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rules.into_iter().map(|rule| self.register(rule)).collect())
    }

    pub fn get(&self, id: ReactionId) -> Option<&ReactionRule> {
        self.reactions.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<ReactionId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionId, &ReactionRule)> {
        self.reactions
            .iter()
            .enumerate()
            .map(|(i, rule)| (ReactionId(i as u32), rule))
    }

    /// Ordinary rules whose every ingredient is present in any amount
    ///
    /// O(rules × ingredients); no quantity or condition checks.
    pub fn candidates<V: MixtureView + ?Sized>(&self, mixture: &V) -> Vec<ReactionId> {
        self.iter()
            .filter(|(_, rule)| !rule.is_electrolysis() && rule.ingredients_present(mixture))
            .map(|(id, _)| id)
            .collect()
    }

    /// Ordinary rules that can run on `mixture` right now
    pub fn valid_reactions<V: MixtureView + ?Sized>(&self, mixture: &V) -> Vec<ReactionId> {
        self.candidates(mixture)
            .into_iter()
            .filter(|id| self.reactions[id.0 as usize].test(mixture))
            .collect()
    }

    /// Electrolysis rules that can run on `mixture` right now
    pub fn electrolysis_reactions<V: MixtureView + ?Sized>(
        &self,
        mixture: &V,
    ) -> Vec<ReactionId> {
        self.iter()
            .filter(|(_, rule)| {
                rule.is_electrolysis() && rule.ingredients_present(mixture) && rule.test(mixture)
            })
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for ReactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn ingredient(reagent: ReagentId, amount: Amount) -> Ingredient {
    Ingredient { reagent, amount }
}

fn product(reagent: ReagentId, amount: Amount) -> Product {
    electrode_product(reagent, amount, Electrode::default())
}

fn electrode_product(reagent: ReagentId, amount: Amount, electrode: Electrode) -> Product {
    Product {
        reagent,
        amount,
        electrode,
    }
}
