//! Data-driven reaction definitions
//!
//! Definitions reference reagents by name so they survive registry
//! reordering. They load from RON text and travel in a compact binary form
//! (bincode, length-prefixed lists in declaration order) for synchronization.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Condition, Ingredient, Product, Rate, ReactionFlags, ReactionRule, ReagentId, Reagents,
};

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("reaction '{reaction}' references unknown reagent '{reagent}'")]
    UnknownReagent { reaction: String, reagent: String },

    #[error("reaction '{reaction}' has unknown flag '{flag}'")]
    UnknownFlag { reaction: String, flag: String },

    #[error("reaction '{0}' has neither ingredients nor results")]
    EmptyReaction(String),

    #[error("reaction '{reaction}' uses a zero amount of '{reagent}'")]
    ZeroAmount { reaction: String, reagent: String },

    #[error("failed to parse reaction definitions: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to encode reaction definitions: {0}")]
    Encode(String),

    #[error("failed to decode reaction definitions: {0}")]
    Decode(String),
}

/// Reaction rule as written in rule files and sent over the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionDefinition {
    pub name: String,
    pub ingredients: Vec<Ingredient<String>>,
    #[serde(default)]
    pub conditions: Vec<Condition<String>>,
    pub results: Vec<Product<String>>,
    /// Flag names, currently "combustion" and "electrolysis"
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub energy: i64,
    pub rate: Rate<String>,
}

impl ReactionDefinition {
    /// Resolve reagent and flag names against `reagents`
    pub fn compile(&self, reagents: &Reagents) -> Result<ReactionRule, DefinitionError> {
        if self.ingredients.is_empty() && self.results.is_empty() {
            return Err(DefinitionError::EmptyReaction(self.name.clone()));
        }

        let mut resolve = |name: &String| -> Result<ReagentId, DefinitionError> {
            reagents
                .find(name)
                .ok_or_else(|| DefinitionError::UnknownReagent {
                    reaction: self.name.clone(),
                    reagent: name.clone(),
                })
        };

        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for ingredient in &self.ingredients {
            self.check_amount(&ingredient.reagent, ingredient.amount)?;
            ingredients.push(Ingredient {
                reagent: resolve(&ingredient.reagent)?,
                amount: ingredient.amount,
            });
        }

        let mut results = Vec::with_capacity(self.results.len());
        for result in &self.results {
            self.check_amount(&result.reagent, result.amount)?;
            results.push(Product {
                reagent: resolve(&result.reagent)?,
                amount: result.amount,
                electrode: result.electrode,
            });
        }

        let conditions = self
            .conditions
            .iter()
            .map(|condition| condition.try_map(&mut resolve))
            .collect::<Result<Vec<_>, _>>()?;

        let rate = self.rate.try_map(&mut resolve)?;

        let mut flags = ReactionFlags::empty();
        for flag in &self.flags {
            flags |= ReactionFlags::from_name(&flag.to_ascii_uppercase()).ok_or_else(|| {
                DefinitionError::UnknownFlag {
                    reaction: self.name.clone(),
                    flag: flag.clone(),
                }
            })?;
        }

        Ok(ReactionRule::new(
            &self.name,
            ingredients,
            results,
            conditions,
            flags,
            self.energy,
            rate,
        ))
    }

    fn check_amount(&self, reagent: &str, amount: u64) -> Result<(), DefinitionError> {
        if amount == 0 {
            return Err(DefinitionError::ZeroAmount {
                reaction: self.name.clone(),
                reagent: reagent.to_string(),
            });
        }
        Ok(())
    }
}

impl ReactionRule {
    /// Name-based form of this rule for files and the wire
    pub fn to_definition(&self, reagents: &Reagents) -> ReactionDefinition {
        let mut name_of = |id: &ReagentId| -> Result<String, Infallible> {
            Ok(reagents.name(*id).to_string())
        };

        let conditions = self
            .conditions
            .iter()
            .map(|condition| infallible(condition.try_map(&mut name_of)))
            .collect();
        let rate = infallible(self.rate.try_map(&mut name_of));

        ReactionDefinition {
            name: self.name.clone(),
            ingredients: self
                .ingredients
                .iter()
                .map(|ingredient| Ingredient {
                    reagent: reagents.name(ingredient.reagent).to_string(),
                    amount: ingredient.amount,
                })
                .collect(),
            conditions,
            results: self
                .results
                .iter()
                .map(|result| Product {
                    reagent: reagents.name(result.reagent).to_string(),
                    amount: result.amount,
                    electrode: result.electrode,
                })
                .collect(),
            flags: self
                .flags
                .iter_names()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect(),
            energy: self.energy,
            rate,
        }
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Parse a RON list of reaction definitions
pub fn load_ron(text: &str) -> Result<Vec<ReactionDefinition>, DefinitionError> {
    Ok(ron::from_str(text)?)
}

/// Encode definitions into the binary wire form
pub fn encode_definitions(
    definitions: &[ReactionDefinition],
) -> Result<Vec<u8>, DefinitionError> {
    bincode_next::serde::encode_to_vec(definitions, bincode_next::config::standard())
        .map_err(|e| DefinitionError::Encode(format!("{:?}", e)))
}

/// Decode definitions from the binary wire form
pub fn decode_definitions(bytes: &[u8]) -> Result<Vec<ReactionDefinition>, DefinitionError> {
    let (definitions, _): (Vec<ReactionDefinition>, _) =
        bincode_next::serde::decode_from_slice(bytes, bincode_next::config::standard())
            .map_err(|e| DefinitionError::Decode(format!("{:?}", e)))?;
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Electrode, RateEquation, ReactionRegistry, ReagentState};

    const RULES: &str = r#"[
        (
            name: "sulfur_burning",
            ingredients: [
                (reagent: "sulfur", amount: 1000),
                (reagent: "oxygen", amount: 2000),
            ],
            conditions: [
                Temperature(min: Some(250.0)),
                Concentration(reagent: "oxygen", min: Some(0.1), state: Some(Gas)),
            ],
            results: [(reagent: "sulfur_dioxide", amount: 1000)],
            flags: ["combustion"],
            energy: 297000,
            rate: Equation(Multiply([Constant(10.0), Concentration("oxygen")])),
        ),
        (
            name: "split_water",
            ingredients: [(reagent: "water", amount: 2000)],
            results: [
                (reagent: "hydrogen", amount: 2000, electrode: Cathode),
                (reagent: "oxygen", amount: 1000, electrode: Anode),
            ],
            flags: ["electrolysis"],
            rate: Fixed(1),
        ),
    ]"#;

    #[test]
    fn test_load_and_compile() {
        let reagents = Reagents::new();
        let definitions = load_ron(RULES).unwrap();
        assert_eq!(definitions.len(), 2);

        let rule = definitions[0].compile(&reagents).unwrap();
        assert_eq!(rule.ingredients[1].reagent, ReagentId::OXYGEN);
        assert_eq!(rule.ingredients[1].amount, 2000);
        assert!(rule.is_combustion());
        assert_eq!(rule.energy, 297_000);
        assert_eq!(
            rule.conditions[1],
            Condition::Concentration {
                reagent: ReagentId::OXYGEN,
                min: Some(0.1),
                max: None,
                state: Some(ReagentState::Gas),
            }
        );
        assert_eq!(
            rule.rate,
            Rate::Equation(RateEquation::Multiply(vec![
                RateEquation::Constant(10.0),
                RateEquation::Concentration(ReagentId::OXYGEN),
            ]))
        );

        let electrolysis = definitions[1].compile(&reagents).unwrap();
        assert!(electrolysis.is_electrolysis());
        assert_eq!(electrolysis.results[1].electrode, Electrode::Anode);
        // No temperature condition given, default added
        assert_eq!(electrolysis.conditions, vec![Condition::DEFAULT_TEMPERATURE]);
    }

    #[test]
    fn test_unknown_reagent_is_an_error() {
        let mut definitions = load_ron(RULES).unwrap();
        definitions[0].results[0].reagent = "phlogiston".to_string();
        match definitions[0].compile(&Reagents::new()) {
            Err(DefinitionError::UnknownReagent { reagent, .. }) => assert_eq!(reagent, "phlogiston"),
            other => panic!("expected unknown reagent, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let mut definitions = load_ron(RULES).unwrap();
        definitions[0].flags.push("explosive".to_string());
        assert!(matches!(
            definitions[0].compile(&Reagents::new()),
            Err(DefinitionError::UnknownFlag { .. })
        ));
    }

    #[test]
    fn test_zero_amount_is_an_error() {
        let mut definitions = load_ron(RULES).unwrap();
        definitions[1].ingredients[0].amount = 0;
        assert!(matches!(
            definitions[1].compile(&Reagents::new()),
            Err(DefinitionError::ZeroAmount { .. })
        ));
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        assert!(matches!(
            load_ron("[ (name: \"broken\" "),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_wire_form_is_lossless() {
        let definitions = load_ron(RULES).unwrap();
        let bytes = encode_definitions(&definitions).unwrap();
        let decoded = decode_definitions(&bytes).unwrap();
        assert_eq!(decoded, definitions);
    }

    #[test]
    fn test_builtin_rules_survive_definition_form() {
        let reagents = Reagents::new();
        let registry = ReactionRegistry::new();

        let definitions: Vec<_> = registry
            .iter()
            .map(|(_, rule)| rule.to_definition(&reagents))
            .collect();
        let bytes = encode_definitions(&definitions).unwrap();

        for ((_, original), definition) in registry.iter().zip(decode_definitions(&bytes).unwrap()) {
            assert_eq!(&definition.compile(&reagents).unwrap(), original);
        }
    }
}
