//! Rate equations
//!
//! A reaction's per-tick rate is an expression tree evaluated against the
//! mixture every tick. Evaluation is total: division by zero, empty operand
//! lists and non-finite intermediate results all collapse to 0.

use crate::{MixtureView, ReagentId};
use serde::{Deserialize, Serialize};

/// Expression tree producing a reaction rate
///
/// `R` is how reagents are referenced: names in rule files, handles once
/// compiled against a registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RateEquation<R = ReagentId> {
    Constant(f32),
    /// Mixture temperature in Celsius
    Temperature,
    Concentration(R),
    Catalyzer,
    Add(Vec<RateEquation<R>>),
    Subtract(Box<RateEquation<R>>, Box<RateEquation<R>>),
    Multiply(Vec<RateEquation<R>>),
    Divide(Box<RateEquation<R>>, Box<RateEquation<R>>),
    Min(Vec<RateEquation<R>>),
    Max(Vec<RateEquation<R>>),
    /// `c0 + c1*x + c2*x^2 + ...` with `x` the input
    Polynomial {
        input: Box<RateEquation<R>>,
        coefficients: Vec<f32>,
    },
}

impl RateEquation<ReagentId> {
    pub fn evaluate<V: MixtureView + ?Sized>(&self, mixture: &V) -> f32 {
        let value = match self {
            RateEquation::Constant(value) => *value,
            RateEquation::Temperature => mixture.temperature(),
            RateEquation::Concentration(reagent) => mixture.concentration(*reagent),
            RateEquation::Catalyzer => mixture.catalyzer(),
            RateEquation::Add(terms) => terms.iter().map(|t| t.evaluate(mixture)).sum(),
            RateEquation::Subtract(a, b) => a.evaluate(mixture) - b.evaluate(mixture),
            RateEquation::Multiply(factors) => {
                if factors.is_empty() {
                    0.0
                } else {
                    factors.iter().map(|f| f.evaluate(mixture)).product()
                }
            }
            RateEquation::Divide(a, b) => {
                let divisor = b.evaluate(mixture);
                if divisor == 0.0 {
                    0.0
                } else {
                    a.evaluate(mixture) / divisor
                }
            }
            RateEquation::Min(terms) => terms
                .iter()
                .map(|t| t.evaluate(mixture))
                .reduce(f32::min)
                .unwrap_or(0.0),
            RateEquation::Max(terms) => terms
                .iter()
                .map(|t| t.evaluate(mixture))
                .reduce(f32::max)
                .unwrap_or(0.0),
            RateEquation::Polynomial {
                input,
                coefficients,
            } => {
                let x = input.evaluate(mixture);
                // Horner's method
                coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
            }
        };

        if value.is_finite() { value } else { 0.0 }
    }
}

impl<R> RateEquation<R> {
    /// Rebuild the tree with every reagent reference converted by `f`
    pub fn try_map<S, E>(
        &self,
        f: &mut dyn FnMut(&R) -> Result<S, E>,
    ) -> Result<RateEquation<S>, E> {
        fn map_all<R, S, E>(
            terms: &[RateEquation<R>],
            f: &mut dyn FnMut(&R) -> Result<S, E>,
        ) -> Result<Vec<RateEquation<S>>, E> {
            terms.iter().map(|t| t.try_map(&mut *f)).collect()
        }

        Ok(match self {
            RateEquation::Constant(value) => RateEquation::Constant(*value),
            RateEquation::Temperature => RateEquation::Temperature,
            RateEquation::Concentration(reagent) => RateEquation::Concentration(f(reagent)?),
            RateEquation::Catalyzer => RateEquation::Catalyzer,
            RateEquation::Add(terms) => RateEquation::Add(map_all(terms, f)?),
            RateEquation::Subtract(a, b) => RateEquation::Subtract(
                Box::new(a.try_map(&mut *f)?),
                Box::new(b.try_map(&mut *f)?),
            ),
            RateEquation::Multiply(terms) => RateEquation::Multiply(map_all(terms, f)?),
            RateEquation::Divide(a, b) => RateEquation::Divide(
                Box::new(a.try_map(&mut *f)?),
                Box::new(b.try_map(&mut *f)?),
            ),
            RateEquation::Min(terms) => RateEquation::Min(map_all(terms, f)?),
            RateEquation::Max(terms) => RateEquation::Max(map_all(terms, f)?),
            RateEquation::Polynomial {
                input,
                coefficients,
            } => RateEquation::Polynomial {
                input: Box::new(input.try_map(f)?),
                coefficients: coefficients.clone(),
            },
        })
    }
}

/// How fast a reaction runs per tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Rate<R = ReagentId> {
    /// Fixed number of reaction units per tick
    Fixed(u32),
    Equation(RateEquation<R>),
}

impl Rate<ReagentId> {
    /// Candidate rate for this tick, never negative
    pub fn evaluate<V: MixtureView + ?Sized>(&self, mixture: &V) -> f32 {
        match self {
            Rate::Fixed(units) => *units as f32,
            Rate::Equation(equation) => equation.evaluate(mixture).max(0.0),
        }
    }
}

impl<R> Rate<R> {
    pub fn try_map<S, E>(&self, f: &mut dyn FnMut(&R) -> Result<S, E>) -> Result<Rate<S>, E> {
        Ok(match self {
            Rate::Fixed(units) => Rate::Fixed(*units),
            Rate::Equation(equation) => Rate::Equation(equation.try_map(f)?),
        })
    }
}

impl Default for Rate<ReagentId> {
    fn default() -> Self {
        Rate::Fixed(1)
    }
}
