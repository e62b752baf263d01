//! Age-specific parameter values.
//!
//! Vaccine doses carry their efficacy, delay to efficacy and duration of immunity per age group.
//! An [`AgeMap`] holds a sorted list of non-overlapping half-open brackets `[min_age, max_age)`;
//! any age not covered by a bracket maps to `0.0`.
//!
//! In JSON an age map is either a single number, which applies to every age, or a list of
//! brackets:
//!
//! ```json
//! [
//!     { "min_age": 0.0, "max_age": 18.0, "value": 0.6 },
//!     { "min_age": 18.0, "max_age": 120.0, "value": 0.8 }
//! ]
//! ```
use crate::error::VaccinationError;
use serde::{Deserialize, Serialize};

/// A value that applies to every age in `[min_age, max_age)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBracket {
    pub min_age: f64,
    pub max_age: f64,
    pub value: f64,
}

impl AgeBracket {
    #[must_use]
    pub fn contains(&self, age: f64) -> bool {
        self.min_age <= age && age < self.max_age
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AgeMapRepr", into = "Vec<AgeBracket>")]
pub struct AgeMap {
    brackets: Vec<AgeBracket>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeMapRepr {
    Uniform(f64),
    Brackets(Vec<AgeBracket>),
}

impl AgeMap {
    /// Creates a map that returns `value` for every non-negative age.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        AgeMap {
            brackets: vec![AgeBracket {
                min_age: 0.0,
                max_age: f64::MAX,
                value,
            }],
        }
    }

    /// Builds a map from a list of brackets in any order.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a bracket has a non-finite value, an empty or inverted age
    /// range, or overlaps another bracket.
    pub fn from_brackets(mut brackets: Vec<AgeBracket>) -> Result<Self, VaccinationError> {
        for bracket in &brackets {
            if bracket.min_age.is_nan() || bracket.max_age.is_nan() || !bracket.value.is_finite() {
                return Err(format!("invalid age bracket {bracket:?}").into());
            }
            if bracket.min_age >= bracket.max_age {
                return Err(format!(
                    "age bracket [{}, {}) is empty",
                    bracket.min_age, bracket.max_age
                )
                .into());
            }
        }
        brackets.sort_by(|a, b| a.min_age.total_cmp(&b.min_age));
        for pair in brackets.windows(2) {
            if pair[1].min_age < pair[0].max_age {
                return Err(format!(
                    "age brackets [{}, {}) and [{}, {}) overlap",
                    pair[0].min_age, pair[0].max_age, pair[1].min_age, pair[1].max_age
                )
                .into());
            }
        }
        Ok(AgeMap { brackets })
    }

    /// Returns the value for `age`, or `0.0` if no bracket covers it.
    #[must_use]
    pub fn find_value(&self, age: f64) -> f64 {
        self.brackets
            .iter()
            .find(|bracket| bracket.contains(age))
            .map_or(0.0, |bracket| bracket.value)
    }

    #[must_use]
    pub fn brackets(&self) -> &[AgeBracket] {
        &self.brackets
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

impl TryFrom<AgeMapRepr> for AgeMap {
    type Error = VaccinationError;

    fn try_from(repr: AgeMapRepr) -> Result<Self, Self::Error> {
        match repr {
            AgeMapRepr::Uniform(value) if value.is_finite() => Ok(AgeMap::uniform(value)),
            AgeMapRepr::Uniform(value) => Err(format!("invalid age map value {value}").into()),
            AgeMapRepr::Brackets(brackets) => AgeMap::from_brackets(brackets),
        }
    }
}

impl From<AgeMap> for Vec<AgeBracket> {
    fn from(map: AgeMap) -> Self {
        map.brackets
    }
}
