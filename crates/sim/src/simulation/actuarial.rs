//! Age-bracketed mortality table.
//!
//! Each bracket gives the annual death risk from its starting age up to the
//! next bracket, plus the fraction of a reference population in that bracket.
//! The fractions only shape the ages of the founding generation.

use crate::errors::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuarialBracket {
    /// First age of the bracket.
    pub age: u32,
    /// Annual probability of death.
    pub risk: f64,
    pub population_fraction: f64,
}

impl ActuarialBracket {
    pub const fn new(age: u32, risk: f64, population_fraction: f64) -> Self {
        Self {
            age,
            risk,
            population_fraction,
        }
    }
}

/// Brackets in ascending age order, the first starting at age 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuarialTable {
    pub brackets: Vec<ActuarialBracket>,
}

impl ActuarialTable {
    pub fn new(brackets: Vec<ActuarialBracket>) -> Self {
        Self { brackets }
    }

    /// Five-year brackets from 0 to 85+.
    pub fn standard() -> Self {
        const ROWS: [(u32, f64, f64); 18] = [
            (0, 0.0012, 0.0165),
            (5, 0.0001, 0.0163),
            (10, 0.0001, 0.0161),
            (15, 0.0004, 0.0158),
            (20, 0.0009, 0.0156),
            (25, 0.0011, 0.0153),
            (30, 0.0013, 0.0150),
            (35, 0.0016, 0.0147),
            (40, 0.0021, 0.0143),
            (45, 0.0031, 0.0139),
            (50, 0.0047, 0.0134),
            (55, 0.0072, 0.0127),
            (60, 0.0105, 0.0118),
            (65, 0.0155, 0.0107),
            (70, 0.0240, 0.0093),
            (75, 0.0390, 0.0075),
            (80, 0.0650, 0.0053),
            (85, 0.1500, 0.0034),
        ];
        Self::new(
            ROWS.iter()
                .map(|&(age, risk, fraction)| ActuarialBracket::new(age, risk, fraction))
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let first = self
            .brackets
            .first()
            .ok_or_else(|| ConfigError::InvalidActuarialTable("table is empty".into()))?;
        if first.age != 0 {
            return Err(ConfigError::InvalidActuarialTable(format!(
                "first bracket starts at age {}, expected 0",
                first.age
            )));
        }
        for pair in self.brackets.windows(2) {
            if pair[1].age <= pair[0].age {
                return Err(ConfigError::InvalidActuarialTable(format!(
                    "bracket at age {} does not follow age {}",
                    pair[1].age, pair[0].age
                )));
            }
        }
        for bracket in &self.brackets {
            if !(0.0..=1.0).contains(&bracket.risk) {
                return Err(ConfigError::InvalidActuarialTable(format!(
                    "risk {} at age {} is not a probability",
                    bracket.risk, bracket.age
                )));
            }
            if !(bracket.population_fraction.is_finite() && bracket.population_fraction >= 0.0) {
                return Err(ConfigError::InvalidActuarialTable(format!(
                    "population fraction {} at age {} is negative",
                    bracket.population_fraction, bracket.age
                )));
            }
        }
        Ok(())
    }

    /// Starting age of the last bracket.
    pub fn top_age(&self) -> u32 {
        self.brackets.last().map_or(0, |b| b.age)
    }

    /// Bracket containing `effective_age`; ages past the table fall in the
    /// top bracket.
    pub fn bracket(&self, effective_age: f64) -> Option<&ActuarialBracket> {
        let index = self
            .brackets
            .partition_point(|b| f64::from(b.age) <= effective_age);
        self.brackets.get(index.saturating_sub(1))
    }

    /// Base annual risk at `effective_age`.
    pub fn risk(&self, effective_age: f64) -> f64 {
        self.bracket(effective_age).map_or(0.0, |b| b.risk)
    }
}

impl Default for ActuarialTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Cumulative age distribution used to age the founding generation.
#[derive(Debug, Clone)]
pub struct AgeDistribution {
    cumulative: Vec<(u32, f64)>,
}

impl AgeDistribution {
    /// Cumulative sum of `population_fraction × scale`, bracket by bracket.
    pub fn new(table: &ActuarialTable, scale: f64) -> Self {
        let mut total = 0.0;
        let cumulative = table
            .brackets
            .iter()
            .map(|b| {
                total += b.population_fraction * scale;
                (b.age, total)
            })
            .collect();
        Self { cumulative }
    }

    /// Age of the first bracket whose cumulative weight reaches a uniform
    /// draw, or the top bracket if none does.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let draw: f64 = rng.random();
        self.cumulative
            .iter()
            .find(|&&(_, cumulative)| draw <= cumulative)
            .or(self.cumulative.last())
            .map_or(0, |&(age, _)| age)
    }
}
