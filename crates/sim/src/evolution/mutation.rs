//! Fitness-affecting point mutations.
//!
//! Every mutation lives once in a global [`MutationPool`] and is referenced by
//! id from the carrier lists of the individuals that hold it. The pool keeps a
//! live reference count per mutation equal to the number of
//! (individual, copy) occurrences; an entry is purged the moment its count
//! reaches zero.
//!
//! New mutations are drawn per birth from a [`MutationModel`]: a Poisson
//! number of events, each at a uniform genome bit with an effect that is
//! neutral with probability `fraction_neutral` and otherwise Weibull
//! distributed, deleterious unless a draw falls under `fraction_beneficial`.

use std::collections::BTreeMap;

use crate::base::FitnessScale;
use crate::errors::{ConfigError, InvariantViolation, ResourceError, SimulationError};
use crate::evolution::recombination::RecombinationMask;
use crate::genome::{IndividualId, MutationCarriage};
use crate::simulation::MutationConfig;
use rand::Rng;
use rand_distr::{Distribution, Poisson, Weibull};
use serde::{Deserialize, Serialize};

/// Unique mutation identifier, never reused within a run.
pub type MutationId = u64;

/// A single mutation and its live reference count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub id: MutationId,
    /// Genome bit the mutation sits on.
    pub position: usize,
    /// Additive change to relative fitness.
    pub effect: f64,
    /// Individual in which it arose.
    pub origin: IndividualId,
    pub dominance: f64,
    count: u32,
}

impl Mutation {
    /// Number of (individual, copy) occurrences.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Reference-counted store of all live mutations.
#[derive(Debug, Clone, Default)]
pub struct MutationPool {
    entries: BTreeMap<MutationId, Mutation>,
    last_id: MutationId,
}

impl MutationPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, id: MutationId) -> Option<&Mutation> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.entries.values()
    }

    /// Insert a fresh mutation with a count of one.
    pub fn insert(
        &mut self,
        position: usize,
        effect: f64,
        origin: IndividualId,
    ) -> Result<MutationId, ResourceError> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or(ResourceError::MutationIdOverflow)?;
        self.last_id = id;
        self.entries.insert(
            id,
            Mutation {
                id,
                position,
                effect,
                origin,
                dominance: 0.0,
                count: 1,
            },
        );
        Ok(id)
    }

    /// Record one more occurrence of `id`.
    pub fn increment(&mut self, id: MutationId) -> Result<(), InvariantViolation> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(InvariantViolation::UnknownMutation(id))?;
        entry.count += 1;
        Ok(())
    }

    /// Drop one occurrence of `id`, purging the entry at zero.
    ///
    /// Returns the purged mutation, if this was its last occurrence.
    pub fn decrement(&mut self, id: MutationId) -> Result<Option<Mutation>, InvariantViolation> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(InvariantViolation::UnknownMutation(id))?;
        entry.count = entry.count.saturating_sub(1);
        if entry.count == 0 {
            Ok(self.entries.remove(&id))
        } else {
            Ok(None)
        }
    }

    /// Release every occurrence held by a carriage.
    pub fn release(&mut self, carriage: &MutationCarriage) -> Result<usize, InvariantViolation> {
        let mut purged = 0;
        for id in carriage.iter() {
            if self.decrement(id)?.is_some() {
                purged += 1;
            }
        }
        Ok(purged)
    }

    /// Relative fitness `1 + Σ effects` over both copies of a carriage.
    pub fn relative_fitness(&self, carriage: &MutationCarriage) -> Result<f64, InvariantViolation> {
        carriage.iter().try_fold(1.0, |acc, id| {
            self.get(id)
                .map(|m| acc + m.effect)
                .ok_or(InvariantViolation::UnknownMutation(id))
        })
    }
}

/// Run-level histogram of de novo mutation effects, binned by
/// [`FitnessScale::effect_bin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectHistogram {
    bins: BTreeMap<i64, u64>,
}

impl EffectHistogram {
    pub fn record(&mut self, bin: i64) {
        *self.bins.entry(bin).or_insert(0) += 1;
    }

    /// Bins in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.bins.iter().map(|(&bin, &count)| (bin, count))
    }

    pub fn total(&self) -> u64 {
        self.bins.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Sampling model for de novo mutations.
#[derive(Debug, Clone)]
pub struct MutationModel {
    /// `None` when the rate is zero.
    events: Option<Poisson<f64>>,
    weibull: Weibull<f64>,
    weibull_divisor: f64,
    fraction_neutral: f64,
    fraction_beneficial: f64,
    scale: FitnessScale,
    genome_bits: usize,
}

impl MutationModel {
    /// Build a model from configuration for a genome of `genome_bits` bits.
    pub fn new(config: &MutationConfig, genome_bits: usize) -> Result<Self, ConfigError> {
        if genome_bits == 0 {
            return Err(ConfigError::EmptyGenome);
        }
        if !(config.rate.is_finite() && config.rate >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "mutation.rate",
                reason: format!("{} is not a non-negative rate", config.rate),
            });
        }
        let events = if config.rate > 0.0 {
            Some(Poisson::new(config.rate).map_err(|e| ConfigError::InvalidParameter {
                name: "mutation.rate",
                reason: e.to_string(),
            })?)
        } else {
            None
        };
        let weibull = Weibull::new(config.weibull_scale, config.weibull_shape).map_err(|e| {
            ConfigError::InvalidParameter {
                name: "mutation.weibull",
                reason: e.to_string(),
            }
        })?;
        if !(config.weibull_divisor.is_finite() && config.weibull_divisor > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "mutation.weibull_divisor",
                reason: format!("{} must be positive", config.weibull_divisor),
            });
        }
        let scale = FitnessScale::new(config.fitness_scale).ok_or(ConfigError::InvalidParameter {
            name: "mutation.fitness_scale",
            reason: format!("{} must be positive", config.fitness_scale),
        })?;

        Ok(Self {
            events,
            weibull,
            weibull_divisor: config.weibull_divisor,
            fraction_neutral: config.fraction_neutral,
            fraction_beneficial: config.fraction_beneficial,
            scale,
            genome_bits,
        })
    }

    #[inline]
    pub fn scale(&self) -> FitnessScale {
        self.scale
    }

    /// Number of new mutations for one birth.
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        self.events.as_ref().map_or(0, |p| p.sample(rng) as u64)
    }

    /// Effect of one new mutation.
    pub fn sample_effect<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.random::<f64>() < self.fraction_neutral {
            return 0.0;
        }
        let magnitude = self.weibull.sample(rng) / self.weibull_divisor;
        if rng.random::<f64>() < self.fraction_beneficial {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Draw and attach the de novo mutations of a newborn.
    ///
    /// Each mutation goes into the pool with a count of one, onto a uniformly
    /// chosen copy of `carriage`, and into the effect histogram.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        child: IndividualId,
        carriage: &mut MutationCarriage,
        pool: &mut MutationPool,
        histogram: &mut EffectHistogram,
        rng: &mut R,
    ) -> Result<u64, SimulationError> {
        let count = self.sample_count(rng);
        for _ in 0..count {
            let position = rng.random_range(0..self.genome_bits);
            let effect = self.sample_effect(rng);
            let copy = rng.random_range(0..2);
            let id = pool.insert(position, effect, child)?;
            histogram.record(self.scale.effect_bin(effect));
            carriage.push(copy, id);
        }
        Ok(count)
    }
}

/// Filter a parent's carried mutations through a gamete mask.
///
/// Copy-0 mutations pass where the mask selects copy 0, copy-1 mutations
/// where it selects copy 1; nothing passes inside an excluded range. Every
/// passed id is counted once more in the pool. Order is preserved.
pub fn inherit(
    parent: &MutationCarriage,
    mask: &RecombinationMask,
    pool: &mut MutationPool,
) -> Result<Vec<MutationId>, InvariantViolation> {
    let mut passed = Vec::new();
    for copy in 0..2 {
        for &id in parent.copy(copy) {
            let position = pool
                .get(id)
                .ok_or(InvariantViolation::UnknownMutation(id))?
                .position;
            if mask.transmits(copy, position) {
                pool.increment(id)?;
                passed.push(id);
            }
        }
    }
    Ok(passed)
}
