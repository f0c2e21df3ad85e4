//! Population state.
//!
//! [`Population`] owns every living individual together with the mutation
//! pool, and is the only place where marriages are formed or individuals
//! removed. Individuals are kept in an ordered map so iteration order, and
//! with it every random choice made while iterating, is reproducible.

use std::collections::{BTreeMap, HashMap};

use crate::errors::{InvariantViolation, ResourceError};
use crate::evolution::{MutationId, MutationPool};
use crate::genome::{Individual, IndividualId};

#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: BTreeMap<IndividualId, Individual>,
    pool: MutationPool,
    next_id: IndividualId,
    genome_bits: usize,
}

impl Population {
    /// Empty population whose genomes are `genome_bits` wide.
    pub fn new(genome_bits: usize) -> Self {
        Self {
            genome_bits,
            ..Self::default()
        }
    }

    /// Get the number of living individuals.
    #[inline]
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn genome_bits(&self) -> usize {
        self.genome_bits
    }

    #[inline]
    pub fn get(&self, id: IndividualId) -> Option<&Individual> {
        self.individuals.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: IndividualId) -> Option<&mut Individual> {
        self.individuals.get_mut(&id)
    }

    /// Look up an individual that must exist.
    pub fn require(&self, id: IndividualId) -> Result<&Individual, InvariantViolation> {
        self.get(id).ok_or(InvariantViolation::MissingIndividual(id))
    }

    pub(crate) fn require_mut(
        &mut self,
        id: IndividualId,
    ) -> Result<&mut Individual, InvariantViolation> {
        self.individuals
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingIndividual(id))
    }

    #[inline]
    pub fn contains(&self, id: IndividualId) -> bool {
        self.individuals.contains_key(&id)
    }

    /// Living individuals in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    /// Underlying map, for parallel read-only reductions.
    pub fn individuals(&self) -> &BTreeMap<IndividualId, Individual> {
        &self.individuals
    }

    /// Snapshot of ids matching `filter`, in ascending order.
    pub fn ids_where(&self, mut filter: impl FnMut(&Individual) -> bool) -> Vec<IndividualId> {
        self.individuals
            .values()
            .filter(|ind| filter(ind))
            .map(Individual::id)
            .collect()
    }

    #[inline]
    pub fn pool(&self) -> &MutationPool {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut MutationPool {
        &mut self.pool
    }

    /// Borrow both parents of a birth alongside the mutation pool.
    pub(crate) fn parents_and_pool(
        &mut self,
        father: IndividualId,
        mother: IndividualId,
    ) -> Result<(&Individual, &Individual, &mut MutationPool), InvariantViolation> {
        let father = self
            .individuals
            .get(&father)
            .ok_or(InvariantViolation::MissingIndividual(father))?;
        let mother = self
            .individuals
            .get(&mother)
            .ok_or(InvariantViolation::MissingIndividual(mother))?;
        Ok((father, mother, &mut self.pool))
    }

    /// Id the next inserted individual will receive.
    #[inline]
    pub fn next_id(&self) -> IndividualId {
        self.next_id
    }

    /// Reserve a fresh individual id.
    pub fn allocate_id(&mut self) -> Result<IndividualId, ResourceError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or(ResourceError::IndividualIdOverflow)?;
        Ok(id)
    }

    /// Add an individual created with an id from [`Population::allocate_id`].
    pub fn insert(&mut self, individual: Individual) {
        debug_assert!(individual.id() < self.next_id);
        self.individuals.insert(individual.id(), individual);
    }

    /// Marry two unmarried individuals. Both sides are written together.
    pub fn marry(&mut self, a: IndividualId, b: IndividualId) -> Result<(), InvariantViolation> {
        for id in [a, b] {
            if self.require(id)?.is_married() {
                return Err(InvariantViolation::AlreadyMarried(id));
            }
        }
        self.require_mut(a)?.spouse = Some(b);
        self.require_mut(b)?.spouse = Some(a);
        Ok(())
    }

    /// Remove an individual and everything that hangs off it.
    ///
    /// Clears the spouse's marriage, releases every carried mutation (purging
    /// those that drop to zero) and drops the genome and centromere entries
    /// with the record. Returns the removed record without its mutation
    /// carriage. A broken marriage is reported before anything is removed.
    pub fn remove(&mut self, id: IndividualId) -> Result<Individual, InvariantViolation> {
        if let Some(spouse_id) = self.require(id)?.spouse {
            let spouse = self
                .individuals
                .get(&spouse_id)
                .ok_or(InvariantViolation::DanglingSpouse {
                    individual: id,
                    spouse: spouse_id,
                })?;
            if spouse.spouse != Some(id) {
                return Err(InvariantViolation::AsymmetricMarriage {
                    individual: id,
                    spouse: spouse_id,
                });
            }
        }

        let mut individual = self
            .individuals
            .remove(&id)
            .ok_or(InvariantViolation::MissingIndividual(id))?;
        if let Some(spouse) = individual
            .spouse
            .take()
            .and_then(|spouse_id| self.individuals.get_mut(&spouse_id))
        {
            spouse.spouse = None;
        }

        let carriage = individual.take_mutations();
        self.pool.release(&carriage)?;
        individual.set_genome(None);
        individual.set_centromeres(None);
        Ok(individual)
    }

    /// Verify every structural invariant of the population.
    ///
    /// Marriages are symmetric and point at living individuals, genome and
    /// centromere entries are non-empty and of the right width, and every
    /// pool count equals the number of (individual, copy) occurrences.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut carried: HashMap<MutationId, u32> = HashMap::new();

        for ind in self.individuals.values() {
            let id = ind.id();
            if let Some(spouse_id) = ind.spouse {
                let spouse = self
                    .individuals
                    .get(&spouse_id)
                    .ok_or(InvariantViolation::DanglingSpouse {
                        individual: id,
                        spouse: spouse_id,
                    })?;
                if spouse.spouse != Some(id) {
                    return Err(InvariantViolation::AsymmetricMarriage {
                        individual: id,
                        spouse: spouse_id,
                    });
                }
            }

            if let Some(genome) = ind.genome() {
                if genome.allele_count() == 0 {
                    return Err(InvariantViolation::EmptyGenomeEntry(id));
                }
                for copy in genome.copies() {
                    if copy.len() != self.genome_bits {
                        return Err(InvariantViolation::GenomeWidthMismatch {
                            id,
                            found: copy.len(),
                            expected: self.genome_bits,
                        });
                    }
                }
            }
            if ind.centromeres().is_some_and(|c| c.count() == 0) {
                return Err(InvariantViolation::EmptyCentromereEntry(id));
            }

            for mutation in ind.mutations().iter() {
                *carried.entry(mutation).or_insert(0) += 1;
            }
        }

        for (&id, &count) in &carried {
            let recorded = self
                .pool
                .get(id)
                .ok_or(InvariantViolation::UnknownMutation(id))?
                .count();
            if recorded != count {
                return Err(InvariantViolation::ReferenceCountMismatch {
                    id,
                    recorded,
                    carried: count,
                });
            }
        }
        if let Some(orphan) = self.pool.iter().find(|m| !carried.contains_key(&m.id)) {
            return Err(InvariantViolation::ReferenceCountMismatch {
                id: orphan.id,
                recorded: orphan.count(),
                carried: 0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use crate::genome::{DiploidGenome, MutationCarriage, Sex};

    fn add(pop: &mut Population, sex: Sex) -> IndividualId {
        let id = pop.allocate_id().unwrap();
        pop.insert(Individual::new(id, sex, -20, 85, FitnessValue::from_raw(1)));
        id
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);
        pop.remove(b).unwrap();
        let c = add(&mut pop, Sex::Female);
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(pop.size(), 2);
    }

    #[test]
    fn test_marry_is_symmetric() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);
        pop.marry(a, b).unwrap();

        assert_eq!(pop.get(a).unwrap().spouse(), Some(b));
        assert_eq!(pop.get(b).unwrap().spouse(), Some(a));
        pop.check_invariants().unwrap();

        let c = add(&mut pop, Sex::Female);
        assert_eq!(pop.marry(a, c), Err(InvariantViolation::AlreadyMarried(a)));
        assert!(!pop.get(c).unwrap().is_married());
    }

    #[test]
    fn test_remove_clears_spouse() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);
        pop.marry(a, b).unwrap();

        let removed = pop.remove(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(!pop.get(b).unwrap().is_married());
        assert_eq!(pop.remove(a).unwrap_err(), InvariantViolation::MissingIndividual(a));
        pop.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_releases_mutations() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);

        let shared = pop.pool_mut().insert(1, -0.1, a).unwrap();
        let private = pop.pool_mut().insert(2, -0.1, a).unwrap();
        pop.pool_mut().increment(shared).unwrap();
        pop.get_mut(a)
            .unwrap()
            .set_mutations(MutationCarriage::new(vec![shared, private], vec![]));
        pop.get_mut(b)
            .unwrap()
            .set_mutations(MutationCarriage::new(vec![], vec![shared]));
        pop.check_invariants().unwrap();

        pop.remove(a).unwrap();
        assert_eq!(pop.pool().len(), 1);
        assert_eq!(pop.pool().get(shared).unwrap().count(), 1);
        assert!(pop.pool().get(private).is_none());
        pop.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_with_broken_marriage_keeps_record() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);
        let id = pop.pool_mut().insert(1, -0.1, a).unwrap();
        pop.get_mut(a)
            .unwrap()
            .set_mutations(MutationCarriage::new(vec![id], vec![]));

        pop.get_mut(a).unwrap().spouse = Some(b);
        assert_eq!(
            pop.remove(a).unwrap_err(),
            InvariantViolation::AsymmetricMarriage {
                individual: a,
                spouse: b
            }
        );
        assert!(pop.contains(a));
        assert_eq!(pop.get(a).unwrap().mutation_count(), 1);
        assert_eq!(pop.pool().get(id).unwrap().count(), 1);

        pop.get_mut(a).unwrap().spouse = Some(99);
        assert_eq!(
            pop.remove(a).unwrap_err(),
            InvariantViolation::DanglingSpouse {
                individual: a,
                spouse: 99
            }
        );
        assert!(pop.contains(a));
        assert_eq!(pop.size(), 2);
    }

    #[test]
    fn test_check_invariants_detects_refcount_mismatch() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let id = pop.pool_mut().insert(1, 0.0, a).unwrap();
        pop.pool_mut().increment(id).unwrap();
        pop.get_mut(a)
            .unwrap()
            .set_mutations(MutationCarriage::new(vec![id], vec![]));

        assert_eq!(
            pop.check_invariants(),
            Err(InvariantViolation::ReferenceCountMismatch {
                id,
                recorded: 2,
                carried: 1
            })
        );
    }

    #[test]
    fn test_check_invariants_detects_asymmetric_marriage() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        let b = add(&mut pop, Sex::Female);
        pop.get_mut(a).unwrap().spouse = Some(b);

        assert_eq!(
            pop.check_invariants(),
            Err(InvariantViolation::AsymmetricMarriage {
                individual: a,
                spouse: b
            })
        );
    }

    #[test]
    fn test_check_invariants_detects_genome_width() {
        let mut pop = Population::new(8);
        let a = add(&mut pop, Sex::Male);
        pop.get_mut(a)
            .unwrap()
            .set_genome(DiploidGenome::fully_marked(16));

        assert!(matches!(
            pop.check_invariants(),
            Err(InvariantViolation::GenomeWidthMismatch { found: 16, .. })
        ));
    }
}
