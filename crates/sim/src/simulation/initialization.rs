//! Founding generation.
//!
//! The starting population has no parents, no genomes and no mutations. Ages
//! follow the actuarial table's population fractions.

use crate::base::FitnessScale;
use crate::errors::SimulationError;
use crate::genome::{Individual, Sex};
use crate::simulation::{AgeDistribution, Configuration, Population};
use rand::Rng;
use tracing::debug;

/// Coordinates are drawn uniformly from `[-COORDINATE_EXTENT, COORDINATE_EXTENT)`.
pub const COORDINATE_EXTENT: i32 = 500;

/// Build the year-zero population described by `config`.
///
/// Ids are assigned `0..start_population` in order.
pub fn initial_population<R: Rng + ?Sized>(
    config: &Configuration,
    scale: FitnessScale,
    rng: &mut R,
) -> Result<Population, SimulationError> {
    let demography = &config.demography;
    let ages = AgeDistribution::new(&config.actuarial, demography.age_distribution_scale);
    let mut population = Population::new(config.layout.genome_bits());

    for _ in 0..config.execution.start_population {
        let id = population.allocate_id()?;
        let age = ages.sample(rng);
        let sex = if rng.random_bool(0.5) {
            Sex::Female
        } else {
            Sex::Male
        };
        let mut ind = Individual::new(
            id,
            sex,
            -i64::from(age),
            demography.initial_lifespan,
            scale.neutral(),
        );
        ind.latitude = rng.random_range(-COORDINATE_EXTENT..COORDINATE_EXTENT);
        ind.longitude = rng.random_range(-COORDINATE_EXTENT..COORDINATE_EXTENT);
        population.insert(ind);
    }

    debug!(size = population.size(), "initial population created");
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Lineage;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_initial_population_shape() {
        let mut config = Configuration::default();
        config.execution.start_population = 200;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

        let pop = initial_population(&config, FitnessScale::default(), &mut rng).unwrap();
        assert_eq!(pop.size(), 200);
        assert_eq!(pop.next_id(), 200);

        let top = i64::from(config.actuarial.top_age());
        for (expected, ind) in pop.iter().enumerate() {
            assert_eq!(ind.id(), expected as u64);
            assert!(ind.father.is_none() && ind.mother.is_none());
            assert!(!ind.is_married());
            assert!(ind.genome().is_none());
            assert_eq!(ind.lineage, Lineage::NONE);
            assert_eq!(ind.lifespan, config.demography.initial_lifespan);
            assert!((0..=top).contains(&ind.age(0)));
            assert!((-500..500).contains(&ind.latitude));
            assert!((-500..500).contains(&ind.longitude));
        }
        assert!(pop.iter().any(|i| i.sex == Sex::Male));
        assert!(pop.iter().any(|i| i.sex == Sex::Female));
        pop.check_invariants().unwrap();
    }

    #[test]
    fn test_same_seed_same_population() {
        let config = Configuration::default();
        let a = initial_population(
            &config,
            FitnessScale::default(),
            &mut Xoshiro256PlusPlus::seed_from_u64(9),
        )
        .unwrap();
        let b = initial_population(
            &config,
            FitnessScale::default(),
            &mut Xoshiro256PlusPlus::seed_from_u64(9),
        )
        .unwrap();
        let ages = |p: &Population| p.iter().map(|i| (i.birth_year, i.sex)).collect::<Vec<_>>();
        assert_eq!(ages(&a), ages(&b));
    }
}
