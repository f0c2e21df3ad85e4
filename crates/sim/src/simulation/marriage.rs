//! Yearly pairing of unmarried adults.
//!
//! Eligible men and women are shuffled independently and paired by index;
//! the longer list is truncated. Age gaps are not constrained.

use crate::errors::InvariantViolation;
use crate::genome::{Individual, Sex};
use crate::simulation::Population;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Run the marriage stage for `year`. Returns the number of new couples.
pub fn run_marriages<R: Rng + ?Sized>(
    population: &mut Population,
    maturity_age: u32,
    year: i64,
    rng: &mut R,
) -> Result<u64, InvariantViolation> {
    let unmarried_adult = |ind: &Individual| !ind.is_married() && ind.is_mature(year, maturity_age);
    let mut men = population.ids_where(|ind| ind.sex == Sex::Male && unmarried_adult(ind));
    let mut women = population.ids_where(|ind| ind.sex == Sex::Female && unmarried_adult(ind));

    men.shuffle(rng);
    women.shuffle(rng);

    let mut marriages = 0;
    for (&man, &woman) in men.iter().zip(women.iter()) {
        population.marry(man, woman)?;
        marriages += 1;
    }

    debug!(year, marriages, "marriage stage complete");
    Ok(marriages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn populate(pop: &mut Population, sex: Sex, birth_year: i64, count: usize) {
        for _ in 0..count {
            let id = pop.allocate_id().unwrap();
            pop.insert(Individual::new(id, sex, birth_year, 85, FitnessValue::from_raw(1)));
        }
    }

    #[test]
    fn test_pairs_up_to_shorter_side() {
        let mut pop = Population::new(0);
        populate(&mut pop, Sex::Male, -30, 7);
        populate(&mut pop, Sex::Female, -30, 4);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);

        let marriages = run_marriages(&mut pop, 16, 0, &mut rng).unwrap();
        assert_eq!(marriages, 4);
        assert_eq!(pop.iter().filter(|i| i.is_married()).count(), 8);
        for ind in pop.iter().filter(|i| i.is_married()) {
            let spouse = pop.get(ind.spouse().unwrap()).unwrap();
            assert_eq!(spouse.spouse(), Some(ind.id()));
            assert_ne!(spouse.sex, ind.sex);
        }
        pop.check_invariants().unwrap();
    }

    #[test]
    fn test_skips_minors_and_married() {
        let mut pop = Population::new(0);
        populate(&mut pop, Sex::Male, -10, 3);
        populate(&mut pop, Sex::Female, -30, 3);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        assert_eq!(run_marriages(&mut pop, 16, 0, &mut rng).unwrap(), 0);

        populate(&mut pop, Sex::Male, -30, 1);
        assert_eq!(run_marriages(&mut pop, 16, 0, &mut rng).unwrap(), 1);
        assert_eq!(run_marriages(&mut pop, 16, 0, &mut rng).unwrap(), 0);
    }
}
