//! Founder selection.
//!
//! Once the seed year is reached, a mature male is drawn uniformly and becomes
//! the anchor for every lineage statistic. Without candidates the attempt is
//! skipped and retried the following year.

use crate::genome::{
    CentromerePair, ChromosomeLayout, DiploidGenome, IndividualId, Lineage, Sex,
};
use crate::simulation::Population;
use rand::Rng;
use tracing::{debug, info};

/// Choose and initialize a founder. Returns `None` if nobody qualifies.
///
/// With `with_genome` the founder carries every marker on both copies and
/// every centromere origin.
pub fn seed_founder<R: Rng + ?Sized>(
    population: &mut Population,
    layout: &ChromosomeLayout,
    maturity_age: u32,
    with_genome: bool,
    year: i64,
    rng: &mut R,
) -> Option<IndividualId> {
    let candidates =
        population.ids_where(|ind| ind.sex == Sex::Male && ind.is_mature(year, maturity_age));
    if candidates.is_empty() {
        debug!(year, "no mature male available as founder");
        return None;
    }

    let id = candidates[rng.random_range(0..candidates.len())];
    let founder = population.get_mut(id)?;
    founder.lineage = Lineage::FOUNDER;
    if with_genome {
        founder.set_genome(DiploidGenome::fully_marked(layout.genome_bits()));
        let centromeres = layout.full_centromere_mask();
        founder.set_centromeres(CentromerePair::from_masks(centromeres, centromeres));
    }

    info!(founder = id, year, "founder selected");
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use crate::genome::Individual;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn add(pop: &mut Population, sex: Sex, birth_year: i64) -> IndividualId {
        let id = pop.allocate_id().unwrap();
        pop.insert(Individual::new(id, sex, birth_year, 85, FitnessValue::from_raw(1)));
        id
    }

    #[test]
    fn test_no_mature_males_is_a_noop() {
        let layout = ChromosomeLayout::human();
        let mut pop = Population::new(layout.genome_bits());
        add(&mut pop, Sex::Male, -5);
        add(&mut pop, Sex::Female, -30);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        assert_eq!(seed_founder(&mut pop, &layout, 16, true, 0, &mut rng), None);
        for ind in pop.iter() {
            assert_eq!(ind.lineage, Lineage::NONE);
            assert!(ind.genome().is_none());
            assert!(ind.centromeres().is_none());
        }
    }

    #[test]
    fn test_founder_is_fully_marked() {
        let layout = ChromosomeLayout::human();
        let mut pop = Population::new(layout.genome_bits());
        add(&mut pop, Sex::Female, -30);
        let man = add(&mut pop, Sex::Male, -30);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);

        let founder = seed_founder(&mut pop, &layout, 16, true, 0, &mut rng).unwrap();
        assert_eq!(founder, man);

        let ind = pop.get(founder).unwrap();
        assert_eq!(ind.lineage, Lineage::FOUNDER);
        assert_eq!(ind.allele_count(), 2 * layout.genome_bits());
        assert_eq!(ind.centromere_count(), 2 * layout.num_chromosomes() as u32);
        pop.check_invariants().unwrap();
    }

    #[test]
    fn test_founder_without_genome_tracking() {
        let layout = ChromosomeLayout::human();
        let mut pop = Population::new(layout.genome_bits());
        add(&mut pop, Sex::Male, -30);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);

        let founder = seed_founder(&mut pop, &layout, 16, false, 0, &mut rng).unwrap();
        let ind = pop.get(founder).unwrap();
        assert_eq!(ind.lineage, Lineage::FOUNDER);
        assert!(ind.genome().is_none());
    }
}
