//! Per-year population statistics.

use crate::base::BitGenome;
use crate::genome::{DiploidGenome, Individual};
use crate::simulation::Population;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Event counts accumulated between two statistics emissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub marriages: u64,
    pub births: u64,
    pub actuarial_deaths: u64,
    pub culled_deaths: u64,
}

/// One row of the results table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub run: usize,
    pub year: i64,
    pub population: usize,
    pub marriages: u64,
    pub births: u64,
    pub actuarial_deaths: u64,
    pub culled_deaths: u64,
    /// Individuals carrying at least one founder marker.
    pub genetic_descendants: u64,
    /// Individuals with any genealogical path to the founder, founder included.
    pub genealogical_descendants: u64,
    pub y_descendants: u64,
    pub mito_descendants: u64,
    pub centromeres: u64,
    pub alleles: u64,
    pub blocks: u64,
    pub total_fitness: i64,
    pub mutations_carried: u64,
    pub live_mutations: usize,
    /// Percentage of founder marker positions still present in anyone.
    pub founder_genome_retained: f64,
    pub heterozygous_sites: u64,
    pub homozygous_marked_sites: u64,
    pub homozygous_unmarked_sites: u64,
}

impl YearStats {
    /// Column names matching [`YearStats::to_record`].
    pub const HEADER: [&'static str; 21] = [
        "run",
        "year",
        "n",
        "marriages",
        "births",
        "actuarial_deaths",
        "culled_deaths",
        "genetic_descendants",
        "genealogical_descendants",
        "y_descendants",
        "mito_descendants",
        "centromeres",
        "alleles",
        "blocks",
        "total_fitness",
        "mutations",
        "live_mutations",
        "founder_genome_retained",
        "heterozygous",
        "homozygous_marked",
        "homozygous_unmarked",
    ];

    /// Values in [`YearStats::HEADER`] order.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.run.to_string(),
            self.year.to_string(),
            self.population.to_string(),
            self.marriages.to_string(),
            self.births.to_string(),
            self.actuarial_deaths.to_string(),
            self.culled_deaths.to_string(),
            self.genetic_descendants.to_string(),
            self.genealogical_descendants.to_string(),
            self.y_descendants.to_string(),
            self.mito_descendants.to_string(),
            self.centromeres.to_string(),
            self.alleles.to_string(),
            self.blocks.to_string(),
            self.total_fitness.to_string(),
            self.mutations_carried.to_string(),
            self.live_mutations.to_string(),
            format!("{:.1}", self.founder_genome_retained),
            self.heterozygous_sites.to_string(),
            self.homozygous_marked_sites.to_string(),
            self.homozygous_unmarked_sites.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    genetic: u64,
    genealogical: u64,
    y_line: u64,
    mito_line: u64,
    centromeres: u64,
    alleles: u64,
    blocks: u64,
    fitness: i64,
    mutations: u64,
    heterozygous: u64,
    homozygous_marked: u64,
    homozygous_unmarked: u64,
}

impl Tally {
    fn of(ind: &Individual, genome_bits: usize) -> Self {
        let alleles = ind.allele_count() as u64;
        let lineage = ind.lineage;
        let mut tally = Self {
            genetic: u64::from(alleles > 0),
            genealogical: u64::from(lineage.is_descendant()),
            y_line: u64::from(lineage.y_depth > 0),
            mito_line: u64::from(lineage.mito_depth > 0),
            centromeres: u64::from(ind.centromere_count()),
            alleles,
            blocks: u64::from(ind.num_blocks),
            fitness: ind.fitness.raw(),
            mutations: ind.mutation_count() as u64,
            ..Self::default()
        };
        if let Some(genome) = ind.genome() {
            let (het, hom, either) = zygosity(genome);
            tally.heterozygous = het;
            tally.homozygous_marked = hom;
            tally.homozygous_unmarked = genome_bits as u64 - either;
        }
        tally
    }

    fn merge(self, other: Self) -> Self {
        Self {
            genetic: self.genetic + other.genetic,
            genealogical: self.genealogical + other.genealogical,
            y_line: self.y_line + other.y_line,
            mito_line: self.mito_line + other.mito_line,
            centromeres: self.centromeres + other.centromeres,
            alleles: self.alleles + other.alleles,
            blocks: self.blocks + other.blocks,
            fitness: self.fitness.saturating_add(other.fitness),
            mutations: self.mutations + other.mutations,
            heterozygous: self.heterozygous + other.heterozygous,
            homozygous_marked: self.homozygous_marked + other.homozygous_marked,
            homozygous_unmarked: self.homozygous_unmarked + other.homozygous_unmarked,
        }
    }
}

/// Heterozygous, homozygous-marked and either-marked site counts.
fn zygosity(genome: &DiploidGenome) -> (u64, u64, u64) {
    genome
        .copy(0)
        .words()
        .iter()
        .zip(genome.copy(1).words())
        .fold((0, 0, 0), |(het, hom, either), (&a, &b)| {
            (
                het + u64::from((a ^ b).count_ones()),
                hom + u64::from((a & b).count_ones()),
                either + u64::from((a | b).count_ones()),
            )
        })
}

/// Summarize the population for one emission.
pub fn collect(population: &Population, run: usize, year: i64, counters: &Counters) -> YearStats {
    let genome_bits = population.genome_bits();
    let tally = population
        .individuals()
        .par_iter()
        .map(|(_, ind)| Tally::of(ind, genome_bits))
        .reduce(Tally::default, Tally::merge);

    let retained = population
        .individuals()
        .par_iter()
        .filter_map(|(_, ind)| ind.genome())
        .fold(
            || BitGenome::zeros(genome_bits),
            |mut acc, genome| {
                acc.union_with(genome.copy(0));
                acc.union_with(genome.copy(1));
                acc
            },
        )
        .reduce(
            || BitGenome::zeros(genome_bits),
            |mut a, b| {
                a.union_with(&b);
                a
            },
        );
    let founder_genome_retained = if genome_bits == 0 {
        0.0
    } else {
        retained.count_ones() as f64 / genome_bits as f64 * 100.0
    };

    YearStats {
        run,
        year,
        population: population.size(),
        marriages: counters.marriages,
        births: counters.births,
        actuarial_deaths: counters.actuarial_deaths,
        culled_deaths: counters.culled_deaths,
        genetic_descendants: tally.genetic,
        genealogical_descendants: tally.genealogical,
        y_descendants: tally.y_line,
        mito_descendants: tally.mito_line,
        centromeres: tally.centromeres,
        alleles: tally.alleles,
        blocks: tally.blocks,
        total_fitness: tally.fitness,
        mutations_carried: tally.mutations,
        live_mutations: population.pool().len(),
        founder_genome_retained,
        heterozygous_sites: tally.heterozygous,
        homozygous_marked_sites: tally.homozygous_marked,
        homozygous_unmarked_sites: tally.homozygous_unmarked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FitnessValue;
    use crate::genome::{Lineage, Sex};

    #[test]
    fn test_collect_counts_lineages_and_sites() {
        let mut pop = Population::new(8);

        let founder = pop.allocate_id().unwrap();
        let mut ind = Individual::new(founder, Sex::Male, -30, 85, FitnessValue::from_raw(10));
        ind.lineage = Lineage::FOUNDER;
        ind.set_genome(DiploidGenome::fully_marked(8));
        pop.insert(ind);

        let child = pop.allocate_id().unwrap();
        let mut ind = Individual::new(child, Sex::Male, 0, 85, FitnessValue::from_raw(5));
        ind.lineage = Lineage {
            y_depth: 1,
            mito_depth: -1,
            min_genealogical: 1,
            max_genealogical: 1,
        };
        let mut half = BitGenome::zeros(8);
        half.set_range(0..4);
        ind.set_genome(DiploidGenome::from_copies(half, BitGenome::zeros(8)));
        pop.insert(ind);

        let other = pop.allocate_id().unwrap();
        pop.insert(Individual::new(other, Sex::Female, 0, 85, FitnessValue::from_raw(7)));

        let counters = Counters {
            births: 2,
            ..Counters::default()
        };
        let stats = collect(&pop, 1, 10, &counters);

        assert_eq!(stats.population, 3);
        assert_eq!(stats.births, 2);
        assert_eq!(stats.genetic_descendants, 2);
        assert_eq!(stats.genealogical_descendants, 2);
        assert_eq!(stats.y_descendants, 1);
        assert_eq!(stats.mito_descendants, 0);
        assert_eq!(stats.alleles, 20);
        assert_eq!(stats.total_fitness, 22);
        assert_eq!(stats.heterozygous_sites, 4);
        assert_eq!(stats.homozygous_marked_sites, 8);
        assert_eq!(stats.homozygous_unmarked_sites, 4);
        assert!((stats.founder_genome_retained - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_record_matches_header() {
        let stats = YearStats::default();
        assert_eq!(stats.to_record().len(), YearStats::HEADER.len());
    }
}
