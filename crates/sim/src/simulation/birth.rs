//! Yearly births.
//!
//! Every married, mature, pre-menopausal woman outside the spacing window of
//! her last birth gets one fertility trial. A successful trial conceives with
//! probability equal to the mean relative fitness of the couple. Eligible
//! mothers are snapshotted at stage entry, so newborns are never revisited.

use crate::base::{BitGenome, FitnessScale};
use crate::errors::{InvariantViolation, SimulationError};
use crate::evolution::{
    child_lineage, count_blocks, inherit, EffectHistogram, MutationModel, RecombinationMask,
};
use crate::genome::{
    CentromerePair, ChromosomeLayout, DiploidGenome, Individual, IndividualId, MutationCarriage,
    Sex,
};
use crate::simulation::{DemographyConfig, Population};
use rand::Rng;
use tracing::debug;

/// Genetic machinery consulted at each birth.
#[derive(Debug, Clone, Copy)]
pub struct Genetics<'a> {
    pub layout: &'a ChromosomeLayout,
    /// Propagate founder markers and centromeres.
    pub track_genome: bool,
    /// Inherit and generate mutations; `None` disables mutation tracking.
    pub mutations: Option<&'a MutationModel>,
    pub scale: FitnessScale,
}

/// Whether `ind` may give birth in `year`.
pub fn is_fertile(ind: &Individual, demography: &DemographyConfig, year: i64) -> bool {
    let age = ind.age(year);
    ind.sex == Sex::Female
        && ind.is_married()
        && ind.is_mature(year, demography.maturity_age)
        && age as f64 <= f64::from(ind.lifespan) * demography.menopause_fraction
        && ind
            .last_birth_year
            .map_or(true, |last| last + demography.birth_spacing < year)
}

/// `floor(mean parental lifespan × decay)`, never below the minimum.
pub fn inherited_lifespan(father: u32, mother: u32, demography: &DemographyConfig) -> u32 {
    let mean = (f64::from(father) + f64::from(mother)) / 2.0;
    let decayed = (mean * demography.lifespan_decay).floor() as u32;
    decayed.max(demography.min_lifespan)
}

/// Run the birth stage for `year`. Returns the number of births.
pub fn run_births<R: Rng + ?Sized>(
    population: &mut Population,
    demography: &DemographyConfig,
    genetics: &Genetics<'_>,
    histogram: &mut EffectHistogram,
    year: i64,
    rng: &mut R,
) -> Result<u64, SimulationError> {
    let mothers = population.ids_where(|ind| is_fertile(ind, demography, year));
    let mut births = 0;

    for mother_id in mothers {
        let mother = population.require(mother_id)?;
        let father_id = mother
            .spouse()
            .ok_or(InvariantViolation::MissingIndividual(mother_id))?;
        let father = population
            .get(father_id)
            .ok_or(InvariantViolation::DanglingSpouse {
                individual: mother_id,
                spouse: father_id,
            })?;

        if !rng.random_bool(demography.fertility_probability) {
            continue;
        }
        let weight = match genetics.mutations {
            Some(_) => {
                (genetics.scale.decode(father.fitness) + genetics.scale.decode(mother.fitness))
                    / 2.0
            }
            None => 1.0,
        };
        if rng.random::<f64>() >= weight {
            continue;
        }

        conceive(
            population, demography, genetics, histogram, father_id, mother_id, year, rng,
        )?;
        births += 1;
    }

    debug!(year, births, "birth stage complete");
    Ok(births)
}

/// Create one child of the given couple and update the mother.
#[allow(clippy::too_many_arguments)]
pub fn conceive<R: Rng + ?Sized>(
    population: &mut Population,
    demography: &DemographyConfig,
    genetics: &Genetics<'_>,
    histogram: &mut EffectHistogram,
    father_id: IndividualId,
    mother_id: IndividualId,
    year: i64,
    rng: &mut R,
) -> Result<IndividualId, SimulationError> {
    let id = population.allocate_id()?;
    let sex = if rng.random_bool(0.5) {
        Sex::Female
    } else {
        Sex::Male
    };
    let genome_bits = population.genome_bits();
    let (father, mother, pool) = population.parents_and_pool(father_id, mother_id)?;

    let lifespan = inherited_lifespan(father.lifespan, mother.lifespan, demography);
    let mut child = Individual::new(id, sex, year, lifespan, genetics.scale.neutral());
    child.father = Some(father_id);
    child.mother = Some(mother_id);
    child.lineage = child_lineage(sex, &father.lineage, &mother.lineage);

    if genetics.track_genome || genetics.mutations.is_some() {
        let paternal = RecombinationMask::generate(genetics.layout, sex == Sex::Male, rng);
        let maternal = RecombinationMask::generate(genetics.layout, false, rng);

        if genetics.track_genome {
            let from_father = father
                .genome()
                .map_or_else(|| BitGenome::zeros(genome_bits), |g| paternal.meiosis(g));
            let from_mother = mother
                .genome()
                .map_or_else(|| BitGenome::zeros(genome_bits), |g| maternal.meiosis(g));
            let genome = DiploidGenome::from_copies(from_father, from_mother);
            if let Some(genome) = &genome {
                child.num_blocks = genome
                    .copies()
                    .iter()
                    .map(|copy| count_blocks(genetics.layout, copy))
                    .sum();
            }
            child.set_genome(genome);

            if father.centromeres().is_some() || mother.centromeres().is_some() {
                let chromosomes = genetics.layout.num_chromosomes();
                let from_father = father
                    .centromeres()
                    .map_or(0, |c| paternal.inherit_centromeres(c, chromosomes));
                let from_mother = mother
                    .centromeres()
                    .map_or(0, |c| maternal.inherit_centromeres(c, chromosomes));
                child.set_centromeres(CentromerePair::from_masks(from_father, from_mother));
            }
        }

        if let Some(model) = genetics.mutations {
            let from_father = inherit(father.mutations(), &paternal, pool)?;
            let from_mother = inherit(mother.mutations(), &maternal, pool)?;
            let mut carriage = MutationCarriage::new(from_father, from_mother);
            model.generate(id, &mut carriage, pool, histogram, rng)?;
            child.fitness = genetics.scale.encode(pool.relative_fitness(&carriage)?);
            child.set_mutations(carriage);
        }
    }

    population.insert(child);
    let mother = population.require_mut(mother_id)?;
    mother.last_birth_year = Some(year);
    mother.birth_count += 1;
    Ok(id)
}
