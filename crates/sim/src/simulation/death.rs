//! Mortality and population control.
//!
//! Four phases run in order each year:
//!
//! 1. **Actuarial** deaths from the age-bracketed risk table, scaled to each
//!    individual's potential lifespan and weighted by fitness
//! 2. **Hard cap** culling down to the maximum (or bottleneck) size
//! 3. **Growth-rate** culling down to last year's size times the growth cap
//! 4. **Breeding cap** culling among mature individuals, if configured
//!
//! Culling picks uniformly among surviving candidates and never touches the
//! founder.

use crate::base::FitnessScale;
use crate::errors::SimulationError;
use crate::genome::{Individual, IndividualId, Lineage, Sex};
use crate::simulation::{ActuarialTable, DemographyConfig, Population};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Why an individual was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Actuarial,
    Culled,
}

impl DeathCause {
    /// Single-letter tag used in death reports.
    pub fn tag(self) -> char {
        match self {
            DeathCause::Actuarial => 'A',
            DeathCause::Culled => 'C',
        }
    }
}

/// Snapshot of an individual at the moment of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub year: i64,
    pub cause: DeathCause,
    pub id: IndividualId,
    pub father: Option<IndividualId>,
    pub mother: Option<IndividualId>,
    pub sex: Sex,
    pub birth_year: i64,
    pub age: i64,
    pub lifespan: u32,
    pub spouse: Option<IndividualId>,
    pub birth_count: u32,
    pub latitude: i32,
    pub longitude: i32,
    pub fitness: i64,
    pub allele_count: usize,
    pub num_blocks: u32,
    pub centromere_count: u32,
    pub lineage: Lineage,
    pub mutation_count: usize,
}

impl DeathRecord {
    pub fn capture(ind: &Individual, year: i64, cause: DeathCause) -> Self {
        Self {
            year,
            cause,
            id: ind.id(),
            father: ind.father,
            mother: ind.mother,
            sex: ind.sex,
            birth_year: ind.birth_year,
            age: ind.age(year),
            lifespan: ind.lifespan,
            spouse: ind.spouse(),
            birth_count: ind.birth_count,
            latitude: ind.latitude,
            longitude: ind.longitude,
            fitness: ind.fitness.raw(),
            allele_count: ind.allele_count(),
            num_blocks: ind.num_blocks,
            centromere_count: ind.centromere_count(),
            lineage: ind.lineage,
            mutation_count: ind.mutation_count(),
        }
    }
}

/// Inputs of one death stage.
#[derive(Debug, Clone, Copy)]
pub struct DeathSettings<'a> {
    pub demography: &'a DemographyConfig,
    pub actuarial: &'a ActuarialTable,
    /// Weight risk by fitness; `None` when mutations are not tracked.
    pub fitness: Option<FitnessScale>,
    pub founder: Option<IndividualId>,
    pub last_year_population: usize,
    /// Capture a [`DeathRecord`] for every removal.
    pub record: bool,
}

/// Tally of one death stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeathOutcome {
    pub actuarial: u64,
    pub culled: u64,
    pub records: Vec<DeathRecord>,
}

/// Annual death probability of `ind` in `year`.
///
/// The individual's age is rescaled by `min_lifespan / lifespan` before the
/// table lookup, and the same ratio scales the looked-up risk. With fitness
/// weighting the risk is multiplied by relative fitness, floored at zero.
pub fn death_risk(ind: &Individual, year: i64, settings: &DeathSettings<'_>) -> f64 {
    let ratio = f64::from(settings.demography.min_lifespan) / f64::from(ind.lifespan.max(1));
    let effective_age = ind.age(year) as f64 * ratio;
    let risk = settings.actuarial.risk(effective_age) * ratio;

    match settings.fitness {
        Some(scale) => risk * scale.decode(ind.fitness).max(0.0),
        None => risk,
    }
}

fn bury(
    population: &mut Population,
    id: IndividualId,
    year: i64,
    cause: DeathCause,
    outcome: &mut DeathOutcome,
    record: bool,
) -> Result<(), SimulationError> {
    if record {
        let ind = population.require(id)?;
        outcome.records.push(DeathRecord::capture(ind, year, cause));
    }
    population.remove(id)?;
    trace!(id, year, ?cause, "death");
    match cause {
        DeathCause::Actuarial => outcome.actuarial += 1,
        DeathCause::Culled => outcome.culled += 1,
    }
    Ok(())
}

/// Remove uniformly chosen `candidates` while `over` reports an excess.
fn cull<R: Rng + ?Sized>(
    population: &mut Population,
    mut candidates: Vec<IndividualId>,
    mut over: impl FnMut(&Population) -> bool,
    year: i64,
    outcome: &mut DeathOutcome,
    record: bool,
    rng: &mut R,
) -> Result<(), SimulationError> {
    while over(population) && !candidates.is_empty() {
        let pick = rng.random_range(0..candidates.len());
        let id = candidates.swap_remove(pick);
        bury(population, id, year, DeathCause::Culled, outcome, record)?;
    }
    Ok(())
}

/// Run the death stage for `year`.
pub fn run_deaths<R: Rng + ?Sized>(
    population: &mut Population,
    settings: &DeathSettings<'_>,
    year: i64,
    rng: &mut R,
) -> Result<DeathOutcome, SimulationError> {
    let mut outcome = DeathOutcome::default();
    let demography = settings.demography;
    let founder = settings.founder;
    let not_founder = |ind: &Individual| Some(ind.id()) != founder;

    for id in population.ids_where(|_| true) {
        let risk = death_risk(population.require(id)?, year, settings);
        if rng.random::<f64>() < risk {
            bury(population, id, year, DeathCause::Actuarial, &mut outcome, settings.record)?;
        }
    }

    let cap = demography.effective_cap(year);
    let candidates = population.ids_where(not_founder);
    cull(
        population,
        candidates,
        |pop| pop.size() > cap,
        year,
        &mut outcome,
        settings.record,
        rng,
    )?;

    let growth = settings.last_year_population as f64 * demography.max_growth_rate;
    let allowed = (growth.floor() as usize).min(cap);
    let candidates = population.ids_where(not_founder);
    cull(
        population,
        candidates,
        |pop| pop.size() > allowed,
        year,
        &mut outcome,
        settings.record,
        rng,
    )?;

    if let Some(max_breeding) = demography.max_breeding {
        let mature = |ind: &Individual| ind.is_mature(year, demography.maturity_age);
        let candidates = population.ids_where(|ind| mature(ind) && not_founder(ind));
        cull(
            population,
            candidates,
            |pop| pop.iter().filter(|ind| mature(ind)).count() > max_breeding,
            year,
            &mut outcome,
            settings.record,
            rng,
        )?;
    }

    debug!(
        year,
        actuarial = outcome.actuarial,
        culled = outcome.culled,
        "death stage complete"
    );
    Ok(outcome)
}
