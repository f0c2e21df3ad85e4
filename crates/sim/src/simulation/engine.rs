//! Simulation engine.
//!
//! A [`Simulation`] owns one run: the population, the run-scoped random
//! number generator, the founder and the event counters. Each call to
//! [`Simulation::step_year`] performs seeding (until a founder exists),
//! births, marriages and deaths for one calendar year.

use crate::base::FitnessScale;
use crate::errors::{InvariantViolation, SimulationError};
use crate::evolution::{EffectHistogram, MutationModel};
use crate::genome::IndividualId;
use crate::simulation::birth::{run_births, Genetics};
use crate::simulation::death::{run_deaths, DeathRecord, DeathSettings};
use crate::simulation::marriage::run_marriages;
use crate::simulation::seeding::seed_founder;
use crate::simulation::stats::{collect, Counters, YearStats};
use crate::simulation::{initial_population, Configuration, GenomeMap, Population};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

/// Whether a run can continue after a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearOutcome {
    Continued,
    /// One individual or fewer remain.
    Extinct,
}

/// Main simulation engine.
#[derive(Debug)]
pub struct Simulation {
    config: Configuration,
    population: Population,
    /// Present only when mutations are tracked.
    mutation_model: Option<MutationModel>,
    scale: FitnessScale,
    histogram: EffectHistogram,
    founder: Option<IndividualId>,
    counters: Counters,
    death_records: Vec<DeathRecord>,
    last_year_population: usize,
    /// Next year to simulate.
    next_year: i64,
    extinct: bool,
    run: usize,
    seed: u64,
    rng: Xoshiro256PlusPlus,
}

impl Simulation {
    /// Validate `config` and build the founding population of run `run`.
    ///
    /// Runs are numbered from 1. With a configured seed, run `r` uses
    /// `seed + r - 1`; otherwise a seed is drawn from OS entropy and logged.
    pub fn new(config: Configuration, run: usize) -> Result<Self, SimulationError> {
        config.validate()?;

        let seed = match config.execution.seed {
            Some(seed) => seed.wrapping_add(run.saturating_sub(1) as u64),
            None => rand::rng().random(),
        };
        info!(run, seed, "starting run");
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let scale = FitnessScale::new(config.mutation.fitness_scale).unwrap_or_default();
        let mutation_model = if config.tracking.mutations {
            Some(MutationModel::new(
                &config.mutation,
                config.layout.genome_bits(),
            )?)
        } else {
            None
        };

        let population = initial_population(&config, scale, &mut rng)?;
        let last_year_population = population.size();

        Ok(Self {
            config,
            population,
            mutation_model,
            scale,
            histogram: EffectHistogram::default(),
            founder: None,
            counters: Counters::default(),
            death_records: Vec::new(),
            last_year_population,
            next_year: 0,
            extinct: false,
            run,
            seed,
            rng,
        })
    }

    /// Simulate the next year.
    pub fn step_year(&mut self) -> Result<YearOutcome, SimulationError> {
        let year = self.next_year;
        let demography = &self.config.demography;

        if self.founder.is_none() && year >= self.config.execution.seed_year {
            self.founder = seed_founder(
                &mut self.population,
                &self.config.layout,
                demography.maturity_age,
                self.config.tracking.genome,
                year,
                &mut self.rng,
            );
        }

        let genetics = Genetics {
            layout: &self.config.layout,
            track_genome: self.config.tracking.genome,
            mutations: self.mutation_model.as_ref(),
            scale: self.scale,
        };
        self.counters.births += run_births(
            &mut self.population,
            demography,
            &genetics,
            &mut self.histogram,
            year,
            &mut self.rng,
        )?;
        Self::debug_check(&self.population)?;

        self.counters.marriages += run_marriages(
            &mut self.population,
            demography.maturity_age,
            year,
            &mut self.rng,
        )?;
        Self::debug_check(&self.population)?;

        let settings = DeathSettings {
            demography,
            actuarial: &self.config.actuarial,
            fitness: self.mutation_model.as_ref().map(MutationModel::scale),
            founder: self.founder,
            last_year_population: self.last_year_population,
            record: self.config.tracking.deaths,
        };
        let outcome = run_deaths(&mut self.population, &settings, year, &mut self.rng)?;
        Self::debug_check(&self.population)?;
        self.counters.actuarial_deaths += outcome.actuarial;
        self.counters.culled_deaths += outcome.culled;
        self.death_records.extend(outcome.records);

        self.last_year_population = self.population.size();
        self.next_year += 1;
        debug!(
            year,
            population = self.last_year_population,
            "year complete"
        );

        if self.population.size() <= 1 {
            self.extinct = true;
            info!(run = self.run, year, "population extinct");
            return Ok(YearOutcome::Extinct);
        }
        Ok(YearOutcome::Continued)
    }

    #[inline]
    fn debug_check(population: &Population) -> Result<(), InvariantViolation> {
        if cfg!(debug_assertions) {
            population.check_invariants()
        } else {
            Ok(())
        }
    }

    /// Step one year. On a save year or at extinction the year's statistics
    /// are returned and the counters reset.
    pub fn advance(&mut self) -> Result<(YearOutcome, Option<YearStats>), SimulationError> {
        let outcome = self.step_year()?;
        let emitted = if outcome == YearOutcome::Extinct || self.is_save_year(self.next_year - 1)
        {
            let stats = self.snapshot();
            self.reset_counters();
            Some(stats)
        } else {
            None
        };
        Ok((outcome, emitted))
    }

    /// Step until the final year or extinction, collecting the statistics
    /// emitted every `save_interval` years and at extinction.
    pub fn run(&mut self) -> Result<Vec<YearStats>, SimulationError> {
        let mut emitted = Vec::new();
        while !self.is_finished() {
            if let (_, Some(stats)) = self.advance()? {
                emitted.push(stats);
            }
        }
        Ok(emitted)
    }

    /// Statistics for the most recently completed year.
    pub fn snapshot(&self) -> YearStats {
        collect(
            &self.population,
            self.run,
            self.next_year - 1,
            &self.counters,
        )
    }

    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    /// Take every death record captured since the last drain.
    pub fn drain_death_records(&mut self) -> Vec<DeathRecord> {
        std::mem::take(&mut self.death_records)
    }

    /// Genome map of the current population.
    pub fn genome_map(&self) -> GenomeMap {
        GenomeMap::build(&self.population, &self.config.layout)
    }

    pub fn is_save_year(&self, year: i64) -> bool {
        year % self.config.execution.save_interval == 0
    }

    /// Past the final year, or extinct.
    pub fn is_finished(&self) -> bool {
        self.extinct || self.next_year > self.config.execution.end_year
    }

    pub fn mutation_histogram(&self) -> &EffectHistogram {
        &self.histogram
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn founder(&self) -> Option<IndividualId> {
        self.founder
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Next year to simulate.
    pub fn next_year(&self) -> i64 {
        self.next_year
    }

    pub fn run_number(&self) -> usize {
        self.run
    }

    /// Seed this run's generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulationBuilder;

    fn small() -> SimulationBuilder {
        SimulationBuilder::new()
            .start_population(120)
            .max_population(200)
            .end_year(60)
            .seed_year(20)
            .save_interval(10)
            .seed(42)
    }

    #[test]
    fn test_simulation_new() {
        let sim = small().build().unwrap();
        assert_eq!(sim.population().size(), 120);
        assert_eq!(sim.next_year(), 0);
        assert_eq!(sim.founder(), None);
        assert_eq!(sim.seed(), 42);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let err = small().fertility_probability(1.5).build().unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn test_step_advances_year() {
        let mut sim = small().build().unwrap();
        sim.step_year().unwrap();
        sim.step_year().unwrap();
        assert_eq!(sim.next_year(), 2);
        assert_eq!(sim.snapshot().year, 1);
    }

    #[test]
    fn test_founder_seeded_at_seed_year() {
        let mut sim = small().build().unwrap();
        for _ in 0..20 {
            sim.step_year().unwrap();
        }
        assert_eq!(sim.founder(), None);
        sim.step_year().unwrap();
        let founder = sim.founder().unwrap();
        let stats = sim.snapshot();
        if sim.population().contains(founder) {
            assert!(stats.genealogical_descendants >= 1);
        }
    }

    #[test]
    fn test_run_emits_every_save_interval() {
        let mut sim = small().build().unwrap();
        let stats = sim.run().unwrap();
        assert!(sim.is_finished());
        let years: Vec<i64> = stats.iter().map(|s| s.year).collect();
        if stats.last().map_or(false, |s| s.population > 1) {
            assert_eq!(years, vec![0, 10, 20, 30, 40, 50, 60]);
        }
        for s in &stats {
            assert!(s.population <= 200);
        }
    }

    #[test]
    fn test_advance_emits_what_run_collects() {
        let expected = small().build().unwrap().run().unwrap();

        let mut sim = small().build().unwrap();
        let mut emitted = Vec::new();
        while !sim.is_finished() {
            let year = sim.next_year();
            let (_, stats) = sim.advance().unwrap();
            match stats {
                Some(stats) => {
                    assert_eq!(stats.year, year);
                    assert_eq!(sim.counters(), &Counters::default());
                    emitted.push(stats);
                }
                None => assert!(!sim.is_save_year(year)),
            }
        }
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_single_individual_goes_extinct_immediately() {
        let mut sim = small().start_population(1).build().unwrap();
        assert_eq!(sim.step_year().unwrap(), YearOutcome::Extinct);
        assert!(sim.is_finished());
    }

    #[test]
    fn test_counters_reset_after_emission() {
        let mut sim = small().build().unwrap();
        for _ in 0..30 {
            sim.step_year().unwrap();
        }
        assert!(sim.counters().marriages > 0);
        sim.reset_counters();
        assert_eq!(*sim.counters(), Counters::default());
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = small().track_mutations(true).build().unwrap().run().unwrap();
        let b = small().track_mutations(true).build().unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_runs_use_offset_seeds() {
        let first = small().run(1).build().unwrap();
        let second = small().run(2).build().unwrap();
        assert_eq!(first.seed(), 42);
        assert_eq!(second.seed(), 43);
    }
}
