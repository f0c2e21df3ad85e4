//! Builder pattern for creating simulations.
//!
//! Provides a fluent API over [`Configuration`] for the parameters most often
//! changed in tests and benchmarks. Anything else can be set on a full
//! configuration passed to [`SimulationBuilder::from_config`].

use crate::errors::SimulationError;
use crate::genome::ChromosomeLayout;
use crate::simulation::{Bottleneck, Configuration, Simulation};

/// Builder for constructing Simulation instances with a fluent API.
///
/// # Examples
///
/// ```
/// use drift_sim::simulation::SimulationBuilder;
///
/// let mut sim = SimulationBuilder::new()
///     .start_population(100)
///     .end_year(20)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let stats = sim.run().unwrap();
/// assert!(!stats.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    config: Configuration,
    run: usize,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Start from the default configuration, run 1.
    pub fn new() -> Self {
        Self::from_config(Configuration::default())
    }

    pub fn from_config(config: Configuration) -> Self {
        Self { config, run: 1 }
    }

    /// Run number, starting at 1.
    pub fn run(mut self, run: usize) -> Self {
        self.run = run;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.execution.seed = Some(seed);
        self
    }

    pub fn start_population(mut self, size: usize) -> Self {
        self.config.execution.start_population = size;
        self
    }

    /// Last simulated year, inclusive.
    pub fn end_year(mut self, year: i64) -> Self {
        self.config.execution.end_year = year;
        self
    }

    pub fn seed_year(mut self, year: i64) -> Self {
        self.config.execution.seed_year = year;
        self
    }

    pub fn save_interval(mut self, years: i64) -> Self {
        self.config.execution.save_interval = years;
        self
    }

    pub fn max_population(mut self, size: usize) -> Self {
        self.config.demography.max_population = size;
        self
    }

    pub fn max_breeding(mut self, size: usize) -> Self {
        self.config.demography.max_breeding = Some(size);
        self
    }

    pub fn bottleneck(mut self, start: i64, end: i64, size: usize) -> Self {
        self.config.demography.bottleneck = Some(Bottleneck { start, end, size });
        self
    }

    pub fn fertility_probability(mut self, probability: f64) -> Self {
        self.config.demography.fertility_probability = probability;
        self
    }

    pub fn layout(mut self, layout: ChromosomeLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn track_genome(mut self, enabled: bool) -> Self {
        self.config.tracking.genome = enabled;
        self
    }

    pub fn track_mutations(mut self, enabled: bool) -> Self {
        self.config.tracking.mutations = enabled;
        self
    }

    pub fn track_deaths(mut self, enabled: bool) -> Self {
        self.config.tracking.deaths = enabled;
        self
    }

    /// Per-birth de novo mutation rate.
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.config.mutation.rate = rate;
        self
    }

    /// The configuration as built so far.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Validate and create the simulation.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        Simulation::new(self.config, self.run)
    }
}
