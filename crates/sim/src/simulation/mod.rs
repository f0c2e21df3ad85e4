//! Simulation engine and population management.
//!
//! The yearly stages (seeding, birth, marriage, death) live in their own
//! modules and operate on a [`Population`]. [`Simulation`] sequences them for
//! one run; [`SimulationBuilder`] is a fluent front end over
//! [`Configuration`].

pub mod actuarial;
pub mod birth;
pub mod builder;
pub mod configs;
pub mod death;
pub mod engine;
pub mod genome_map;
pub mod initialization;
pub mod marriage;
pub mod population;
pub mod seeding;
pub mod stats;

pub use actuarial::{ActuarialBracket, ActuarialTable, AgeDistribution};
pub use builder::SimulationBuilder;
pub use configs::{
    Bottleneck, Configuration, DemographyConfig, ExecutionConfig, MutationConfig, TrackingConfig,
};
pub use death::{DeathCause, DeathRecord};
pub use engine::{Simulation, YearOutcome};
pub use genome_map::{ChromosomeRow, GenomeMap, GenomeMapEntry};
pub use initialization::initial_population;
pub use population::Population;
pub use stats::{Counters, YearStats};
