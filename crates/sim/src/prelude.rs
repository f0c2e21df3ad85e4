//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use drift_sim::prelude::*;
//!
//! let config = Configuration::default();
//! assert!(config.validate().is_ok());
//! ```

pub use crate::base::{BitGenome, FitnessScale, FitnessValue};
pub use crate::errors::{self, ConfigError, InvariantViolation, ResourceError, SimulationError};
pub use crate::genome::{ChromosomeLayout, Individual, IndividualId, Lineage, Sex};
pub use crate::simulation::{
    ActuarialTable, Configuration, DeathRecord, GenomeMap, Population, Simulation,
    SimulationBuilder, YearOutcome, YearStats,
};
