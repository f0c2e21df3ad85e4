//! # Drift Simulation Crate
//!
//! The `drift_sim` crate simulates a human population year by year and tracks
//! how the genome, lineage and mutation load of a single founder spread.
//! It includes modules for the genome representation, the genetic processes
//! applied at each birth (recombination, mutation, ancestry) and the
//! demographic engine (birth, marriage, death, seeding).

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;

pub use errors::SimulationError;
pub use simulation::{Configuration, Simulation, SimulationBuilder, YearOutcome, YearStats};
