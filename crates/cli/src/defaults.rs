//! Shared default values for the command-line arguments.

pub const SIMULATION_NAME: &str = "drift";
pub const CONFIG_FILE: &str = "drift.json";
pub const OUTPUT_DIR: &str = "results";

pub const START_POPULATION: usize = 1000;
pub const END_YEAR: i64 = 1000;
pub const RUNS: usize = 1;
pub const SEED_YEAR: i64 = 100;
pub const SAVE_INTERVAL: i64 = 10;
pub const MAX_POPULATION: usize = 10_000;

/// Mean de novo mutations per birth.
pub const MUTATION_RATE: f64 = 1.0;
