//! Error types for the simulation core.
//!
//! Configuration problems are reported before a run starts. Invariant
//! violations indicate a bug in the core and abort the run. Extinction is
//! not an error.

use thiserror::Error;

/// Rejected configuration, reported at initialization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability outside `[0.0, 1.0]`.
    #[error("Invalid probability for {name}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability { name: &'static str, value: f64 },

    /// A parameter with an unusable value.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The starting lifespan cannot be below the configured floor.
    #[error("Initial lifespan {lifespan} is below the minimum lifespan {min}")]
    LifespanBelowMinimum { lifespan: u32, min: u32 },

    /// A secondary cap that can never bind alongside the hard cap.
    #[error("{name} ({value}) exceeds the maximum population size ({max})")]
    CapExceedsMaximum {
        name: &'static str,
        value: usize,
        max: usize,
    },

    /// Centromere masks are a single `u64` per copy.
    #[error("Layout has {0} chromosomes; centromere masks hold at most 64")]
    TooManyChromosomes(usize),

    /// The sex chromosome index does not name a chromosome.
    #[error("Sex chromosome index {index} is out of range for {count} chromosomes")]
    SexChromosomeOutOfRange { index: usize, count: usize },

    /// Malformed chromosome arm.
    #[error("Chromosome {chromosome} arm {arm}: {reason}")]
    InvalidArm {
        chromosome: usize,
        arm: char,
        reason: String,
    },

    /// Genome or mutation tracking with nothing to track.
    #[error("Genome tracking requires a non-empty chromosome layout")]
    EmptyGenome,

    /// Malformed actuarial table.
    #[error("Actuarial table: {0}")]
    InvalidActuarialTable(String),
}

/// Structural corruption of population state. Indicates a core bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Individual {0} does not exist")]
    MissingIndividual(u64),

    #[error("Individual {individual} references missing spouse {spouse}")]
    DanglingSpouse { individual: u64, spouse: u64 },

    #[error("Marriage of {individual} to {spouse} is not reciprocated")]
    AsymmetricMarriage { individual: u64, spouse: u64 },

    #[error("Individual {0} is already married")]
    AlreadyMarried(u64),

    #[error("Individual {0} holds a genome entry with no set bits")]
    EmptyGenomeEntry(u64),

    #[error("Individual {0} holds a centromere entry with no set bits")]
    EmptyCentromereEntry(u64),

    #[error("Mutation {0} is not in the pool")]
    UnknownMutation(u64),

    #[error("Mutation {id} has reference count {recorded} but is carried {carried} times")]
    ReferenceCountMismatch { id: u64, recorded: u32, carried: u32 },

    #[error("Individual {id} has a genome of {found} bits, expected {expected}")]
    GenomeWidthMismatch {
        id: u64,
        found: usize,
        expected: usize,
    },
}

/// Identifier space exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Individual id space exhausted")]
    IndividualIdOverflow,

    #[error("Mutation id space exhausted")]
    MutationIdOverflow,
}

/// Any failure surfaced by the simulation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
