//! Base types for genome representation.
//!
//! This module provides the bit-vector used for genome copies and
//! recombination masks, and the scaled integer fitness score.

mod bits;
pub mod fitness;

pub use bits::BitGenome;
pub use fitness::{FitnessScale, FitnessValue};
