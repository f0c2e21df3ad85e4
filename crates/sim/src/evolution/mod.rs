//! Genetic processes applied at each birth.
//!
//! - **Recombination**: gamete masks, meiosis and centromere inheritance
//! - **Mutation**: the reference-counted pool, de novo mutations and their
//!   inheritance
//! - **Ancestry**: lineage depths relative to the founder

pub mod ancestry;
pub mod mutation;
pub mod recombination;

pub use ancestry::child_lineage;
pub use mutation::{inherit, EffectHistogram, Mutation, MutationId, MutationModel, MutationPool};
pub use recombination::{count_blocks, RecombinationMask};
