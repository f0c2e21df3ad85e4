//! Genome structures: chromosome geometry, individuals and their sparse
//! genetic material.

mod individual;
pub mod layout;

pub use individual::{
    CentromerePair, DiploidGenome, Individual, IndividualId, Lineage, MutationCarriage, Sex,
    NO_LINEAGE,
};
pub use layout::{ArmSpan, ChromosomeArms, ChromosomeLayout, MAX_CHROMOSOMES};
