use crate::base::{BitGenome, FitnessValue};
use crate::evolution::mutation::MutationId;
use serde::{Deserialize, Serialize};

/// Unique individual identifier, never reused within a run.
pub type IndividualId = u64;

/// Lineage depth meaning "not descended from the founder along this line".
pub const NO_LINEAGE: i32 = -1;

/// Biological sex. Encoded as 0 = male, 1 = female in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }
}

/// Generational distance to the founder along each line of descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub y_depth: i32,
    pub mito_depth: i32,
    pub min_genealogical: i32,
    pub max_genealogical: i32,
}

impl Lineage {
    pub const NONE: Lineage = Lineage {
        y_depth: NO_LINEAGE,
        mito_depth: NO_LINEAGE,
        min_genealogical: NO_LINEAGE,
        max_genealogical: NO_LINEAGE,
    };

    pub const FOUNDER: Lineage = Lineage {
        y_depth: 0,
        mito_depth: 0,
        min_genealogical: 0,
        max_genealogical: 0,
    };

    /// Descended from the founder through any parent.
    #[inline]
    pub fn is_descendant(&self) -> bool {
        self.max_genealogical > NO_LINEAGE
    }
}

impl Default for Lineage {
    fn default() -> Self {
        Self::NONE
    }
}

/// Tracked genome copies of an individual.
///
/// Only constructed through [`DiploidGenome::from_copies`], which refuses
/// pairs without any set bit, so an individual holds a genome iff it carries
/// at least one founder marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiploidGenome {
    copies: [BitGenome; 2],
}

impl DiploidGenome {
    /// Pair a paternal and a maternal copy; `None` if both are empty.
    pub fn from_copies(paternal: BitGenome, maternal: BitGenome) -> Option<Self> {
        if paternal.none() && maternal.none() {
            None
        } else {
            Some(Self {
                copies: [paternal, maternal],
            })
        }
    }

    /// Every marker set on both copies.
    pub fn fully_marked(bits: usize) -> Option<Self> {
        Self::from_copies(BitGenome::ones(bits), BitGenome::ones(bits))
    }

    #[inline]
    pub fn copy(&self, index: usize) -> &BitGenome {
        &self.copies[index]
    }

    #[inline]
    pub fn copies(&self) -> &[BitGenome; 2] {
        &self.copies
    }

    /// Set bits across both copies.
    pub fn allele_count(&self) -> usize {
        self.copies.iter().map(BitGenome::count_ones).sum()
    }
}

/// Per-chromosome centromere origin flags, one `u64` per copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentromerePair {
    masks: [u64; 2],
}

impl CentromerePair {
    /// `None` if neither copy has a flag set.
    pub fn from_masks(paternal: u64, maternal: u64) -> Option<Self> {
        (paternal != 0 || maternal != 0).then_some(Self {
            masks: [paternal, maternal],
        })
    }

    #[inline]
    pub fn mask(&self, index: usize) -> u64 {
        self.masks[index]
    }

    pub fn count(&self) -> u32 {
        self.masks[0].count_ones() + self.masks[1].count_ones()
    }
}

/// Mutation ids carried on each genome copy, in inheritance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationCarriage {
    copies: [Vec<MutationId>; 2],
}

impl MutationCarriage {
    pub fn new(paternal: Vec<MutationId>, maternal: Vec<MutationId>) -> Self {
        Self {
            copies: [paternal, maternal],
        }
    }

    #[inline]
    pub fn copy(&self, index: usize) -> &[MutationId] {
        &self.copies[index]
    }

    pub fn push(&mut self, index: usize, id: MutationId) {
        self.copies[index].push(id);
    }

    pub fn len(&self) -> usize {
        self.copies[0].len() + self.copies[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every carried id, paternal copy first.
    pub fn iter(&self) -> impl Iterator<Item = MutationId> + '_ {
        self.copies.iter().flat_map(|c| c.iter().copied())
    }
}

/// A living member of the population.
///
/// Demographic attributes are plain fields. Genetic material sits behind
/// accessors so the sparse-entry rule cannot be bypassed; marriage is only
/// changed through `Population`.
#[derive(Debug, Clone)]
pub struct Individual {
    id: IndividualId,
    pub father: Option<IndividualId>,
    pub mother: Option<IndividualId>,
    pub sex: Sex,
    pub birth_year: i64,
    /// Potential maximum age.
    pub lifespan: u32,
    pub(crate) spouse: Option<IndividualId>,
    pub last_birth_year: Option<i64>,
    pub birth_count: u32,
    pub latitude: i32,
    pub longitude: i32,
    pub fitness: FitnessValue,
    pub num_blocks: u32,
    pub lineage: Lineage,
    genome: Option<DiploidGenome>,
    centromeres: Option<CentromerePair>,
    mutations: MutationCarriage,
}

impl Individual {
    /// Create an individual with no genetic material and no lineage.
    pub fn new(
        id: IndividualId,
        sex: Sex,
        birth_year: i64,
        lifespan: u32,
        fitness: FitnessValue,
    ) -> Self {
        Self {
            id,
            father: None,
            mother: None,
            sex,
            birth_year,
            lifespan,
            spouse: None,
            last_birth_year: None,
            birth_count: 0,
            latitude: 0,
            longitude: 0,
            fitness,
            num_blocks: 0,
            lineage: Lineage::NONE,
            genome: None,
            centromeres: None,
            mutations: MutationCarriage::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> IndividualId {
        self.id
    }

    #[inline]
    pub fn age(&self, year: i64) -> i64 {
        year - self.birth_year
    }

    #[inline]
    pub fn is_mature(&self, year: i64, maturity_age: u32) -> bool {
        self.age(year) >= i64::from(maturity_age)
    }

    #[inline]
    pub fn spouse(&self) -> Option<IndividualId> {
        self.spouse
    }

    #[inline]
    pub fn is_married(&self) -> bool {
        self.spouse.is_some()
    }

    #[inline]
    pub fn genome(&self) -> Option<&DiploidGenome> {
        self.genome.as_ref()
    }

    /// Replace the tracked genome; `None` drops the entry.
    pub fn set_genome(&mut self, genome: Option<DiploidGenome>) {
        self.genome = genome;
    }

    /// Founder markers carried across both copies.
    pub fn allele_count(&self) -> usize {
        self.genome.as_ref().map_or(0, DiploidGenome::allele_count)
    }

    #[inline]
    pub fn centromeres(&self) -> Option<&CentromerePair> {
        self.centromeres.as_ref()
    }

    pub fn set_centromeres(&mut self, centromeres: Option<CentromerePair>) {
        self.centromeres = centromeres;
    }

    pub fn centromere_count(&self) -> u32 {
        self.centromeres.as_ref().map_or(0, CentromerePair::count)
    }

    #[inline]
    pub fn mutations(&self) -> &MutationCarriage {
        &self.mutations
    }

    /// Carriage is only attached at birth; the pool must already account for it.
    pub(crate) fn set_mutations(&mut self, mutations: MutationCarriage) {
        self.mutations = mutations;
    }

    pub(crate) fn take_mutations(&mut self) -> MutationCarriage {
        std::mem::take(&mut self.mutations)
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> FitnessValue {
        FitnessValue::from_raw(1_000_000)
    }

    #[test]
    fn test_individual_new_defaults() {
        let ind = Individual::new(7, Sex::Female, -20, 85, neutral());
        assert_eq!(ind.id(), 7);
        assert_eq!(ind.age(5), 25);
        assert!(ind.is_mature(5, 16));
        assert!(!ind.is_married());
        assert_eq!(ind.lineage, Lineage::NONE);
        assert!(ind.genome().is_none());
        assert_eq!(ind.allele_count(), 0);
        assert_eq!(ind.centromere_count(), 0);
        assert_eq!(ind.mutation_count(), 0);
        assert_eq!(ind.last_birth_year, None);
    }

    #[test]
    fn test_empty_genome_is_refused() {
        assert!(DiploidGenome::from_copies(BitGenome::zeros(10), BitGenome::zeros(10)).is_none());

        let mut marked = BitGenome::zeros(10);
        marked.set(3);
        let genome = DiploidGenome::from_copies(BitGenome::zeros(10), marked).unwrap();
        assert_eq!(genome.allele_count(), 1);
    }

    #[test]
    fn test_fully_marked() {
        let genome = DiploidGenome::fully_marked(100).unwrap();
        assert_eq!(genome.allele_count(), 200);
        assert!(DiploidGenome::fully_marked(0).is_none());
    }

    #[test]
    fn test_centromere_pair() {
        assert!(CentromerePair::from_masks(0, 0).is_none());
        let pair = CentromerePair::from_masks(0b101, 0b1).unwrap();
        assert_eq!(pair.count(), 3);
        assert_eq!(pair.mask(0), 0b101);
    }

    #[test]
    fn test_mutation_carriage_order() {
        let mut carriage = MutationCarriage::new(vec![4, 2], vec![9]);
        carriage.push(0, 7);
        assert_eq!(carriage.copy(0), &[4, 2, 7]);
        assert_eq!(carriage.iter().collect::<Vec<_>>(), vec![4, 2, 7, 9]);
        assert_eq!(carriage.len(), 4);
    }

    #[test]
    fn test_sex_codes() {
        assert_eq!(Sex::Male.code(), 0);
        assert_eq!(Sex::Female.code(), 1);
    }
}
