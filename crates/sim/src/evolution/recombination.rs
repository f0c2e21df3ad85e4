//! Meiotic recombination.
//!
//! A [`RecombinationMask`] describes one gamete: for every genome bit it
//! records which parental copy the child receives. Each chromosome whose two
//! arms both have positive length gets one crossover per arm, and a fair coin
//! decides which copy supplies the region around the centromere:
//!
//! ```text
//!   copy 0 proximal:  0000 1111 x 1111 0000   (1 = copy 0, x = centromere)
//!   copy 1 proximal:  1111 0000 x 0000 1111
//! ```
//!
//! Chromosomes that cannot recombine are inherited whole from copy 1.

use std::ops::Range;

use crate::base::BitGenome;
use crate::genome::{CentromerePair, ChromosomeLayout, DiploidGenome};
use rand::Rng;

/// Region of a gamete that carries nothing from the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Exclusion {
    chromosome: usize,
    bits: Range<usize>,
}

/// Per-gamete copy selection.
///
/// A set bit means the child's bit at that position comes from parental
/// copy 0; a clear bit means copy 1. The centromere word follows the same
/// convention, one bit per chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecombinationMask {
    select: BitGenome,
    centromeres: u64,
    exclusion: Option<Exclusion>,
}

impl RecombinationMask {
    /// Draw a mask for one parent.
    ///
    /// With `exclude_sex_chromosome` set (a father producing a son) the sex
    /// chromosome's full extent contributes no markers, no mutations and no
    /// centromere.
    pub fn generate<R: Rng + ?Sized>(
        layout: &ChromosomeLayout,
        exclude_sex_chromosome: bool,
        rng: &mut R,
    ) -> Self {
        let mut select = BitGenome::zeros(layout.genome_bits());
        let mut centromeres = 0u64;

        for (index, chr) in layout.chromosomes.iter().enumerate() {
            if !chr.recombines() {
                continue;
            }
            let p_break = chr.p.start + rng.random_range(0..chr.p.len);
            let q_break = chr.q.start + rng.random_range(0..chr.q.len);

            if rng.random_bool(0.5) {
                select.set_range(p_break..chr.p.end());
                select.set_range(chr.q.start..q_break);
                centromeres |= 1u64 << index;
            } else {
                select.set_range(chr.p.start..p_break);
                select.set_range(q_break..chr.q.end());
            }
        }

        let exclusion = if exclude_sex_chromosome {
            layout.sex_chromosome.and_then(|chromosome| {
                layout
                    .sex_chromosome_extent()
                    .map(|bits| Exclusion { chromosome, bits })
            })
        } else {
            None
        };

        Self {
            select,
            centromeres,
            exclusion,
        }
    }

    /// Build a mask from explicit parts. Used to replay a known gamete.
    pub fn from_parts(select: BitGenome, centromeres: u64) -> Self {
        Self {
            select,
            centromeres,
            exclusion: None,
        }
    }

    /// Exclude one chromosome's bit range from this gamete.
    pub fn with_exclusion(mut self, chromosome: usize, bits: Range<usize>) -> Self {
        self.exclusion = Some(Exclusion { chromosome, bits });
        self
    }

    #[inline]
    pub fn selection(&self) -> &BitGenome {
        &self.select
    }

    /// Centromere-origin word: bit `i` set when chromosome `i`'s centromere
    /// comes from copy 0.
    #[inline]
    pub fn centromere_origin(&self) -> u64 {
        self.centromeres
    }

    #[inline]
    pub fn is_excluded(&self, position: usize) -> bool {
        self.exclusion
            .as_ref()
            .is_some_and(|e| e.bits.contains(&position))
    }

    /// Whether a parental bit at `position` on `copy` reaches the child.
    #[inline]
    pub fn transmits(&self, copy: usize, position: usize) -> bool {
        if self.is_excluded(position) {
            return false;
        }
        let from_copy0 = self.select.get(position);
        if copy == 0 {
            from_copy0
        } else {
            !from_copy0
        }
    }

    /// Produce the child's haploid copy from a parent's two copies.
    pub fn meiosis(&self, parent: &DiploidGenome) -> BitGenome {
        let mut child = BitGenome::recombine(&self.select, parent.copy(0), parent.copy(1));
        if let Some(exclusion) = &self.exclusion {
            child.clear_range(exclusion.bits.clone());
        }
        child
    }

    /// Child's centromere word for this gamete, limited to `num_chromosomes`.
    pub fn inherit_centromeres(&self, parent: &CentromerePair, num_chromosomes: usize) -> u64 {
        let valid = match num_chromosomes {
            n if n >= 64 => u64::MAX,
            n => (1u64 << n) - 1,
        };
        let origin = self.centromeres;
        let mut inherited = ((origin & parent.mask(0)) | (!origin & parent.mask(1))) & valid;
        if let Some(exclusion) = &self.exclusion {
            inherited &= !(1u64 << exclusion.chromosome);
        }
        inherited
    }
}

/// Count maximal runs of set bits, arm by arm, over a whole genome copy.
pub fn count_blocks(layout: &ChromosomeLayout, genome: &BitGenome) -> u32 {
    layout
        .arm_ranges()
        .map(|range| genome.count_runs(range) as u32)
        .sum()
}
