//! Per-arm view of surviving founder markers.

use crate::base::BitGenome;
use crate::genome::{ChromosomeLayout, IndividualId};
use crate::simulation::Population;
use serde::{Deserialize, Serialize};

/// Marker bits of one chromosome on one genome copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomeRow {
    pub p: Vec<bool>,
    pub q: Vec<bool>,
}

/// Both genome copies of one individual, chromosome by chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeMapEntry {
    pub id: IndividualId,
    pub copies: [Vec<ChromosomeRow>; 2],
}

/// Genome map of every individual that carries founder markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeMap {
    pub entries: Vec<GenomeMapEntry>,
}

fn rows(layout: &ChromosomeLayout, bits: &BitGenome) -> Vec<ChromosomeRow> {
    let arm = |range: std::ops::Range<usize>| range.map(|i| bits.get(i)).collect();
    layout
        .chromosomes
        .iter()
        .map(|chr| ChromosomeRow {
            p: arm(chr.p.range()),
            q: arm(chr.q.range()),
        })
        .collect()
}

impl GenomeMap {
    /// Slice every stored genome along `layout`, in id order.
    pub fn build(population: &Population, layout: &ChromosomeLayout) -> Self {
        let entries = population
            .iter()
            .filter_map(|ind| {
                let genome = ind.genome()?;
                Some(GenomeMapEntry {
                    id: ind.id(),
                    copies: [rows(layout, genome.copy(0)), rows(layout, genome.copy(1))],
                })
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenomeMapEntry> {
        self.entries.iter()
    }
}
