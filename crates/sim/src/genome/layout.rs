//! Chromosome-arm layout.
//!
//! Each chromosome has a short `p` arm and a long `q` arm. Arms are addressed
//! as bit ranges of the flat genome.

use std::ops::Range;

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Centromere origin masks are one `u64` per genome copy.
pub const MAX_CHROMOSOMES: usize = 64;

/// Start offset and length of one arm, in genome bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmSpan {
    pub start: usize,
    pub len: usize,
}

impl ArmSpan {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// The two arms of a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomeArms {
    pub name: String,
    pub p: ArmSpan,
    pub q: ArmSpan,
}

impl ChromosomeArms {
    pub fn new(name: impl Into<String>, p: ArmSpan, q: ArmSpan) -> Self {
        Self {
            name: name.into(),
            p,
            q,
        }
    }

    /// Both arms have positive length, so a crossover can be placed on each.
    #[inline]
    pub fn recombines(&self) -> bool {
        self.p.len > 0 && self.q.len > 0
    }

    /// Full extent from the start of `p` to the end of `q`.
    #[inline]
    pub fn extent(&self) -> Range<usize> {
        self.p.start.min(self.q.start)..self.p.end().max(self.q.end())
    }
}

/// Static per-run chromosome geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomeLayout {
    pub chromosomes: Vec<ChromosomeArms>,
    /// Index into `chromosomes` of the chromosome males never inherit from
    /// their father. `None` disables the rule.
    pub sex_chromosome: Option<usize>,
}

impl ChromosomeLayout {
    pub fn new(chromosomes: Vec<ChromosomeArms>, sex_chromosome: Option<usize>) -> Self {
        Self {
            chromosomes,
            sex_chromosome,
        }
    }

    /// Build a layout from `(p_len, q_len)` pairs laid out back to back.
    ///
    /// The last chromosome is taken as the sex chromosome when `with_sex` is set.
    pub fn contiguous(arm_lengths: &[(usize, usize)], with_sex: bool) -> Self {
        let mut offset = 0;
        let chromosomes = arm_lengths
            .iter()
            .enumerate()
            .map(|(i, &(p_len, q_len))| {
                let p = ArmSpan::new(offset, p_len);
                let q = ArmSpan::new(offset + p_len, q_len);
                offset += p_len + q_len;
                ChromosomeArms::new(format!("chr{}", i + 1), p, q)
            })
            .collect::<Vec<_>>();
        let sex_chromosome = (with_sex && !chromosomes.is_empty()).then(|| chromosomes.len() - 1);
        Self::new(chromosomes, sex_chromosome)
    }

    /// Human karyotype (22 autosomes + X) at roughly one bit per megabase.
    pub fn human() -> Self {
        const ARMS: [(usize, usize); 23] = [
            (123, 126),
            (94, 148),
            (91, 107),
            (50, 140),
            (49, 133),
            (60, 111),
            (60, 99),
            (45, 100),
            (43, 95),
            (40, 94),
            (53, 82),
            (35, 98),
            (18, 96),
            (17, 90),
            (19, 83),
            (37, 53),
            (25, 58),
            (18, 62),
            (26, 33),
            (28, 36),
            (12, 35),
            (15, 36),
            (61, 95),
        ];
        let mut layout = Self::contiguous(&ARMS, true);
        if let Some(x) = layout.chromosomes.last_mut() {
            x.name = "chrX".to_string();
        }
        layout
    }

    #[inline]
    pub fn num_chromosomes(&self) -> usize {
        self.chromosomes.len()
    }

    /// Total genome width in bits (end of the furthest arm).
    pub fn genome_bits(&self) -> usize {
        self.chromosomes
            .iter()
            .map(|c| c.p.end().max(c.q.end()))
            .max()
            .unwrap_or(0)
    }

    /// Centromere mask with one bit per chromosome.
    pub fn full_centromere_mask(&self) -> u64 {
        match self.chromosomes.len() {
            0 => 0,
            n if n >= MAX_CHROMOSOMES => u64::MAX,
            n => (1u64 << n) - 1,
        }
    }

    /// Bit range of the sex chromosome, if one is designated.
    pub fn sex_chromosome_extent(&self) -> Option<Range<usize>> {
        self.sex_chromosome
            .and_then(|i| self.chromosomes.get(i))
            .map(ChromosomeArms::extent)
    }

    /// Iterate over every arm as a bit range, `p` before `q`.
    pub fn arm_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.chromosomes
            .iter()
            .flat_map(|c| [c.p.range(), c.q.range()])
    }

    /// Check geometry and the centromere-mask width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chromosomes.len() > MAX_CHROMOSOMES {
            return Err(ConfigError::TooManyChromosomes(self.chromosomes.len()));
        }
        if let Some(index) = self.sex_chromosome {
            if index >= self.chromosomes.len() {
                return Err(ConfigError::SexChromosomeOutOfRange {
                    index,
                    count: self.chromosomes.len(),
                });
            }
        }

        let mut spans: Vec<(usize, char, ArmSpan)> = Vec::with_capacity(self.chromosomes.len() * 2);
        for (i, chr) in self.chromosomes.iter().enumerate() {
            spans.push((i, 'p', chr.p));
            spans.push((i, 'q', chr.q));
        }
        spans.retain(|(_, _, span)| span.len > 0);
        spans.sort_by_key(|(_, _, span)| span.start);
        for pair in spans.windows(2) {
            let (_, _, prev) = pair[0];
            let (chromosome, arm, next) = pair[1];
            if next.start < prev.end() {
                return Err(ConfigError::InvalidArm {
                    chromosome,
                    arm,
                    reason: format!(
                        "starts at bit {} inside a preceding arm ending at {}",
                        next.start,
                        prev.end()
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for ChromosomeLayout {
    fn default() -> Self {
        Self::human()
    }
}
