use std::fmt;
use std::ops::Range;

const WORD_BITS: usize = 64;

/// Fixed-length bit-vector covering the whole modeled genome.
///
/// Bit `i` lives in word `i / 64` at offset `i % 64`. Bits past `len` in the
/// last word are always kept clear so that population counts are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitGenome {
    words: Vec<u64>,
    len: usize,
}

#[inline]
fn word_count(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

impl BitGenome {
    /// Create a bit-vector of `len` bits, all clear.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; word_count(len)],
            len,
        }
    }

    /// Create a bit-vector of `len` bits, all set.
    pub fn ones(len: usize) -> Self {
        let mut bits = Self {
            words: vec![u64::MAX; word_count(len)],
            len,
        };
        bits.clear_tail();
        bits
    }

    /// Number of addressable bits.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the vector addresses zero bits.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing words, least significant bit first.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Read bit `index`. Out-of-range reads return `false`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Set bit `index`. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, index: usize) {
        if index < self.len {
            self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        }
    }

    /// Set every bit in `range`, clipped to the vector length.
    pub fn set_range(&mut self, range: Range<usize>) {
        for index in range.start..range.end.min(self.len) {
            self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        }
    }

    /// Clear every bit in `range`, clipped to the vector length.
    pub fn clear_range(&mut self, range: Range<usize>) {
        for index in range.start..range.end.min(self.len) {
            self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        }
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `true` if no bit is set.
    #[inline]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Combine two parental copies under a recombination mask:
    /// `(mask & copy0) | (!mask & copy1)`.
    ///
    /// All three vectors must have the same length.
    pub fn recombine(mask: &BitGenome, copy0: &BitGenome, copy1: &BitGenome) -> BitGenome {
        debug_assert_eq!(mask.len, copy0.len);
        debug_assert_eq!(mask.len, copy1.len);

        let words = mask
            .words
            .iter()
            .zip(copy0.words.iter().zip(copy1.words.iter()))
            .map(|(&m, (&c0, &c1))| (m & c0) | (!m & c1))
            .collect();
        let mut child = BitGenome {
            words,
            len: mask.len,
        };
        child.clear_tail();
        child
    }

    /// In-place bitwise OR with another vector of the same length.
    pub fn union_with(&mut self, other: &BitGenome) {
        for (a, &b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    /// Count maximal runs of set bits inside `range`.
    pub fn count_runs(&self, range: Range<usize>) -> usize {
        let mut runs = 0;
        let mut inside = false;
        for index in range.start..range.end.min(self.len) {
            let bit = self.get(index);
            if bit && !inside {
                runs += 1;
            }
            inside = bit;
        }
        runs
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl fmt::Display for BitGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.len {
            f.write_str(if self.get(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
