use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer fitness score stored on an individual.
///
/// Relative fitness `1.0 + Σ effects` is multiplied by a configured
/// [`FitnessScale`] and rounded, so repeated storage never accumulates
/// floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FitnessValue(i64);

impl FitnessValue {
    /// Wrap an already scaled score.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the scaled integer score.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversion factor between relative fitness and [`FitnessValue`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessScale(f64);

impl FitnessScale {
    /// Create a scale. Non-positive or non-finite factors are rejected.
    pub fn new(factor: f64) -> Option<Self> {
        (factor.is_finite() && factor > 0.0).then_some(Self(factor))
    }

    /// Score for relative fitness 1.0.
    #[inline]
    pub fn neutral(self) -> FitnessValue {
        self.encode(1.0)
    }

    /// Scale and round a relative fitness.
    #[inline]
    pub fn encode(self, relative: f64) -> FitnessValue {
        FitnessValue((relative * self.0).round() as i64)
    }

    /// Back to relative fitness.
    #[inline]
    pub fn decode(self, value: FitnessValue) -> f64 {
        value.0 as f64 / self.0
    }

    /// Bin index of a single mutation effect, as used by the effect histogram.
    #[inline]
    pub fn effect_bin(self, effect: f64) -> i64 {
        (effect * self.0) as i64
    }
}

impl Default for FitnessScale {
    fn default() -> Self {
        Self(1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rejects_invalid_factor() {
        assert!(FitnessScale::new(0.0).is_none());
        assert!(FitnessScale::new(-3.0).is_none());
        assert!(FitnessScale::new(f64::NAN).is_none());
        assert!(FitnessScale::new(1000.0).is_some());
    }

    #[test]
    fn test_encode_decode() {
        let scale = FitnessScale::new(1000.0).unwrap();
        let value = scale.encode(0.9876);
        assert_eq!(value.raw(), 988);
        assert!((scale.decode(value) - 0.988).abs() < 1e-12);
        assert_eq!(scale.neutral().raw(), 1000);
    }

    #[test]
    fn test_effect_bin_truncates_toward_zero() {
        let scale = FitnessScale::new(100.0).unwrap();
        assert_eq!(scale.effect_bin(-0.0349), -3);
        assert_eq!(scale.effect_bin(0.0), 0);
        assert_eq!(scale.effect_bin(0.019), 1);
    }
}
