//! Simulation parameters and configuration.
//!
//! The master [`Configuration`] groups run control, demography, the mutation
//! model, tracking toggles, the chromosome layout and the actuarial table.
//! Every section has a `Default`, so a configuration file only needs to name
//! the values it changes.

use crate::errors::ConfigError;
use crate::evolution::MutationModel;
use crate::genome::ChromosomeLayout;
use crate::simulation::ActuarialTable;
use serde::{Deserialize, Serialize};

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a simulation setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub demography: DemographyConfig,
    pub mutation: MutationConfig,
    pub tracking: TrackingConfig,
    pub layout: ChromosomeLayout,
    pub actuarial: ActuarialTable,
}

/// Run control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of independent runs
    pub runs: usize,
    /// Last simulated year (inclusive); years start at 0
    pub end_year: i64,
    /// Optional RNG seed for reproducibility. Run `r`, counted from 1, uses
    /// `seed + r - 1`.
    pub seed: Option<u64>,
    /// First year at which a founder may be chosen
    pub seed_year: i64,
    /// Emit statistics every this many years
    pub save_interval: i64,
    /// Size of the founding generation
    pub start_population: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            runs: 1,
            end_year: 1000,
            seed: None,
            seed_year: 100,
            save_interval: 10,
            start_population: 1000,
        }
    }
}

/// Temporary reduction of the hard population cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub start: i64,
    pub end: i64,
    pub size: usize,
}

impl Bottleneck {
    #[inline]
    pub fn contains(&self, year: i64) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Demographic parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographyConfig {
    /// Age at which individuals may marry and reproduce
    pub maturity_age: u32,
    /// Fraction of lifespan after which women stop bearing children
    pub menopause_fraction: f64,
    /// Years that must pass after a birth before the next one
    pub birth_spacing: i64,
    /// Per-year chance that an eligible woman attempts conception
    pub fertility_probability: f64,
    /// Lifespan of the founding generation
    pub initial_lifespan: u32,
    /// Per-generation multiplier applied to the mean parental lifespan
    pub lifespan_decay: f64,
    /// Floor for inherited lifespans; also the actuarial reference lifespan
    pub min_lifespan: u32,
    /// Hard population cap
    pub max_population: usize,
    /// Maximum ratio between this year's and last year's population
    pub max_growth_rate: f64,
    /// Optional cap on the number of mature individuals
    pub max_breeding: Option<usize>,
    pub bottleneck: Option<Bottleneck>,
    /// Multiplier turning the actuarial population fractions into a
    /// cumulative distribution for the founding generation's ages
    pub age_distribution_scale: f64,
}

impl DemographyConfig {
    /// Hard cap in force for `year`.
    pub fn effective_cap(&self, year: i64) -> usize {
        match self.bottleneck {
            Some(b) if b.contains(year) => b.size,
            _ => self.max_population,
        }
    }
}

impl Default for DemographyConfig {
    fn default() -> Self {
        Self {
            maturity_age: 16,
            menopause_fraction: 0.55,
            birth_spacing: 1,
            fertility_probability: 0.3,
            initial_lifespan: 85,
            lifespan_decay: 1.0,
            min_lifespan: 85,
            max_population: 10_000,
            max_growth_rate: 1.02,
            max_breeding: None,
            bottleneck: None,
            age_distribution_scale: 4.4,
        }
    }
}

/// Parameters of the de novo mutation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Mean number of new mutations per birth
    pub rate: f64,
    pub weibull_shape: f64,
    pub weibull_scale: f64,
    /// Divides every Weibull draw to obtain the effect size
    pub weibull_divisor: f64,
    /// Probability that a new mutation has no effect
    pub fraction_neutral: f64,
    /// Probability that a non-neutral mutation is beneficial
    pub fraction_beneficial: f64,
    /// Relative fitness is stored as `round(fitness * fitness_scale)`
    pub fitness_scale: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            weibull_shape: 0.5,
            weibull_scale: 1.0,
            weibull_divisor: 1000.0,
            fraction_neutral: 0.9,
            fraction_beneficial: 0.001,
            fitness_scale: 1_000_000.0,
        }
    }
}

/// What the engine tracks beyond demography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Founder marker bits and centromeres
    pub genome: bool,
    /// Fitness-affecting mutations
    pub mutations: bool,
    /// Buffer a record for every death
    pub deaths: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            genome: true,
            mutations: false,
            deaths: false,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("{value} must be positive"),
        })
    }
}

impl Configuration {
    /// Check every section and their consistency with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let exec = &self.execution;
        if exec.runs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "execution.runs",
                reason: "at least one run is required".into(),
            });
        }
        if exec.save_interval <= 0 {
            return Err(ConfigError::InvalidParameter {
                name: "execution.save_interval",
                reason: format!("{} must be positive", exec.save_interval),
            });
        }
        if exec.end_year < 0 {
            return Err(ConfigError::InvalidParameter {
                name: "execution.end_year",
                reason: format!("{} is negative", exec.end_year),
            });
        }

        let demo = &self.demography;
        check_probability("demography.menopause_fraction", demo.menopause_fraction)?;
        check_probability("demography.fertility_probability", demo.fertility_probability)?;
        if demo.min_lifespan == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "demography.min_lifespan",
                reason: "must be at least one year".into(),
            });
        }
        if demo.initial_lifespan < demo.min_lifespan {
            return Err(ConfigError::LifespanBelowMinimum {
                lifespan: demo.initial_lifespan,
                min: demo.min_lifespan,
            });
        }
        check_positive("demography.lifespan_decay", demo.lifespan_decay)?;
        if !(demo.max_growth_rate.is_finite() && demo.max_growth_rate >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "demography.max_growth_rate",
                reason: format!("{} is not a non-negative ratio", demo.max_growth_rate),
            });
        }
        if demo.birth_spacing < 0 {
            return Err(ConfigError::InvalidParameter {
                name: "demography.birth_spacing",
                reason: format!("{} is negative", demo.birth_spacing),
            });
        }
        check_positive("demography.age_distribution_scale", demo.age_distribution_scale)?;
        if let Some(bottleneck) = demo.bottleneck {
            if bottleneck.start > bottleneck.end {
                return Err(ConfigError::InvalidParameter {
                    name: "demography.bottleneck",
                    reason: format!("start {} is after end {}", bottleneck.start, bottleneck.end),
                });
            }
            if bottleneck.size > demo.max_population {
                return Err(ConfigError::CapExceedsMaximum {
                    name: "bottleneck size",
                    value: bottleneck.size,
                    max: demo.max_population,
                });
            }
        }
        if let Some(max_breeding) = demo.max_breeding {
            if max_breeding > demo.max_population {
                return Err(ConfigError::CapExceedsMaximum {
                    name: "breeding cap",
                    value: max_breeding,
                    max: demo.max_population,
                });
            }
        }

        let mutation = &self.mutation;
        check_probability("mutation.fraction_neutral", mutation.fraction_neutral)?;
        check_probability("mutation.fraction_beneficial", mutation.fraction_beneficial)?;
        check_positive("mutation.fitness_scale", mutation.fitness_scale)?;

        self.layout.validate()?;
        if (self.tracking.genome || self.tracking.mutations) && self.layout.genome_bits() == 0 {
            return Err(ConfigError::EmptyGenome);
        }
        if self.tracking.mutations {
            MutationModel::new(mutation, self.layout.genome_bits())?;
        }

        self.actuarial.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        Configuration::default().validate().unwrap();
    }

    #[test]
    fn test_configuration_json_roundtrip() {
        let mut config = Configuration::default();
        config.execution.seed = Some(7);
        config.demography.bottleneck = Some(Bottleneck {
            start: 10,
            end: 20,
            size: 50,
        });

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_mutation_section_fields() {
        let json = serde_json::to_value(MutationConfig::default()).unwrap();
        let mut keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "fitness_scale",
                "fraction_beneficial",
                "fraction_neutral",
                "rate",
                "weibull_divisor",
                "weibull_scale",
                "weibull_shape",
            ]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: Configuration =
            serde_json::from_str(r#"{"demography": {"max_population": 25}}"#).unwrap();
        assert_eq!(parsed.demography.max_population, 25);
        assert_eq!(parsed.demography.maturity_age, 16);
        assert_eq!(parsed.execution, ExecutionConfig::default());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = Configuration::default();
        config.demography.fertility_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "demography.fertility_probability",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_lifespan_below_minimum() {
        let mut config = Configuration::default();
        config.demography.initial_lifespan = 60;
        config.demography.min_lifespan = 70;
        assert_eq!(
            config.validate(),
            Err(ConfigError::LifespanBelowMinimum {
                lifespan: 60,
                min: 70
            })
        );
    }

    #[test]
    fn test_rejects_caps_above_maximum() {
        let mut config = Configuration::default();
        config.demography.max_population = 100;
        config.demography.max_breeding = Some(200);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapExceedsMaximum { value: 200, .. })
        ));

        config.demography.max_breeding = None;
        config.demography.bottleneck = Some(Bottleneck {
            start: 0,
            end: 5,
            size: 101,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapExceedsMaximum { value: 101, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_genome_when_tracking() {
        let mut config = Configuration::default();
        config.layout = ChromosomeLayout::new(Vec::new(), None);
        assert_eq!(config.validate(), Err(ConfigError::EmptyGenome));

        config.tracking.genome = false;
        config.tracking.mutations = false;
        config.validate().unwrap();
    }

    #[test]
    fn test_effective_cap_during_bottleneck() {
        let demography = DemographyConfig {
            max_population: 100,
            bottleneck: Some(Bottleneck {
                start: 5,
                end: 7,
                size: 10,
            }),
            ..DemographyConfig::default()
        };
        assert_eq!(demography.effective_cap(4), 100);
        assert_eq!(demography.effective_cap(5), 10);
        assert_eq!(demography.effective_cap(7), 10);
        assert_eq!(demography.effective_cap(8), 100);
    }
}
