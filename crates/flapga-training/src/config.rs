use std::time::Duration;

use flapga_engine::{WorldConfig, WorldConfigError};
use serde::{Deserialize, Serialize};

/// Options consumed by the [`Trainer`](crate::Trainer).
///
/// Every field has a default, so a configuration file only needs to list what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of individuals per generation.
    pub population_size: usize,
    /// Carry the best-ever chromosome unmutated into every new generation.
    pub elitism: bool,
    /// Seed the first population from the stored best individual, if any.
    pub load_previous_best: bool,
    /// Per-gene probability of receiving Gaussian noise.
    pub mutation_probability: f64,
    pub mutation_standard_deviation: f64,
    /// Reinitialize the population when the best-ever score is still 0 on a
    /// generation that is a multiple of this period.
    pub hardstuck_gen: u32,
    /// Persist the best-ever individual when training terminates.
    pub save_best: bool,
    pub stop_condition: StopCondition,
    /// Seed of the trainer's random generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Ends an episode after this many ticks even if agents are still alive.
    pub episode_tick_limit: Option<u64>,
    /// Seconds to wait for the final save before giving up.
    pub save_timeout: f64,
    pub world: WorldConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            elitism: true,
            load_previous_best: true,
            mutation_probability: 0.05,
            mutation_standard_deviation: 0.3,
            hardstuck_gen: 10,
            save_best: true,
            stop_condition: StopCondition::default(),
            seed: None,
            episode_tick_limit: None,
            save_timeout: 5.0,
            world: WorldConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                value: self.mutation_probability,
            });
        }
        if !self.mutation_standard_deviation.is_finite() || self.mutation_standard_deviation < 0.0
        {
            return Err(ConfigError::InvalidStandardDeviation {
                value: self.mutation_standard_deviation,
            });
        }
        if self.hardstuck_gen == 0 {
            return Err(ConfigError::ZeroHardstuckPeriod);
        }
        for (name, seconds) in [
            ("stop_condition.time", self.stop_condition.time),
            ("save_timeout", Some(self.save_timeout)),
        ] {
            if let Some(seconds) = seconds
                && Duration::try_from_secs_f64(seconds).is_err()
            {
                return Err(ConfigError::InvalidDuration {
                    name,
                    value: seconds,
                });
            }
        }
        self.world.validate().map_err(ConfigError::World)
    }

    /// Time budget of the run, if bounded.
    ///
    /// A budget too large to represent is treated as unbounded.
    #[must_use]
    pub fn time_budget(&self) -> Option<Duration> {
        self.stop_condition
            .time
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// Falls back to [`Duration::ZERO`] for values [`validate`](Self::validate) rejects.
    #[must_use]
    pub fn save_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.save_timeout).unwrap_or(Duration::ZERO)
    }
}

/// Limits that end training. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopCondition {
    /// Stop once this many generations have been evaluated.
    pub generations: Option<u32>,
    /// Stop once the best-ever score reaches this value.
    pub score: Option<u32>,
    /// Stop once this many seconds have elapsed since training started.
    pub time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("mutation probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { value: f64 },
    #[display("mutation standard deviation {value} must be finite and non-negative")]
    InvalidStandardDeviation { value: f64 },
    #[display("hardstuck_gen must be at least 1")]
    ZeroHardstuckPeriod,
    #[display("{name} must be a non-negative number of seconds small enough to represent (got {value})")]
    InvalidDuration { name: &'static str, value: f64 },
    #[display("invalid world configuration: {_0}")]
    World(WorldConfigError),
}
