//! Annealing schedule configuration.
//!
//! Supports loading a schedule from:
//! 1. Configuration files (YAML or JSON, chosen by extension)
//! 2. Environment variables (with `PHASOR_ANNEAL_` prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SynthError, SynthResult};

/// Temperature schedule for simulated annealing.
///
/// The temperature at iteration `i` is
/// `initial_temperature · cooling_rate^i`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealSchedule {
    /// Starting temperature, in units of CNOTs.
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature: f64,

    /// Geometric cooling factor per iteration, in `(0, 1]`.
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,

    /// Number of proposed moves.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_initial_temperature() -> f64 {
    1.0
}

fn default_cooling_rate() -> f64 {
    0.995
}

fn default_iterations() -> usize {
    1000
}

impl Default for AnnealSchedule {
    fn default() -> Self {
        Self {
            initial_temperature: default_initial_temperature(),
            cooling_rate: default_cooling_rate(),
            iterations: default_iterations(),
        }
    }
}

impl AnnealSchedule {
    /// Schedule with the given iteration budget and default temperatures.
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Temperature at iteration `i`.
    #[inline]
    pub fn temperature(&self, i: usize) -> f64 {
        self.initial_temperature * self.cooling_rate.powi(i.min(i32::MAX as usize) as i32)
    }

    /// Validate schedule values.
    pub fn validate(&self) -> SynthResult<()> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(SynthError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }

    /// Parse a YAML document.
    pub fn from_yaml(contents: &str) -> SynthResult<Self> {
        let schedule: Self =
            serde_yaml_ng::from_str(contents).map_err(|e| SynthError::ConfigLoad(e.to_string()))?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Parse a JSON document.
    pub fn from_json(contents: &str) -> SynthResult<Self> {
        let schedule: Self =
            serde_json::from_str(contents).map_err(|e| SynthError::ConfigLoad(e.to_string()))?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Load a schedule file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SynthResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SynthError::ConfigLoad(format!("{}: {e}", path.display())))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Override fields from `PHASOR_ANNEAL_TEMPERATURE`,
    /// `PHASOR_ANNEAL_COOLING_RATE` and `PHASOR_ANNEAL_ITERATIONS`.
    ///
    /// Unparsable values are ignored.
    #[must_use]
    pub fn merge_env(mut self) -> Self {
        if let Some(t) = env_parse("PHASOR_ANNEAL_TEMPERATURE") {
            self.initial_temperature = t;
        }
        if let Some(rate) = env_parse("PHASOR_ANNEAL_COOLING_RATE") {
            self.cooling_rate = rate;
        }
        if let Some(iterations) = env_parse("PHASOR_ANNEAL_ITERATIONS") {
            self.iterations = iterations;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}
