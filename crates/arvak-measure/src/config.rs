//! Estimator configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `ARVAK_MEASURE_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MeasureError, MeasureResult};
use crate::observable::Diagonal;
use crate::wires::Wires;

/// Settings for constructing and evaluating measurement processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Absolute tolerance on imaginary parts when deciding Hermiticity of
    /// diagonal observables built through this config.
    #[serde(default = "default_hermitian_atol")]
    pub hermitian_atol: f64,

    /// Emit the advisory warning for non-Hermitian observables.
    #[serde(default = "default_true")]
    pub warn_non_hermitian: bool,

    /// Seed for sampling helpers; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_hermitian_atol() -> f64 {
    crate::observable::DEFAULT_HERMITIAN_ATOL
}

fn default_true() -> bool {
    true
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            hermitian_atol: default_hermitian_atol(),
            warn_non_hermitian: true,
            seed: None,
        }
    }
}

impl EstimatorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MeasureResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MeasureError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> MeasureResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(contents).map_err(|e| MeasureError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(config_file: Option<&str>) -> MeasureResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    fn merge_env(mut self) -> Self {
        if let Ok(atol) = std::env::var("ARVAK_MEASURE_HERMITIAN_ATOL") {
            if let Ok(val) = atol.parse() {
                self.hermitian_atol = val;
            }
        }
        if let Ok(warn) = std::env::var("ARVAK_MEASURE_WARN_NON_HERMITIAN") {
            if let Ok(val) = warn.parse() {
                self.warn_non_hermitian = val;
            }
        }
        if let Ok(seed) = std::env::var("ARVAK_MEASURE_SEED") {
            if let Ok(val) = seed.parse() {
                self.seed = Some(val);
            }
        }
        self
    }

    /// Check the configuration for invalid values.
    pub fn validate(&self) -> MeasureResult<()> {
        if !self.hermitian_atol.is_finite() || self.hermitian_atol < 0.0 {
            return Err(MeasureError::Config(format!(
                "hermitian_atol must be a non-negative finite number, got {}",
                self.hermitian_atol
            )));
        }
        Ok(())
    }

    /// Random number generator for sampling, seeded if configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// A diagonal observable using the configured Hermiticity tolerance.
    pub fn diagonal(
        &self,
        entries: impl IntoIterator<Item = Complex64>,
        wires: Wires,
    ) -> MeasureResult<Diagonal> {
        Ok(Diagonal::new(entries, wires)?.with_tolerance(self.hermitian_atol))
    }
}
