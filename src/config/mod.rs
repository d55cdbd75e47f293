//! Configuration management for rankstats
//!
//! This module provides centralized configuration with support for:
//! - Environment variables (`RANKSTATS_*`)
//! - YAML/TOML configuration files
//! - Configuration validation
//!
//! Every statistics function also accepts explicit options, so configuration
//! is only a convenient way to build those options in one place.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;
pub mod validation;

/// Main configuration structure for rankstats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatsConfig {
    /// Permutation test settings
    pub permutation: PermutationConfig,
    /// Bootstrap resampling settings
    pub bootstrap: BootstrapConfig,
    /// Hypothesis decision thresholds
    pub decision: DecisionConfig,
    /// Performance and parallelism settings
    pub performance: PerformanceConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Permutation test configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermutationConfig {
    /// Number of random relabelings per test
    pub n_permutations: usize,
    /// Base seed (None = draw a fresh seed per call)
    pub seed: Option<u64>,
}

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of resamples drawn with replacement
    pub n_resamples: usize,
    /// Confidence level of the percentile interval
    pub confidence_level: f64,
}

/// Decision thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Significance level for p-value based decisions
    pub alpha: f64,
    /// Two-sided critical |Z| for normal-approximation decisions
    pub critical_z: f64,
}

/// Performance and optimization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Threading configuration
    pub threading: ThreadingConfig,
}

/// Threading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadingConfig {
    /// Enable parallel resampling
    pub parallel_enabled: bool,
    /// Number of worker threads (0 = rayon global pool)
    pub worker_threads: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (off, trace, debug, info, warn, error)
    pub level: String,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            n_permutations: 10_000,
            seed: None,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_resamples: 10_000,
            confidence_level: 0.95,
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            critical_z: 1.96,
        }
    }
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            parallel_enabled: true,
            worker_threads: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level into a `log` filter
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level.parse::<log::LevelFilter>().map_err(|_| {
            Error::ConfigurationError(format!("Invalid log level: {}", self.level))
        })
    }
}

impl StatsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        loader::load_from_yaml(yaml)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        loader::load_from_toml(toml)
    }

    /// Load configuration with precedence: defaults -> file -> env
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        loader::save_to_file(self, path.as_ref())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to YAML: {}", e))
        })
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to TOML: {}", e))
        })
    }

    /// Builder-style seed override, handy for reproducible analyses
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.permutation.seed = Some(seed);
        self
    }
}
