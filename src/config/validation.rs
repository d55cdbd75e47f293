//! Configuration validation utilities
//!
//! Checks that every setting describes a runnable analysis before any
//! resampling starts.

use super::*;
use crate::core::error::{Error, Result};

/// Validate the entire configuration
pub fn validate_config(config: &StatsConfig) -> Result<()> {
    validate_permutation_config(&config.permutation)?;
    validate_bootstrap_config(&config.bootstrap)?;
    validate_decision_config(&config.decision)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate permutation configuration
pub fn validate_permutation_config(config: &PermutationConfig) -> Result<()> {
    if config.n_permutations == 0 {
        return Err(Error::ConfigurationError(
            "n_permutations must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate bootstrap configuration
pub fn validate_bootstrap_config(config: &BootstrapConfig) -> Result<()> {
    if config.n_resamples == 0 {
        return Err(Error::ConfigurationError(
            "n_resamples must be greater than 0".to_string(),
        ));
    }

    if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
        return Err(Error::ConfigurationError(format!(
            "confidence_level must be in (0, 1), got {}",
            config.confidence_level
        )));
    }

    Ok(())
}

/// Validate decision thresholds
pub fn validate_decision_config(config: &DecisionConfig) -> Result<()> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(Error::ConfigurationError(format!(
            "alpha must be in (0, 1), got {}",
            config.alpha
        )));
    }

    if !config.critical_z.is_finite() || config.critical_z <= 0.0 {
        return Err(Error::ConfigurationError(format!(
            "critical_z must be a positive finite number, got {}",
            config.critical_z
        )));
    }

    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    config.level_filter().map(|_| ())
}
