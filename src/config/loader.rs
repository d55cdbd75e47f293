//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Load configuration from environment variables on top of the defaults
pub fn load_from_env() -> Result<StatsConfig> {
    let mut config = StatsConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overwrite the fields of `config` for which a `RANKSTATS_*` variable is set
pub fn apply_env_overrides(config: &mut StatsConfig) -> Result<()> {
    // Permutation configuration
    if let Some(n) = parse_env::<usize>("RANKSTATS_PERMUTATIONS")? {
        config.permutation.n_permutations = n;
    }

    if let Some(seed) = parse_env::<u64>("RANKSTATS_SEED")? {
        config.permutation.seed = Some(seed);
    }

    // Bootstrap configuration
    if let Some(n) = parse_env::<usize>("RANKSTATS_BOOTSTRAP_RESAMPLES")? {
        config.bootstrap.n_resamples = n;
    }

    if let Some(level) = parse_env::<f64>("RANKSTATS_CONFIDENCE_LEVEL")? {
        config.bootstrap.confidence_level = level;
    }

    // Decision thresholds
    if let Some(alpha) = parse_env::<f64>("RANKSTATS_ALPHA")? {
        config.decision.alpha = alpha;
    }

    if let Some(z) = parse_env::<f64>("RANKSTATS_CRITICAL_Z")? {
        config.decision.critical_z = z;
    }

    // Performance configuration
    if let Some(parallel) = parse_env::<bool>("RANKSTATS_PARALLEL_ENABLED")? {
        config.performance.threading.parallel_enabled = parallel;
    }

    if let Some(threads) = parse_env::<usize>("RANKSTATS_WORKER_THREADS")? {
        config.performance.threading.worker_threads = threads;
    }

    // Logging configuration
    if let Ok(log_level) = env::var("RANKSTATS_LOG_LEVEL") {
        config.logging.level = log_level;
    } else if let Ok(rust_log) = env::var("RUST_LOG") {
        // RUST_LOG may hold per-target directives; only a bare level applies here
        if rust_log.parse::<log::LevelFilter>().is_ok() {
            config.logging.level = rust_log;
        }
    }

    Ok(())
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<StatsConfig> {
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_from_yaml(&contents),
        Some("toml") => load_from_toml(&contents),
        Some(ext) => Err(Error::ConfigurationError(format!(
            "Unsupported config file format: {}",
            ext
        ))),
        None => {
            // Try to parse as YAML first, then TOML
            load_from_yaml(&contents).or_else(|_| load_from_toml(&contents))
        }
    }
}

/// Load configuration from YAML string
pub fn load_from_yaml(yaml: &str) -> Result<StatsConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<StatsConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<StatsConfig> {
    // Missing sections in the file fall back to defaults through serde(default)
    let mut config = match config_file {
        Some(file_path) => load_from_file(file_path.as_ref())?,
        None => StatsConfig::default(),
    };

    // Environment has the highest precedence
    apply_env_overrides(&mut config)?;

    config.validate()?;

    log::debug!(
        "Loaded configuration: {} permutations, {} bootstrap resamples, parallel={}",
        config.permutation.n_permutations,
        config.bootstrap.n_resamples,
        config.performance.threading.parallel_enabled
    );

    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &StatsConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?, // Default to YAML
    };

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    fs::write(path, contents).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
permutation:
  n_permutations: 500
  seed: 7
"#;
        let config = load_from_yaml(yaml).unwrap();
        assert_eq!(config.permutation.n_permutations, 500);
        assert_eq!(config.permutation.seed, Some(7));
        assert_eq!(config.bootstrap, BootstrapConfig::default());
        assert_eq!(config.decision.critical_z, 1.96);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
[decision]
alpha = 0.01

[performance.threading]
parallel_enabled = false
"#;
        let config = load_from_toml(toml).unwrap();
        assert_eq!(config.decision.alpha, 0.01);
        assert_eq!(config.decision.critical_z, 1.96);
        assert!(!config.performance.threading.parallel_enabled);
        assert_eq!(config.permutation.n_permutations, 10_000);
    }

    #[test]
    fn test_malformed_yaml_is_configuration_error() {
        let err = load_from_yaml("permutation: [not, a, table").unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }
}
