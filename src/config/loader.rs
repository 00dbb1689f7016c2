//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix of every environment variable the loader reads
pub const ENV_PREFIX: &str = "ORDERS_EDA_";

fn env_value<T>(suffix: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let name = format!("{}{}", ENV_PREFIX, suffix);
    match env::var(&name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Overlay `ORDERS_EDA_*` environment variables onto a configuration
pub fn apply_env_overrides(config: &mut AnalysisConfig) -> Result<()> {
    if let Some(v) = env_value("CONFIDENCE")? {
        config.inference.confidence = v;
    }

    if let Some(v) = env_value("NORMALITY_ALPHA")? {
        config.normality.alpha = v;
    }
    if let Some(v) = env_value("MAX_SAMPLE")? {
        config.normality.max_sample = v;
    }
    if let Some(v) = env_value("SEED")? {
        config.normality.seed = v;
    }

    if let Some(v) = env_value("MAX_LAGS")? {
        config.autocorrelation.max_lags = v;
    }
    if let Some(v) = env_value("PIPELINE_LAGS")? {
        config.autocorrelation.pipeline_lags = v;
    }
    if let Some(v) = env_value("STANDARDIZE")? {
        config.autocorrelation.standardize = v;
    }
    if let Some(v) = env_value("AUTOCORRELATION_ALPHA")? {
        config.autocorrelation.alpha = v;
    }

    if let Some(list) = env_value::<String>("KPI_DIMENSIONS")? {
        config.kpi.dimensions = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim().parse::<GroupDimension>().map_err(|e| {
                    Error::ConfigurationError(format!(
                        "Invalid {}KPI_DIMENSIONS: {}",
                        ENV_PREFIX, e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
    }

    if let Some(v) = env_value::<String>("OUTPUT_DIR")? {
        config.output.directory = v.into();
    }
    if let Some(v) = env_value("WRITE_JSON")? {
        config.output.write_json = v;
    }

    if let Some(v) = env_value::<String>("LOG_LEVEL")? {
        config.logging.level = v.to_lowercase();
    }

    Ok(())
}

/// Load configuration from environment variables
pub fn load_from_env() -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<AnalysisConfig> {
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
pub fn load_from_yaml(yaml: &str) -> Result<AnalysisConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<AnalysisConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
///
/// Sections and fields missing from the file keep their defaults.
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<AnalysisConfig> {
    let mut config = match config_file {
        Some(file_path) => load_from_file(file_path.as_ref())?,
        None => AnalysisConfig::default(),
    };

    // Environment has the highest precedence
    apply_env_overrides(&mut config)?;

    config.validate()?;

    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &AnalysisConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?,
    };

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
