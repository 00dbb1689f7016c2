//! Configuration management for orders-eda
//!
//! This module provides centralized configuration management with support for:
//! - Environment variables
//! - YAML/TOML configuration files
//! - Configuration validation

use crate::core::error::{Error, Result};
use crate::dataset::Column;
use crate::kpi::GroupDimension;
use crate::stats::inference::Indicator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod loader;
pub mod validation;

/// Main configuration structure for an analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence interval settings
    pub inference: InferenceConfig,
    /// Shapiro-Wilk settings
    pub normality: NormalityConfig,
    /// ACF / Ljung-Box settings
    pub autocorrelation: AutocorrelationConfig,
    /// KPI grouping settings
    pub kpi: KpiConfig,
    /// Where and what to write
    pub output: OutputConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Confidence interval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Confidence level, strictly between 0 and 1
    pub confidence: f64,
    /// Indicators to estimate
    pub indicators: Vec<Indicator>,
}

/// Normality test configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalityConfig {
    /// Significance level
    pub alpha: f64,
    /// Larger series are subsampled to this many points
    pub max_sample: usize,
    /// Seed of the subsampling generator
    pub seed: u64,
    /// Columns tested by the pipeline
    pub columns: Vec<Column>,
}

/// Autocorrelation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocorrelationConfig {
    /// Upper bound on the number of lags
    pub max_lags: usize,
    /// Lag bound used for the monthly series of the pipeline
    pub pipeline_lags: usize,
    /// Z-score the series returned for plotting
    pub standardize: bool,
    /// Significance level of the Ljung-Box verdict
    pub alpha: f64,
}

/// KPI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Dimensions to group by
    pub dimensions: Vec<GroupDimension>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving tables and the report
    pub directory: PathBuf,
    /// Write `report.json`
    pub write_json: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            indicators: Indicator::ALL.to_vec(),
        }
    }
}

impl Default for NormalityConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_sample: 5000,
            seed: 42,
            columns: vec![Column::ProductPrice, Column::DeliveryLeadTime],
        }
    }
}

impl Default for AutocorrelationConfig {
    fn default() -> Self {
        Self {
            max_lags: 24,
            pipeline_lags: 12,
            standardize: true,
            alpha: 0.05,
        }
    }
}

impl AutocorrelationConfig {
    /// The same settings with the lag bound the pipeline applies to monthly series
    pub fn for_pipeline(&self) -> Self {
        Self {
            max_lags: self.pipeline_lags,
            ..self.clone()
        }
    }
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            dimensions: GroupDimension::ALL.to_vec(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            write_json: true,
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

impl AnalysisConfig {
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
}
