//! Configuration validation utilities
//!
//! Range checks for every section of an [`AnalysisConfig`].

use super::*;
use crate::core::error::{Error, Result};
use crate::stats::normality::{MAX_OBSERVATIONS, MIN_OBSERVATIONS};

/// Validate the entire configuration
pub fn validate_config(config: &AnalysisConfig) -> Result<()> {
    validate_inference_config(&config.inference)?;
    validate_normality_config(&config.normality)?;
    validate_autocorrelation_config(&config.autocorrelation)?;
    validate_kpi_config(&config.kpi)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate confidence interval configuration
pub fn validate_inference_config(config: &InferenceConfig) -> Result<()> {
    validate_open_unit(config.confidence, "confidence level")?;
    validate_unique(&config.indicators, "indicator")
}

/// Validate normality test configuration
pub fn validate_normality_config(config: &NormalityConfig) -> Result<()> {
    validate_open_unit(config.alpha, "normality alpha")?;

    if !(MIN_OBSERVATIONS..=MAX_OBSERVATIONS).contains(&config.max_sample) {
        return Err(Error::ConfigurationError(format!(
            "Normality max_sample must be between {} and {}, got {}",
            MIN_OBSERVATIONS, MAX_OBSERVATIONS, config.max_sample
        )));
    }

    if let Some(column) = config.columns.iter().find(|c| !c.is_numeric()) {
        return Err(Error::ConfigurationError(format!(
            "Normality column '{}' is not numeric",
            column
        )));
    }

    validate_unique(&config.columns, "normality column")
}

/// Validate autocorrelation configuration
pub fn validate_autocorrelation_config(config: &AutocorrelationConfig) -> Result<()> {
    if config.max_lags == 0 {
        return Err(Error::ConfigurationError(
            "Autocorrelation max_lags must be greater than 0".to_string(),
        ));
    }

    if config.pipeline_lags == 0 {
        return Err(Error::ConfigurationError(
            "Autocorrelation pipeline_lags must be greater than 0".to_string(),
        ));
    }

    validate_open_unit(config.alpha, "autocorrelation alpha")
}

/// Validate KPI configuration
pub fn validate_kpi_config(config: &KpiConfig) -> Result<()> {
    validate_unique(&config.dimensions, "KPI dimension")
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];

    if !valid_levels.contains(&config.level.as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log level '{}'. Valid levels: {}",
            config.level,
            valid_levels.join(", ")
        )));
    }

    Ok(())
}

fn validate_open_unit(value: f64, context: &str) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::ConfigurationError(format!(
            "{} must be strictly between 0 and 1, got {}",
            context, value
        )))
    }
}

fn validate_unique<T: PartialEq + std::fmt::Debug>(items: &[T], context: &str) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(Error::ConfigurationError(format!(
                "Duplicate {}: {:?}",
                context, item
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_confidence_bounds() {
        let mut config = AnalysisConfig::default();
        config.inference.confidence = 1.0;
        assert!(validate_config(&config).is_err());

        config.inference.confidence = 0.0;
        assert!(validate_config(&config).is_err());

        config.inference.confidence = 0.5;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_normality_settings() {
        let mut config = NormalityConfig::default();
        config.max_sample = 6000;
        assert!(validate_normality_config(&config).is_err());

        let mut config = NormalityConfig::default();
        config.columns.push(Column::Category);
        assert!(validate_normality_config(&config).is_err());

        let mut config = NormalityConfig::default();
        config.columns.push(Column::ProductPrice);
        assert!(validate_normality_config(&config).is_err());
    }

    #[test]
    fn test_autocorrelation_settings() {
        let mut config = AutocorrelationConfig::default();
        config.max_lags = 0;
        assert!(validate_autocorrelation_config(&config).is_err());

        let mut config = AutocorrelationConfig::default();
        config.alpha = 1.5;
        assert!(validate_autocorrelation_config(&config).is_err());
    }

    #[test]
    fn test_logging_level() {
        let config = LoggingConfig {
            level: "verbose".to_string(),
        };
        assert!(validate_logging_config(&config).is_err());
    }

    #[test]
    fn test_duplicate_dimensions() {
        let config = KpiConfig {
            dimensions: vec![GroupDimension::Category, GroupDimension::Category],
        };
        assert!(validate_kpi_config(&config).is_err());
    }
}
