//! Statistics Module
//!
//! Descriptive summaries, confidence intervals, normality testing and the
//! distribution helpers they share.

pub mod descriptive;
pub mod distributions;
pub mod inference;
pub mod normality;
pub mod sampling;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use descriptive::{correlation_matrix, drop_missing, CorrelationMatrix};
pub use inference::{
    indicator_intervals, mean_confidence_interval, proportion_confidence_interval,
    ConfidenceInterval, Indicator, IndicatorInterval, IndicatorOutcome,
};
pub use normality::{
    indicator_normality, normality_test, shapiro_wilk, ColumnNormality, NormalityOutcome,
    NormalityResult, NormalityVerdict, ShapiroWilkResult,
};

/// Structure holding descriptive statistics results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of data points
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Standard deviation (unbiased estimator)
    pub std: f64,
    /// Minimum value
    pub min: f64,
    /// 25% quantile
    pub q1: f64,
    /// Median (50% quantile)
    pub median: f64,
    /// 75% quantile
    pub q3: f64,
    /// Maximum value
    pub max: f64,
}

/// Calculate descriptive statistics
///
/// # Description
/// Computes count, mean, sample standard deviation, min, quartiles and max
/// of a numeric slice. Quartiles use linear interpolation.
///
/// # Example
/// ```rust
/// use orders_eda::stats;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let summary = stats::describe(&data).unwrap();
/// assert_eq!(summary.median, 3.0);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> Result<DescriptiveStats> {
    descriptive::describe_impl(data.as_ref())
}

/// Calculate correlation coefficient
///
/// # Description
/// Calculates the Pearson correlation coefficient between two numeric arrays.
/// Fails when the lengths differ, fewer than two points are given or either
/// side has zero variance.
///
/// # Example
/// ```rust
/// use orders_eda::stats;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = vec![2.0, 4.0, 5.0, 4.0, 5.0];
/// let corr = stats::correlation(&x, &y).unwrap();
/// println!("Correlation coefficient: {}", corr);
/// ```
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    descriptive::correlation_impl(x.as_ref(), y.as_ref())
}
