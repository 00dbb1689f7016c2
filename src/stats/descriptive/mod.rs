//! Descriptive statistics over nullable numeric columns

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::DescriptiveStats;

/// Keep only the finite, non-missing observations
pub fn drop_missing(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (ddof = 1), `None` below two observations
pub fn sample_std(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss = data.iter().map(|&x| (x - m).powi(2)).sum::<f64>();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Internal implementation for calculating descriptive statistics
pub(crate) fn describe_impl(data: &[f64]) -> Result<DescriptiveStats> {
    if data.is_empty() {
        return Err(Error::EmptyData(
            "At least one data point is required for descriptive statistics".into(),
        ));
    }

    let count = data.len();
    let mean = data.iter().sum::<f64>() / count as f64;
    let std = sample_std(data).unwrap_or(0.0);

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(DescriptiveStats {
        count,
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolation percentile of sorted data
fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }

    let n = sorted_data.len();
    let idx = p * (n - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;

    if lo == hi {
        return sorted_data[lo];
    }

    let weight_hi = idx - lo as f64;
    sorted_data[lo] * (1.0 - weight_hi) + sorted_data[hi] * weight_hi
}

/// Pearson correlation coefficient
pub fn correlation_impl(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(format!(
            "Data lengths do not match for correlation calculation: x={}, y={}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n <= 1 {
        return Err(Error::InsufficientData(
            "Correlation calculation requires at least 2 data points".into(),
        ));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    // Σ(xi - x̄)(yi - ȳ)
    let numerator = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y))
        .sum::<f64>();

    let ss_x = x.iter().map(|&xi| (xi - mean_x).powi(2)).sum::<f64>();
    let ss_y = y.iter().map(|&yi| (yi - mean_y).powi(2)).sum::<f64>();
    let denominator = (ss_x * ss_y).sqrt();

    if denominator.abs() < f64::EPSILON {
        return Err(Error::Computation(
            "Correlation calculation: zero variance".into(),
        ));
    }

    Ok(numerator / denominator)
}

/// Square matrix of pairwise Pearson correlations
///
/// Cells are `None` where a correlation is undefined (a constant column or
/// fewer than two rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    /// Number of rows the correlations were computed on
    pub n_observations: usize,
}

impl CorrelationMatrix {
    /// Correlation between two labelled variables
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Build a correlation matrix from equally long columns
pub fn correlation_matrix(labels: Vec<String>, columns: &[Vec<f64>]) -> Result<CorrelationMatrix> {
    if labels.len() != columns.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} labels for {} columns",
            labels.len(),
            columns.len()
        )));
    }

    let n_observations = columns.first().map(|c| c.len()).unwrap_or(0);
    if let Some(bad) = columns.iter().find(|c| c.len() != n_observations) {
        return Err(Error::DimensionMismatch(format!(
            "column of length {} where {} expected",
            bad.len(),
            n_observations
        )));
    }

    let k = columns.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = correlation_impl(&columns[i], &columns[j]).ok();
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        labels,
        values,
        n_observations,
    })
}
