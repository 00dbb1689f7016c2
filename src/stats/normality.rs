//! Shapiro-Wilk normality testing
//!
//! The W statistic and its p-value follow Royston's approximation
//! (Applied Statistics algorithm AS R94): the coefficients are built from
//! expected normal order statistics with polynomial corrections for the two
//! extreme pairs, and W is mapped to a normal deviate with a sample-size
//! dependent transform.

use serde::{Deserialize, Serialize};

use crate::config::NormalityConfig;
use crate::dataset::{Column, OrderTable};
use crate::error::{Error, Result};
use crate::stats::descriptive::drop_missing;
use crate::stats::distributions::{normal_quantile, normal_sf};
use crate::stats::sampling::sample_without_replacement;

/// Smallest sample the test is defined for
pub const MIN_OBSERVATIONS: usize = 3;
/// Largest sample the approximation is calibrated for
pub const MAX_OBSERVATIONS: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

// 6/pi and asin(sqrt(3/4)) for the exact n = 3 distribution
const PI6: f64 = 1.909_859_317_102_74;
const STQR: f64 = 1.047_197_551_196_60;

const SMALL: f64 = 1e-19;

/// Evaluate c[0] + c[1]·x + c[2]·x² + …
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Raw Shapiro-Wilk statistic and p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroWilkResult {
    pub statistic: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Antisymmetric Shapiro-Wilk coefficients for the lower half of the sample
fn coefficients(n: usize) -> Result<Vec<f64>> {
    let half = n / 2;
    let mut a = vec![0.0; half];

    if n == 3 {
        a[0] = std::f64::consts::FRAC_1_SQRT_2;
        return Ok(a);
    }

    let an25 = n as f64 + 0.25;
    let m = (1..=half)
        .map(|i| normal_quantile((i as f64 - 0.375) / an25))
        .collect::<Result<Vec<f64>>>()?;

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };

    a[0] = a1;
    for i in first..half {
        a[i] = -m[i] / fac;
    }

    Ok(a)
}

/// p-value of an observed W for sample size n
fn p_value(w: f64, n: usize) -> Result<f64> {
    if n == 3 {
        let pw = PI6 * (w.sqrt().asin() - STQR);
        return Ok(pw.clamp(0.0, 1.0));
    }

    if w >= 1.0 {
        return Ok(1.0);
    }

    let an = n as f64;
    let w1 = (1.0 - w).ln();

    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if w1 >= gamma {
            return Ok(1e-99);
        }
        (-(gamma - w1).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (w1, poly(&C5, xx), poly(&C6, xx).exp())
    };

    normal_sf(y, m, s)
}

/// Shapiro-Wilk test on a complete sample
///
/// Requires between 3 and 5000 observations and a non-zero range. The
/// caller is responsible for subsampling larger inputs.
pub fn shapiro_wilk(data: &[f64]) -> Result<ShapiroWilkResult> {
    let n = data.len();
    if n < MIN_OBSERVATIONS {
        return Err(Error::InsufficientData(
            "At least 3 observations required for Shapiro-Wilk test".into(),
        ));
    }
    if n > MAX_OBSERVATIONS {
        return Err(Error::InvalidInput(format!(
            "Shapiro-Wilk test supports at most {} observations, got {}",
            MAX_OBSERVATIONS, n
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput(
            "Shapiro-Wilk test requires finite observations".into(),
        ));
    }

    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    if x[n - 1] - x[0] < SMALL {
        return Err(Error::Computation(
            "Shapiro-Wilk test undefined for data with zero range".into(),
        ));
    }

    let a = coefficients(n)?;

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    let numerator = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum::<f64>();

    let statistic = (numerator.powi(2) / ssq).min(1.0);
    let p_value = p_value(statistic, n)?;

    Ok(ShapiroWilkResult {
        statistic,
        p_value,
        n,
    })
}

/// Reading of a normality p-value at the configured significance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalityVerdict {
    ConsistentWithNormal,
    RejectsNormality,
}

impl NormalityVerdict {
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value > alpha {
            NormalityVerdict::ConsistentWithNormal
        } else {
            NormalityVerdict::RejectsNormality
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NormalityVerdict::ConsistentWithNormal => "consistent with normal distribution",
            NormalityVerdict::RejectsNormality => "rejects normality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Valid observations before any subsampling
    pub n_valid: usize,
    /// Observations the statistic was computed on
    pub sample_size: usize,
    pub subsampled: bool,
    pub verdict: NormalityVerdict,
}

/// Outcome of a normality check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalityOutcome {
    Tested(NormalityResult),
    /// Fewer than three valid observations
    InsufficientData { n_valid: usize },
    /// Every valid observation has the same value
    ConstantData { n_valid: usize },
    /// The column was not in the dataset
    MissingColumn { column: Column },
}

impl NormalityOutcome {
    pub fn result(&self) -> Option<&NormalityResult> {
        match self {
            NormalityOutcome::Tested(r) => Some(r),
            _ => None,
        }
    }
}

/// Normality check on a nullable series
///
/// Missing values are dropped. Series above `config.max_sample` valid
/// points are reduced to exactly that many with a seeded sample, so the
/// same input always yields the same statistic.
pub fn normality_test(
    values: &[Option<f64>],
    config: &NormalityConfig,
) -> Result<NormalityOutcome> {
    let data = drop_missing(values);
    let n_valid = data.len();

    if n_valid < MIN_OBSERVATIONS {
        return Ok(NormalityOutcome::InsufficientData { n_valid });
    }

    let cap = config.max_sample.min(MAX_OBSERVATIONS);
    let (sample, subsampled) = if n_valid > cap {
        log::debug!(
            "Normality test: sampling {} of {} observations (seed {})",
            cap,
            n_valid,
            config.seed
        );
        (sample_without_replacement(&data, cap, config.seed)?, true)
    } else {
        (data, false)
    };

    let (lo, hi) = sample
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi - lo < SMALL {
        return Ok(NormalityOutcome::ConstantData { n_valid });
    }

    let sw = shapiro_wilk(&sample)?;
    Ok(NormalityOutcome::Tested(NormalityResult {
        statistic: sw.statistic,
        p_value: sw.p_value,
        n_valid,
        sample_size: sw.n,
        subsampled,
        verdict: NormalityVerdict::from_p_value(sw.p_value, config.alpha),
    }))
}

/// Normality check of one dataset column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNormality {
    pub column: Column,
    pub outcome: NormalityOutcome,
}

/// Run the normality check on every configured indicator column
pub fn indicator_normality(
    table: &OrderTable,
    config: &NormalityConfig,
) -> Result<Vec<ColumnNormality>> {
    let mut results = Vec::with_capacity(config.columns.len());

    for &column in &config.columns {
        let outcome = match table.numeric_column(column) {
            Some(values) => normality_test(&values, config)?,
            None => {
                log::warn!("Normality test skipped: column '{}' not found", column);
                NormalityOutcome::MissingColumn { column }
            }
        };

        match &outcome {
            NormalityOutcome::Tested(r) => log::info!(
                "{}: W={:.4}, p={:.4} -> {}",
                column,
                r.statistic,
                r.p_value,
                r.verdict.message()
            ),
            NormalityOutcome::InsufficientData { n_valid } => {
                log::warn!(
                    "{}: insufficient data for the normality test ({} values)",
                    column,
                    n_valid
                )
            }
            NormalityOutcome::ConstantData { .. } => {
                log::warn!("{}: constant values, normality test undefined", column)
            }
            NormalityOutcome::MissingColumn { .. } => {}
        }

        results.push(ColumnNormality { column, outcome });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::distributions::normal_quantile;

    fn normal_scores(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| normal_quantile(i as f64 / (n as f64 + 1.0)).unwrap())
            .collect()
    }

    #[test]
    fn test_poly() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(poly(&[0.5], 10.0), 0.5);
    }

    #[test]
    fn test_exact_three_point_case() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);

        let r = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        assert!((r.statistic - 0.964286).abs() < 1e-5);
        assert!((r.p_value - 0.636884).abs() < 1e-3);
    }

    #[test]
    fn test_small_sample_reference_values() {
        // n <= 11 uses the gamma/log transform
        let r = shapiro_wilk(&[2.1, 3.4, 1.9, 5.6, 4.2, 3.3, 2.8, 6.1]).unwrap();
        assert!((r.statistic - 0.922_799_18).abs() < 1e-6, "W={}", r.statistic);
        assert!((r.p_value - 0.452_985_94).abs() < 1e-5, "p={}", r.p_value);

        // Shapiro and Wilk's weights example
        let weights = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let r = shapiro_wilk(&weights).unwrap();
        assert!((r.statistic - 0.788_814_69).abs() < 1e-6, "W={}", r.statistic);
        assert!((r.p_value - 0.006_703_81).abs() < 1e-6, "p={}", r.p_value);
    }

    #[test]
    fn test_large_sample_reference_values() {
        // n >= 12 uses the log-normal transform of 1 - W
        let outlier = [
            4.2, 5.1, 3.9, 6.3, 5.5, 4.8, 7.2, 5.0, 4.4, 6.1, 5.7, 3.6, 4.9, 5.3, 6.8, 4.1, 5.9,
            5.2, 4.6, 12.5,
        ];
        let r = shapiro_wilk(&outlier).unwrap();
        assert!((r.statistic - 0.723_393_75).abs() < 1e-6, "W={}", r.statistic);
        assert!((r.p_value - 7.625_963e-5).abs() < 1e-8, "p={}", r.p_value);

        let symmetric = [
            2.5, 3.1, 2.8, 3.6, 2.9, 3.3, 3.0, 2.7, 3.4, 3.2, 2.6, 3.5, 3.0, 2.9, 3.1, 2.8, 3.3,
            3.0, 3.2, 2.7, 3.1, 2.9, 3.4, 3.0, 2.8,
        ];
        let r = shapiro_wilk(&symmetric).unwrap();
        assert!((r.statistic - 0.982_213_69).abs() < 1e-6, "W={}", r.statistic);
        assert!((r.p_value - 0.925_166_53).abs() < 1e-5, "p={}", r.p_value);
    }

    #[test]
    fn test_normal_scores_look_normal() {
        for n in [8, 20, 200] {
            let r = shapiro_wilk(&normal_scores(n)).unwrap();
            assert!(r.statistic > 0.95, "n={} W={}", n, r.statistic);
            assert!(r.p_value > 0.05, "n={} p={}", n, r.p_value);
        }
    }

    #[test]
    fn test_skewed_data_rejects_normality() {
        let data: Vec<f64> = (0..60).map(|i| (i as f64 / 6.0).exp()).collect();
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.statistic < 0.9);
        assert!(r.p_value < 0.05);
    }

    #[test]
    fn test_shapiro_wilk_input_checks() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[2.0, 2.0, 2.0, 2.0]).is_err());
        assert!(shapiro_wilk(&vec![0.0; MAX_OBSERVATIONS + 1]).is_err());
        assert!(shapiro_wilk(&[1.0, f64::NAN, 3.0]).is_err());
    }

    #[test]
    fn test_verdict_threshold() {
        assert_eq!(
            NormalityVerdict::from_p_value(0.05, 0.05),
            NormalityVerdict::RejectsNormality
        );
        assert_eq!(
            NormalityVerdict::from_p_value(0.0501, 0.05),
            NormalityVerdict::ConsistentWithNormal
        );
        assert_eq!(
            NormalityVerdict::RejectsNormality.message(),
            "rejects normality"
        );
    }

    #[test]
    fn test_normality_test_degenerate_inputs() {
        let config = NormalityConfig::default();
        let outcome = normality_test(&[Some(1.0), None, Some(2.0)], &config).unwrap();
        assert_eq!(outcome, NormalityOutcome::InsufficientData { n_valid: 2 });

        let outcome = normality_test(&[Some(4.0); 10], &config).unwrap();
        assert_eq!(outcome, NormalityOutcome::ConstantData { n_valid: 10 });
    }

    #[test]
    fn test_large_input_is_subsampled_reproducibly() {
        let config = NormalityConfig::default();
        let values: Vec<Option<f64>> = (0..6500)
            .map(|i| Some(((i * 7919) % 6500) as f64 / 100.0))
            .collect();

        let first = normality_test(&values, &config).unwrap();
        let second = normality_test(&values, &config).unwrap();
        assert_eq!(first, second);

        let result = first.result().unwrap();
        assert_eq!(result.n_valid, 6500);
        assert_eq!(result.sample_size, 5000);
        assert!(result.subsampled);
    }
}
