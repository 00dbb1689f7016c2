//! Autocorrelation diagnostics
//!
//! Sample autocorrelation function with Bartlett confidence bands and the
//! Ljung-Box portmanteau test evaluated at every lag up to the chosen
//! horizon.

use serde::{Deserialize, Serialize};

use crate::config::AutocorrelationConfig;
use crate::error::{Error, Result};
use crate::stats::descriptive::{drop_missing, mean, sample_std};
use crate::stats::distributions::{chi_squared_sf, normal_quantile};

/// Sample autocorrelation for lags `0..=nlags`
///
/// Uses the biased estimator (every lag divided by the full sum of squared
/// deviations), so lag 0 is exactly 1. `nlags` is clamped to `n - 1`.
pub fn autocorrelation(values: &[f64], nlags: usize) -> Result<Vec<f64>> {
    let n = values.len();
    if n < 2 {
        return Err(Error::InsufficientData(
            "Autocorrelation requires at least 2 observations".into(),
        ));
    }

    let m = values.iter().sum::<f64>() / n as f64;
    let denominator = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    if denominator == 0.0 {
        return Err(Error::Computation(
            "Autocorrelation undefined for a constant series".into(),
        ));
    }

    let nlags = nlags.min(n - 1);
    let acf = (0..=nlags)
        .map(|lag| {
            let numerator = (0..n - lag)
                .map(|i| (values[i] - m) * (values[i + lag] - m))
                .sum::<f64>();
            numerator / denominator
        })
        .collect();

    Ok(acf)
}

/// Ljung-Box statistic at one lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBoxLag {
    pub lag: usize,
    pub statistic: f64,
    pub p_value: f64,
}

/// Ljung-Box Q statistic and p-value for every lag `1..=nlags`
///
/// Q_k = n(n+2) Σ_{j≤k} r_j² / (n − j), compared against χ²(k).
pub fn ljung_box(values: &[f64], nlags: usize) -> Result<Vec<LjungBoxLag>> {
    let acf = autocorrelation(values, nlags)?;
    let n = values.len() as f64;

    let mut cumulative = 0.0;
    let mut table = Vec::with_capacity(acf.len().saturating_sub(1));
    for (lag, r) in acf.iter().enumerate().skip(1) {
        cumulative += r * r / (n - lag as f64);
        let statistic = n * (n + 2.0) * cumulative;
        table.push(LjungBoxLag {
            lag,
            statistic,
            p_value: chi_squared_sf(statistic, lag as f64)?,
        });
    }

    Ok(table)
}

/// One point of the autocorrelation plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcfPoint {
    pub lag: usize,
    pub value: f64,
    /// Half-width of the Bartlett band around zero
    pub band: f64,
}

impl AcfPoint {
    pub fn is_significant(&self) -> bool {
        self.lag > 0 && self.value.abs() > self.band
    }
}

fn bartlett_bands(acf: &[f64], n: usize, alpha: f64) -> Result<Vec<AcfPoint>> {
    let z = normal_quantile(1.0 - alpha / 2.0)?;
    let mut sum_sq = 0.0;
    let mut points = Vec::with_capacity(acf.len());

    for (lag, &value) in acf.iter().enumerate() {
        let band = if lag == 0 {
            0.0
        } else {
            let band = z * ((1.0 + 2.0 * sum_sq) / n as f64).sqrt();
            sum_sq += value * value;
            band
        };
        points.push(AcfPoint { lag, value, band });
    }

    Ok(points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocorrelationVerdict {
    Independent,
    TemporalDependence,
}

impl AutocorrelationVerdict {
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value > alpha {
            AutocorrelationVerdict::Independent
        } else {
            AutocorrelationVerdict::TemporalDependence
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AutocorrelationVerdict::Independent => {
                "no significant autocorrelation (approximately independent)"
            }
            AutocorrelationVerdict::TemporalDependence => {
                "significant autocorrelation (temporal dependence)"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocorrelationResult {
    pub name: String,
    pub n_valid: usize,
    /// Lags actually tested, `min(max_lags, n - 1)`
    pub lags: usize,
    /// Series handed to plotting, z-scored when standardization is on
    pub series: Vec<f64>,
    pub acf: Vec<AcfPoint>,
    pub ljung_box: Vec<LjungBoxLag>,
    /// Ljung-Box p-value at the last lag
    pub p_value: f64,
    pub verdict: AutocorrelationVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutocorrelationOutcome {
    Tested(AutocorrelationResult),
    /// Too few observations for at least one lag
    TooShort { name: String, n_valid: usize },
    ZeroVariance { name: String, n_valid: usize },
}

impl AutocorrelationOutcome {
    pub fn result(&self) -> Option<&AutocorrelationResult> {
        match self {
            AutocorrelationOutcome::Tested(r) => Some(r),
            _ => None,
        }
    }
}

/// ACF and Ljung-Box diagnostics for a named series
///
/// Missing values are dropped first. Standardization only changes the
/// returned plotting series; the ACF is scale invariant.
pub fn test_autocorrelation(
    name: &str,
    values: &[Option<f64>],
    config: &AutocorrelationConfig,
) -> Result<AutocorrelationOutcome> {
    let data = drop_missing(values);
    let n_valid = data.len();

    if n_valid < 2 {
        log::warn!("{}: too few observations for autocorrelation ({})", name, n_valid);
        return Ok(AutocorrelationOutcome::TooShort {
            name: name.to_string(),
            n_valid,
        });
    }

    let std = sample_std(&data).unwrap_or(0.0);
    let series = match mean(&data) {
        Some(m) if config.standardize && std > 0.0 => data.iter().map(|v| (v - m) / std).collect(),
        _ => data.clone(),
    };

    let lags = config.max_lags.min(n_valid - 1);
    if lags < 1 {
        log::warn!("{}: no lag available for autocorrelation", name);
        return Ok(AutocorrelationOutcome::TooShort {
            name: name.to_string(),
            n_valid,
        });
    }

    if std == 0.0 {
        log::warn!("{}: constant series, autocorrelation undefined", name);
        return Ok(AutocorrelationOutcome::ZeroVariance {
            name: name.to_string(),
            n_valid,
        });
    }

    let acf = autocorrelation(&data, lags)?;
    let acf = bartlett_bands(&acf, n_valid, config.alpha)?;
    let ljung_box = ljung_box(&data, lags)?;
    let p_value = ljung_box.last().map(|l| l.p_value).unwrap_or(1.0);
    let verdict = AutocorrelationVerdict::from_p_value(p_value, config.alpha);

    log::info!(
        "{}: Ljung-Box p={:.4} at lag {} -> {}",
        name,
        p_value,
        lags,
        verdict.message()
    );

    Ok(AutocorrelationOutcome::Tested(AutocorrelationResult {
        name: name.to_string(),
        n_valid,
        lags,
        series,
        acf,
        ljung_box,
        p_value,
        verdict,
    }))
}
