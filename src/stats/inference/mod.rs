//! Confidence intervals for order indicators
//!
//! Continuous indicators (ticket, lead time) use a Student-t interval around
//! the sample mean. Binary indicators (cancellation, lateness) use the
//! normal approximation for a proportion and are reported in percent.

use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;
use crate::dataset::{Column, OrderTable};
use crate::error::{Error, Result};
use crate::stats::descriptive::{drop_missing, mean, sample_std};
use crate::stats::distributions::{normal_quantile, student_t_quantile};

/// Point estimate with its two-sided interval
///
/// All three values are `None` when the interval is undefined (not enough
/// observations).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub estimate: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Observations the interval was computed from
    pub n: usize,
    pub confidence: f64,
}

impl ConfidenceInterval {
    fn undefined(n: usize, confidence: f64) -> Self {
        ConfidenceInterval {
            estimate: None,
            lower: None,
            upper: None,
            n,
            confidence,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.estimate.is_some()
    }
}

fn check_confidence(confidence: f64) -> Result<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidValue(format!(
            "confidence level must be in (0, 1), got {}",
            confidence
        )))
    }
}

/// Student-t interval for the mean of a nullable series
///
/// Missing values are dropped first; with one observation or none the
/// interval is undefined rather than an error.
pub fn mean_confidence_interval(
    values: &[Option<f64>],
    confidence: f64,
) -> Result<ConfidenceInterval> {
    check_confidence(confidence)?;

    let data = drop_missing(values);
    let n = data.len();
    let (m, s) = match (mean(&data), sample_std(&data)) {
        (Some(m), Some(s)) if n > 1 => (m, s),
        _ => return Ok(ConfidenceInterval::undefined(n, confidence)),
    };

    let sem = s / (n as f64).sqrt();
    let t = student_t_quantile((1.0 + confidence) / 2.0, (n - 1) as f64)?;
    let margin = t * sem;

    Ok(ConfidenceInterval {
        estimate: Some(m),
        lower: Some(m - margin),
        upper: Some(m + margin),
        n,
        confidence,
    })
}

/// Normal-approximation interval for a proportion, in percent
///
/// Bounds are clamped into [0, 100]. An empty sample gives an undefined
/// interval.
pub fn proportion_confidence_interval(
    successes: usize,
    n: usize,
    confidence: f64,
) -> Result<ConfidenceInterval> {
    check_confidence(confidence)?;

    if successes > n {
        return Err(Error::InvalidInput(format!(
            "{} successes out of {} trials",
            successes, n
        )));
    }
    if n == 0 {
        return Ok(ConfidenceInterval::undefined(0, confidence));
    }

    let p = successes as f64 / n as f64;
    let se = (p * (1.0 - p) / n as f64).sqrt();
    let z = normal_quantile((1.0 + confidence) / 2.0)?;
    let margin = z * se;

    Ok(ConfidenceInterval {
        estimate: Some(p * 100.0),
        lower: Some(((p - margin) * 100.0).max(0.0)),
        upper: Some(((p + margin) * 100.0).min(100.0)),
        n,
        confidence,
    })
}

/// Indicators the pipeline reports intervals for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Mean product price
    MeanTicket,
    /// Mean delivery lead time in days
    MeanLeadTime,
    /// Share of orders with `is_confirmed == 0`
    CancellationRate,
    /// Share of orders with `is_late == 1`
    LatenessRate,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::MeanTicket,
        Indicator::MeanLeadTime,
        Indicator::CancellationRate,
        Indicator::LatenessRate,
    ];

    pub fn column(&self) -> Column {
        match self {
            Indicator::MeanTicket => Column::ProductPrice,
            Indicator::MeanLeadTime => Column::DeliveryLeadTime,
            Indicator::CancellationRate => Column::IsConfirmed,
            Indicator::LatenessRate => Column::IsLate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::MeanTicket => "mean ticket",
            Indicator::MeanLeadTime => "mean lead time",
            Indicator::CancellationRate => "cancellation rate",
            Indicator::LatenessRate => "lateness rate",
        }
    }

    /// Unit suffix used when displaying the estimate
    pub fn unit(&self) -> &'static str {
        match self {
            Indicator::MeanTicket => "",
            Indicator::MeanLeadTime => " days",
            Indicator::CancellationRate | Indicator::LatenessRate => "%",
        }
    }

    pub fn is_proportion(&self) -> bool {
        matches!(self, Indicator::CancellationRate | Indicator::LatenessRate)
    }
}

/// Interval or the reason it could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorOutcome {
    Interval(ConfidenceInterval),
    MissingIndicator { column: Column },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorInterval {
    pub indicator: Indicator,
    pub outcome: IndicatorOutcome,
}

impl IndicatorInterval {
    pub fn interval(&self) -> Option<&ConfidenceInterval> {
        match &self.outcome {
            IndicatorOutcome::Interval(ci) => Some(ci),
            IndicatorOutcome::MissingIndicator { .. } => None,
        }
    }
}

/// Count the "successes" of a binary indicator over every record
///
/// Null flags stay in the denominator and never count as a success.
fn proportion_counts(table: &OrderTable, indicator: Indicator) -> (usize, usize) {
    let successes = table
        .records()
        .iter()
        .filter(|r| match indicator {
            Indicator::CancellationRate => r.is_confirmed == Some(0.0),
            Indicator::LatenessRate => r.is_late == Some(1),
            _ => false,
        })
        .count();
    (successes, table.len())
}

/// Confidence interval of a single indicator
pub fn indicator_interval(
    table: &OrderTable,
    indicator: Indicator,
    confidence: f64,
) -> Result<IndicatorInterval> {
    let column = indicator.column();
    if !table.has_column(column) {
        log::warn!(
            "Indicator '{}' skipped: column '{}' not found",
            indicator.label(),
            column
        );
        return Ok(IndicatorInterval {
            indicator,
            outcome: IndicatorOutcome::MissingIndicator { column },
        });
    }

    let ci = if indicator.is_proportion() {
        let (successes, n) = proportion_counts(table, indicator);
        proportion_confidence_interval(successes, n, confidence)?
    } else {
        let values = table.numeric_column(column).unwrap_or_default();
        mean_confidence_interval(&values, confidence)?
    };

    if !ci.is_defined() {
        log::warn!(
            "Indicator '{}' undefined: only {} usable observations",
            indicator.label(),
            ci.n
        );
    }

    Ok(IndicatorInterval {
        indicator,
        outcome: IndicatorOutcome::Interval(ci),
    })
}

/// Confidence intervals for every configured indicator
///
/// A missing column only affects its own indicator.
pub fn indicator_intervals(
    table: &OrderTable,
    config: &InferenceConfig,
) -> Result<Vec<IndicatorInterval>> {
    config
        .indicators
        .iter()
        .map(|&indicator| indicator_interval(table, indicator, config.confidence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::OrderRecord;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn test_mean_interval_known_values() {
        // mean 5.5, s = 3.02765, n = 10, t = 2.262157
        let values = some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let ci = mean_confidence_interval(&values, 0.95).unwrap();

        assert_eq!(ci.n, 10);
        assert!((ci.estimate.unwrap() - 5.5).abs() < 1e-12);
        assert!((ci.lower.unwrap() - 3.334149).abs() < 1e-4);
        assert!((ci.upper.unwrap() - 7.665851).abs() < 1e-4);
    }

    #[test]
    fn test_mean_interval_drops_missing() {
        let values = vec![Some(2.0), None, Some(4.0), Some(f64::NAN)];
        let ci = mean_confidence_interval(&values, 0.95).unwrap();
        assert_eq!(ci.n, 2);
        assert_eq!(ci.estimate, Some(3.0));
        assert!(ci.lower.unwrap() <= 3.0 && 3.0 <= ci.upper.unwrap());
    }

    #[test]
    fn test_mean_interval_undefined_for_small_samples() {
        let ci = mean_confidence_interval(&[Some(4.0), None], 0.95).unwrap();
        assert!(!ci.is_defined());
        assert_eq!((ci.estimate, ci.lower, ci.upper), (None, None, None));

        let ci = mean_confidence_interval(&[], 0.95).unwrap();
        assert_eq!(ci.n, 0);
        assert!(!ci.is_defined());
    }

    #[test]
    fn test_invalid_confidence() {
        assert!(mean_confidence_interval(&some(&[1.0, 2.0]), 1.0).is_err());
        assert!(proportion_confidence_interval(1, 2, 0.0).is_err());
    }

    #[test]
    fn test_proportion_interval() {
        let ci = proportion_confidence_interval(20, 100, 0.95).unwrap();
        // 20% ± 1.96 * 4%
        assert!((ci.estimate.unwrap() - 20.0).abs() < 1e-12);
        assert!((ci.lower.unwrap() - 12.16014).abs() < 1e-3);
        assert!((ci.upper.unwrap() - 27.83986).abs() < 1e-3);
    }

    #[test]
    fn test_proportion_interval_is_clamped() {
        let ci = proportion_confidence_interval(1, 50, 0.95).unwrap();
        assert_eq!(ci.lower, Some(0.0));

        let ci = proportion_confidence_interval(49, 50, 0.95).unwrap();
        assert_eq!(ci.upper, Some(100.0));

        let ci = proportion_confidence_interval(0, 0, 0.95).unwrap();
        assert!(!ci.is_defined());
        assert!(proportion_confidence_interval(3, 2, 0.95).is_err());
    }

    #[test]
    fn test_indicator_missing_column_does_not_block_others() {
        let records = vec![
            OrderRecord {
                product_price: Some(10.0),
                is_late: Some(1),
                ..Default::default()
            },
            OrderRecord {
                product_price: Some(30.0),
                is_late: Some(0),
                ..Default::default()
            },
        ];
        let table = OrderTable::new([Column::ProductPrice, Column::IsLate], records);
        let results = indicator_intervals(&table, &InferenceConfig::default()).unwrap();

        assert_eq!(results.len(), 4);
        let ticket = results[0].interval().unwrap();
        assert_eq!(ticket.estimate, Some(20.0));
        assert_eq!(
            results[1].outcome,
            IndicatorOutcome::MissingIndicator {
                column: Column::DeliveryLeadTime
            }
        );
        assert!(results[2].interval().is_none());
        assert_eq!(results[3].interval().unwrap().estimate, Some(50.0));
    }

    #[test]
    fn test_proportion_denominator_keeps_null_flags() {
        let records = vec![
            OrderRecord {
                is_confirmed: Some(0.0),
                ..Default::default()
            },
            OrderRecord {
                is_confirmed: None,
                ..Default::default()
            },
            OrderRecord {
                is_confirmed: Some(1.0),
                ..Default::default()
            },
            OrderRecord {
                is_confirmed: Some(1.0),
                ..Default::default()
            },
        ];
        let table = OrderTable::new([Column::IsConfirmed], records);
        let result = indicator_interval(&table, Indicator::CancellationRate, 0.95).unwrap();
        let ci = result.interval().unwrap();
        assert_eq!(ci.n, 4);
        assert_eq!(ci.estimate, Some(25.0));
    }
}
