//! End-to-end analysis of an orders table
//!
//! [`run`] derives the features once and feeds the read-only result to every
//! analysis, collecting their outcomes into one serializable report.

pub mod correlation;
pub mod inspection;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::dataset::OrderTable;
use crate::error::Result;
use crate::features::derive_features;
use crate::kpi::{compute_all_kpis, KpiOutcome};
use crate::stats::descriptive::CorrelationMatrix;
use crate::stats::inference::{indicator_intervals, IndicatorInterval, IndicatorOutcome};
use crate::stats::normality::{indicator_normality, ColumnNormality, NormalityOutcome};
use crate::time_series::autocorrelation::{test_autocorrelation, AutocorrelationOutcome};
use crate::time_series::monthly::{monthly_summary, MonthlyField, MonthlySummaryTable};

pub use correlation::{feature_correlation, FEATURE_CORRELATION_COLUMNS};
pub use inspection::{inspect, ColumnInspection, DatasetInspection};

/// One derived view of a monthly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyView {
    pub field: MonthlyField,
    pub standardized: Vec<Option<f64>>,
    /// Percent change from the previous month
    pub pct_change: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub inspection: DatasetInspection,
    pub feature_correlation: Option<CorrelationMatrix>,
    pub monthly: MonthlySummaryTable,
    pub monthly_views: Vec<MonthlyView>,
    pub monthly_correlation: Option<CorrelationMatrix>,
    pub confidence_intervals: Vec<IndicatorInterval>,
    pub normality: Vec<ColumnNormality>,
    pub autocorrelation: Vec<AutocorrelationOutcome>,
    pub kpis: Vec<KpiOutcome>,
}

impl AnalysisReport {
    /// Human readable findings, one line each
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} orders, {} missing cells, {} months",
            self.inspection.rows,
            self.inspection.total_missing(),
            self.monthly.len()
        )];

        for ci in &self.confidence_intervals {
            let label = ci.indicator.label();
            let unit = ci.indicator.unit();
            match &ci.outcome {
                IndicatorOutcome::Interval(interval) => {
                    match (interval.estimate, interval.lower, interval.upper) {
                        (Some(est), Some(lo), Some(hi)) => lines.push(format!(
                            "{}: {:.2}{} ({:.0}% CI {:.2} to {:.2})",
                            label,
                            est,
                            unit,
                            interval.confidence * 100.0,
                            lo,
                            hi
                        )),
                        _ => lines.push(format!("{}: not enough data (n={})", label, interval.n)),
                    }
                }
                IndicatorOutcome::MissingIndicator { column } => {
                    lines.push(format!("{}: column '{}' missing", label, column))
                }
            }
        }

        for check in &self.normality {
            let line = match &check.outcome {
                NormalityOutcome::Tested(r) => format!(
                    "{} normality: W={:.4}, p={:.4} -> {}",
                    check.column,
                    r.statistic,
                    r.p_value,
                    r.verdict.message()
                ),
                NormalityOutcome::InsufficientData { n_valid } => {
                    format!("{} normality: insufficient data ({} values)", check.column, n_valid)
                }
                NormalityOutcome::ConstantData { .. } => {
                    format!("{} normality: constant values", check.column)
                }
                NormalityOutcome::MissingColumn { .. } => {
                    format!("{} normality: column missing", check.column)
                }
            };
            lines.push(line);
        }

        for outcome in &self.autocorrelation {
            let line = match outcome {
                AutocorrelationOutcome::Tested(r) => format!(
                    "{} autocorrelation: Ljung-Box p={:.4} (lag {}) -> {}",
                    r.name,
                    r.p_value,
                    r.lags,
                    r.verdict.message()
                ),
                AutocorrelationOutcome::TooShort { name, n_valid } => {
                    format!("{} autocorrelation: series too short ({} values)", name, n_valid)
                }
                AutocorrelationOutcome::ZeroVariance { name, .. } => {
                    format!("{} autocorrelation: constant series", name)
                }
            };
            lines.push(line);
        }

        for kpi in &self.kpis {
            match kpi.rows() {
                Some(rows) => {
                    lines.push(format!("KPIs by {}: {} groups", kpi.dimension(), rows.len()))
                }
                None => lines.push(format!("KPIs by {}: column missing", kpi.dimension())),
            }
        }

        lines
    }
}

/// Run every analysis on `table`
///
/// The input is left untouched; features are derived into a new table first.
/// Degenerate inputs show up as outcomes in the report. Only invalid
/// settings produce an error.
pub fn run(table: &OrderTable, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    log::info!("Analyzing {} orders", table.len());

    let derived = derive_features(table);

    let inspection = inspect(&derived)?;
    let feature_correlation = feature_correlation(&derived)?;

    let monthly = monthly_summary(&derived);
    let monthly_views = MonthlyField::ALL
        .iter()
        .map(|&field| MonthlyView {
            field,
            standardized: monthly.standardized(field),
            pct_change: monthly.pct_change(field),
        })
        .collect();
    let monthly_correlation = if monthly.len() >= 2 {
        Some(monthly.correlation_matrix()?)
    } else {
        None
    };

    let confidence_intervals = indicator_intervals(&derived, &config.inference)?;
    let normality = indicator_normality(&derived, &config.normality)?;

    let acf_config = config.autocorrelation.for_pipeline();
    let autocorrelation = MonthlyField::ALL
        .iter()
        .map(|&field| {
            let values: Vec<Option<f64>> =
                monthly.series(field).into_iter().map(Some).collect();
            test_autocorrelation(field.label(), &values, &acf_config)
        })
        .collect::<Result<Vec<_>>>()?;

    let kpis = compute_all_kpis(&derived, &config.kpi.dimensions);

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        inspection,
        feature_correlation,
        monthly,
        monthly_views,
        monthly_correlation,
        confidence_intervals,
        normality,
        autocorrelation,
        kpis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, OrderRecord};
    use crate::error::Error;
    use crate::features::parse_timestamp;

    fn order(date: &str, price: f64, category: &str) -> OrderRecord {
        OrderRecord {
            order_date: parse_timestamp(date),
            delivery_forecast: parse_timestamp(date),
            delivery_date: parse_timestamp(date),
            subtotal: Some(price + 1.0),
            discount: Some(1.0),
            total: Some(price),
            freight_price: Some(price / 10.0),
            product_price: Some(price),
            is_confirmed: Some(1.0),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_does_not_modify_input() {
        let table = OrderTable::from_records(vec![
            order("2024-01-05", 10.0, "a"),
            order("2024-02-05", 20.0, "b"),
        ]);
        let before = table.clone();
        let report = run(&table, &AnalysisConfig::default()).unwrap();

        assert_eq!(table, before);
        assert!(!table.has_column(Column::IsLate));
        assert!(report.inspection.column(Column::IsLate).is_some());
    }

    #[test]
    fn test_run_on_small_table_reports_degenerate_outcomes() {
        let table = OrderTable::from_records(vec![order("2024-01-05", 10.0, "a")]);
        let report = run(&table, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.monthly.len(), 1);
        assert!(report.monthly_correlation.is_none());
        assert_eq!(report.autocorrelation.len(), 3);
        assert!(report
            .autocorrelation
            .iter()
            .all(|o| matches!(o, AutocorrelationOutcome::TooShort { .. })));
        assert!(report.confidence_intervals.iter().all(|ci| ci.interval().is_some()));
        assert!(!report.summary_lines().is_empty());
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let table = OrderTable::from_records(vec![
            order("2024-01-05", 10.0, "a"),
            order("2024-02-05", 20.0, "b"),
            order("2024-03-05", 30.0, "b"),
        ]);
        let mut config = AnalysisConfig::default();
        config.normality.max_sample = 2;

        assert!(matches!(
            run(&table, &config),
            Err(Error::ConfigurationError(_))
        ));
    }
}
