//! Monthly aggregation of orders
//!
//! Buckets orders by the calendar month of `order_date` and sums revenue
//! (`product_price`) and freight per month. Derived views (z-scores,
//! period-over-period change, correlation) are computed from the summary on
//! demand.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, OrderTable};
use crate::error::{Error, Result};
use crate::groupby::OrderGroupBy;
use crate::stats::descriptive::{correlation_matrix, mean, sample_std, CorrelationMatrix};

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidValue(format!("invalid month: {}", month)));
        }
        Ok(YearMonth { year, month })
    }

    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        YearMonth {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::InvalidValue(format!("expected YYYY-MM, got '{}'", s)))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| Error::InvalidValue(format!("invalid year in '{}': {}", s, e)))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| Error::InvalidValue(format!("invalid month in '{}': {}", s, e)))?;
        YearMonth::new(year, month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Aggregates of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: YearMonth,
    /// Sum of product prices, nulls skipped
    pub revenue: f64,
    /// Sum of freight prices, nulls skipped
    pub freight: f64,
    /// Number of orders placed in the month
    pub orders: usize,
}

/// Monthly series that can be extracted from the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyField {
    Revenue,
    Orders,
    Freight,
}

impl MonthlyField {
    pub const ALL: [MonthlyField; 3] = [
        MonthlyField::Revenue,
        MonthlyField::Orders,
        MonthlyField::Freight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MonthlyField::Revenue => "revenue",
            MonthlyField::Orders => "orders",
            MonthlyField::Freight => "freight",
        }
    }

    fn value(&self, row: &MonthlySummary) -> f64 {
        match self {
            MonthlyField::Revenue => row.revenue,
            MonthlyField::Orders => row.orders as f64,
            MonthlyField::Freight => row.freight,
        }
    }
}

impl fmt::Display for MonthlyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chronologically ascending monthly summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummaryTable {
    rows: Vec<MonthlySummary>,
}

impl MonthlySummaryTable {
    pub fn rows(&self) -> &[MonthlySummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn months(&self) -> Vec<YearMonth> {
        self.rows.iter().map(|r| r.month).collect()
    }

    /// One monthly series, in month order
    pub fn series(&self, field: MonthlyField) -> Vec<f64> {
        self.rows.iter().map(|r| field.value(r)).collect()
    }

    /// Z-scores of a series using the sample standard deviation
    ///
    /// Every entry is `None` when fewer than two months exist or the series
    /// is constant.
    pub fn standardized(&self, field: MonthlyField) -> Vec<Option<f64>> {
        let values = self.series(field);
        match (mean(&values), sample_std(&values)) {
            (Some(m), Some(s)) if s > 0.0 => values.iter().map(|v| Some((v - m) / s)).collect(),
            _ => vec![None; values.len()],
        }
    }

    /// Percent change from the previous month (`25.0` means +25%)
    ///
    /// The first month has no predecessor; a zero predecessor also yields
    /// `None`.
    pub fn pct_change(&self, field: MonthlyField) -> Vec<Option<f64>> {
        let values = self.series(field);
        let mut out = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            if i == 0 || values[i - 1] == 0.0 {
                out.push(None);
            } else {
                out.push(Some(100.0 * (values[i] / values[i - 1] - 1.0)));
            }
        }
        out
    }

    /// Pearson correlations among revenue, orders and freight
    pub fn correlation_matrix(&self) -> Result<CorrelationMatrix> {
        let labels = MonthlyField::ALL.iter().map(|f| f.label().to_string()).collect();
        let columns: Vec<Vec<f64>> = MonthlyField::ALL.iter().map(|&f| self.series(f)).collect();
        correlation_matrix(labels, &columns)
    }
}

/// Aggregate orders into one row per calendar month
///
/// Orders without an `order_date` are not counted in any month.
pub fn monthly_summary(table: &OrderTable) -> MonthlySummaryTable {
    if !table.has_column(Column::OrderDate) {
        log::warn!("Monthly summary skipped: column '{}' not found", Column::OrderDate);
        return MonthlySummaryTable::default();
    }
    let grouped = OrderGroupBy::new(table, |r| {
        r.order_date.as_ref().map(YearMonth::from_datetime)
    });
    if grouped.dropped() > 0 {
        log::debug!(
            "Monthly summary: {} orders without order_date excluded",
            grouped.dropped()
        );
    }

    let monthly_sums = |column: Column| {
        grouped.sum(column).unwrap_or_else(|e| {
            log::warn!("Monthly summary: {}, summing to 0", e);
            BTreeMap::new()
        })
    };
    let revenue = monthly_sums(Column::ProductPrice);
    let freight = monthly_sums(Column::FreightPrice);

    let rows = grouped
        .size()
        .into_iter()
        .map(|(month, orders)| MonthlySummary {
            month,
            revenue: revenue.get(&month).copied().unwrap_or(0.0),
            freight: freight.get(&month).copied().unwrap_or(0.0),
            orders,
        })
        .collect();

    MonthlySummaryTable { rows }
}
