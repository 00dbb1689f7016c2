//! Business KPIs per categorical dimension

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, OrderRecord, OrderTable};
use crate::error::{Error, Result};
use crate::groupby::OrderGroupBy;

/// Categorical column a KPI table is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    Category,
    Subcategory,
    DeliveryService,
}

impl GroupDimension {
    pub const ALL: [GroupDimension; 3] = [
        GroupDimension::Category,
        GroupDimension::Subcategory,
        GroupDimension::DeliveryService,
    ];

    pub fn column(&self) -> Column {
        match self {
            GroupDimension::Category => Column::Category,
            GroupDimension::Subcategory => Column::Subcategory,
            GroupDimension::DeliveryService => Column::DeliveryService,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.column().as_str()
    }
}

impl fmt::Display for GroupDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupDimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let column: Column = s.parse()?;
        GroupDimension::ALL
            .into_iter()
            .find(|d| d.column() == column)
            .ok_or_else(|| Error::InvalidValue(format!("'{}' is not a grouping dimension", s)))
    }
}

/// KPIs of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    /// Value of the grouping column
    pub key: String,
    /// Number of orders in the group
    pub orders: usize,
    pub total_revenue: f64,
    pub avg_ticket: Option<f64>,
    pub avg_lead_time: Option<f64>,
    pub total_discount: f64,
    pub avg_freight_share: Option<f64>,
    /// Percentage of non-missing `is_confirmed` flags equal to 0
    pub pct_canceled: Option<f64>,
    /// Percentage of non-missing `is_late` flags equal to 1
    pub pct_late: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KpiOutcome {
    Table {
        dimension: GroupDimension,
        rows: Vec<KpiRow>,
    },
    MissingColumn {
        dimension: GroupDimension,
    },
}

impl KpiOutcome {
    pub fn dimension(&self) -> GroupDimension {
        match self {
            KpiOutcome::Table { dimension, .. } | KpiOutcome::MissingColumn { dimension } => {
                *dimension
            }
        }
    }

    pub fn rows(&self) -> Option<&[KpiRow]> {
        match self {
            KpiOutcome::Table { rows, .. } => Some(rows),
            KpiOutcome::MissingColumn { .. } => None,
        }
    }
}

/// Share (0-100) of non-missing flag values equal to `target`
fn pct_equal(records: &[&OrderRecord], column: Column, target: f64) -> Option<f64> {
    let flags: Vec<f64> = records.iter().filter_map(|r| r.numeric(column)).collect();
    if flags.is_empty() {
        return None;
    }
    let hits = flags.iter().filter(|&&v| v == target).count();
    Some(100.0 * hits as f64 / flags.len() as f64)
}

/// Per-group sums; empty when the column is absent from the table
fn group_sums(grouped: &OrderGroupBy<'_, String>, column: Column) -> BTreeMap<String, f64> {
    grouped.sum(column).unwrap_or_else(|e| {
        log::debug!("KPI sum of '{}' skipped: {}", column, e);
        BTreeMap::new()
    })
}

/// Per-group means; empty when the column is absent from the table
fn group_means(
    grouped: &OrderGroupBy<'_, String>,
    column: Column,
) -> BTreeMap<String, Option<f64>> {
    grouped.mean(column).unwrap_or_else(|e| {
        log::debug!("KPI mean of '{}' skipped: {}", column, e);
        BTreeMap::new()
    })
}

/// KPI table for one dimension
///
/// Orders with a null group value are left out. Rows are sorted by total
/// revenue, highest first, ties broken by group key.
pub fn compute_kpis(table: &OrderTable, dimension: GroupDimension) -> KpiOutcome {
    let column = dimension.column();
    if !table.has_column(column) {
        log::warn!("KPIs skipped: column '{}' not found", column);
        return KpiOutcome::MissingColumn { dimension };
    }

    let grouped = OrderGroupBy::new(table, |r| r.text(column).map(str::to_string));

    let revenue = group_sums(&grouped, Column::ProductPrice);
    let ticket = group_means(&grouped, Column::ProductPrice);
    let lead_time = group_means(&grouped, Column::DeliveryLeadTime);
    let discount = group_sums(&grouped, Column::DiscountAbs);
    let freight_share = group_means(&grouped, Column::FreightShare);
    let canceled = grouped.aggregate(|g| pct_equal(g, Column::IsConfirmed, 0.0));
    let late = grouped.aggregate(|g| pct_equal(g, Column::IsLate, 1.0));

    let mut rows: Vec<KpiRow> = grouped
        .size()
        .into_iter()
        .map(|(key, orders)| KpiRow {
            total_revenue: revenue.get(&key).copied().unwrap_or(0.0),
            avg_ticket: ticket.get(&key).copied().flatten(),
            avg_lead_time: lead_time.get(&key).copied().flatten(),
            total_discount: discount.get(&key).copied().unwrap_or(0.0),
            avg_freight_share: freight_share.get(&key).copied().flatten(),
            pct_canceled: canceled.get(&key).copied().flatten(),
            pct_late: late.get(&key).copied().flatten(),
            key,
            orders,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });

    log::debug!(
        "KPIs by {}: {} groups, {} orders without a value",
        dimension,
        grouped.group_count(),
        grouped.dropped()
    );

    KpiOutcome::Table { dimension, rows }
}

/// KPI tables for every requested dimension, in the order given
pub fn compute_all_kpis(table: &OrderTable, dimensions: &[GroupDimension]) -> Vec<KpiOutcome> {
    dimensions.iter().map(|&d| compute_kpis(table, d)).collect()
}
