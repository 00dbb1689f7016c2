//! Order dataset model
//!
//! An [`OrderTable`] is a batch of [`OrderRecord`]s together with the set of
//! columns the source actually provided. Column presence is tracked at the
//! table level: a record field whose column is absent is meaningless, and the
//! analysis components report such columns as missing instead of treating
//! every value as null.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Columns understood by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    OrderId,
    OrderDate,
    DeliveryForecast,
    DeliveryDate,
    Subtotal,
    Discount,
    Total,
    FreightPrice,
    ProductPrice,
    IsConfirmed,
    Category,
    Subcategory,
    DeliveryService,
    DeliveryDelayDays,
    DeliveryLeadTime,
    IsLate,
    FreightShare,
    DiscountAbs,
}

impl Column {
    /// Every known column, in canonical output order
    pub const ALL: [Column; 18] = [
        Column::OrderId,
        Column::OrderDate,
        Column::DeliveryForecast,
        Column::DeliveryDate,
        Column::Subtotal,
        Column::Discount,
        Column::Total,
        Column::FreightPrice,
        Column::ProductPrice,
        Column::IsConfirmed,
        Column::Category,
        Column::Subcategory,
        Column::DeliveryService,
        Column::DeliveryDelayDays,
        Column::DeliveryLeadTime,
        Column::IsLate,
        Column::FreightShare,
        Column::DiscountAbs,
    ];

    /// Columns a raw orders extract is expected to carry
    pub const BASE: [Column; 13] = [
        Column::OrderId,
        Column::OrderDate,
        Column::DeliveryForecast,
        Column::DeliveryDate,
        Column::Subtotal,
        Column::Discount,
        Column::Total,
        Column::FreightPrice,
        Column::ProductPrice,
        Column::IsConfirmed,
        Column::Category,
        Column::Subcategory,
        Column::DeliveryService,
    ];

    /// Columns needed to derive features at all
    pub const REQUIRED_FOR_FEATURES: [Column; 8] = [
        Column::OrderDate,
        Column::DeliveryForecast,
        Column::DeliveryDate,
        Column::Subtotal,
        Column::Discount,
        Column::Total,
        Column::FreightPrice,
        Column::ProductPrice,
    ];

    /// Numeric columns, the ones `describe` and correlation work on
    pub const NUMERIC: [Column; 11] = [
        Column::Subtotal,
        Column::Discount,
        Column::Total,
        Column::FreightPrice,
        Column::ProductPrice,
        Column::IsConfirmed,
        Column::DeliveryDelayDays,
        Column::DeliveryLeadTime,
        Column::IsLate,
        Column::FreightShare,
        Column::DiscountAbs,
    ];

    /// Name of the column in the source dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::OrderId => "order_id",
            Column::OrderDate => "order_date",
            Column::DeliveryForecast => "delivery_forecast",
            Column::DeliveryDate => "delivery_date",
            Column::Subtotal => "subtotal",
            Column::Discount => "discount",
            Column::Total => "total",
            Column::FreightPrice => "freight_price",
            Column::ProductPrice => "product_price",
            Column::IsConfirmed => "is_confirmed",
            Column::Category => "category",
            Column::Subcategory => "subcategory",
            Column::DeliveryService => "delivery_service",
            Column::DeliveryDelayDays => "delivery_delay_days",
            Column::DeliveryLeadTime => "delivery_lead_time",
            Column::IsLate => "is_late",
            Column::FreightShare => "freight_share",
            Column::DiscountAbs => "discount_abs",
        }
    }

    pub fn is_numeric(&self) -> bool {
        Self::NUMERIC.contains(self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }
}

/// Set of columns present in a table
pub type ColumnSet = BTreeSet<Column>;

/// One order row
///
/// Input fields are nullable. The derived fields stay `None` until the
/// feature deriver fills them (or the source already carried them).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDateTime>,
    pub delivery_forecast: Option<NaiveDateTime>,
    pub delivery_date: Option<NaiveDateTime>,
    pub subtotal: Option<f64>,
    pub discount: Option<f64>,
    pub total: Option<f64>,
    pub freight_price: Option<f64>,
    pub product_price: Option<f64>,
    /// Numeric-like confirmation flag; coerced to 0/1 on derivation
    pub is_confirmed: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub delivery_service: Option<String>,

    pub delivery_delay_days: Option<i64>,
    pub delivery_lead_time: Option<i64>,
    pub is_late: Option<i64>,
    pub freight_share: Option<f64>,
    pub discount_abs: Option<f64>,
}

impl OrderRecord {
    /// Numeric view of a column, `None` for missing values and text/date columns
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Subtotal => self.subtotal,
            Column::Discount => self.discount,
            Column::Total => self.total,
            Column::FreightPrice => self.freight_price,
            Column::ProductPrice => self.product_price,
            Column::IsConfirmed => self.is_confirmed,
            Column::DeliveryDelayDays => self.delivery_delay_days.map(|d| d as f64),
            Column::DeliveryLeadTime => self.delivery_lead_time.map(|d| d as f64),
            Column::IsLate => self.is_late.map(|v| v as f64),
            Column::FreightShare => self.freight_share,
            Column::DiscountAbs => self.discount_abs,
            _ => None,
        }
        .filter(|v| !v.is_nan())
    }

    /// Text view of a categorical column
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::OrderId => self.order_id.as_deref(),
            Column::Category => self.category.as_deref(),
            Column::Subcategory => self.subcategory.as_deref(),
            Column::DeliveryService => self.delivery_service.as_deref(),
            _ => None,
        }
    }

    /// Whether the record holds a value for the column
    pub fn is_present(&self, column: Column) -> bool {
        match column {
            Column::OrderDate => self.order_date.is_some(),
            Column::DeliveryForecast => self.delivery_forecast.is_some(),
            Column::DeliveryDate => self.delivery_date.is_some(),
            Column::OrderId | Column::Category | Column::Subcategory | Column::DeliveryService => {
                self.text(column).is_some()
            }
            _ => self.numeric(column).is_some(),
        }
    }
}

/// A batch of orders plus the columns its source provided
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTable {
    columns: ColumnSet,
    records: Vec<OrderRecord>,
}

impl OrderTable {
    /// Create a table from explicit column presence
    pub fn new<I>(columns: I, records: Vec<OrderRecord>) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        OrderTable {
            columns: columns.into_iter().collect(),
            records,
        }
    }

    /// Create a table that carries every base column and no derived ones
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        Self::new(Column::BASE, records)
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Check that every listed column is present
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(Error::ColumnNotFound(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Numeric values of a column, `None` when the column is absent
    pub fn numeric_column(&self, column: Column) -> Option<Vec<Option<f64>>> {
        if !self.has_column(column) {
            return None;
        }
        Some(self.records.iter().map(|r| r.numeric(column)).collect())
    }

    /// Number of missing values of a column, `None` when the column is absent
    pub fn missing_count(&self, column: Column) -> Option<usize> {
        if !self.has_column(column) {
            return None;
        }
        Some(self.records.iter().filter(|r| !r.is_present(column)).count())
    }
}
