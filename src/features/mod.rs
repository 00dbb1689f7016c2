//! Feature derivation for order records
//!
//! Derives the delivery and financial features every downstream analysis
//! relies on:
//!
//! - `delivery_delay_days`: delivery date minus delivery forecast, in days
//! - `delivery_lead_time`: delivery date minus order date, in days
//! - `is_late`: 1 when the delay is positive, otherwise 0
//! - `is_confirmed`: confirmation flag coerced to 0/1
//! - `freight_share`: freight price over order total
//! - `discount_abs`: subtotal minus total
//!
//! Derivation never mutates its input. A derived column the source already
//! carried is copied through untouched, except `is_confirmed`, which is
//! re-coerced on every pass. Deriving twice therefore equals deriving once.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::dataset::{Column, ColumnSet, OrderRecord, OrderTable};

const SECONDS_PER_DAY: i64 = 86_400;

/// Columns produced by [`derive_features`], besides `is_confirmed`
pub const DERIVED_COLUMNS: [Column; 5] = [
    Column::DeliveryDelayDays,
    Column::DeliveryLeadTime,
    Column::IsLate,
    Column::FreightShare,
    Column::DiscountAbs,
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date-like cell into a timestamp
///
/// Returns `None` for empty or unparseable input instead of failing, so a
/// single malformed cell only nulls that cell.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a numeric-like cell
///
/// Booleans map to 1/0. Empty, unparseable and non-finite input is `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if value.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if value.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }

    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a confirmation flag to 0/1
///
/// Missing or NaN input counts as unconfirmed. Other values are truncated
/// toward zero and any non-zero result is a confirmation.
pub fn coerce_confirmed(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() && v.trunc() != 0.0 => 1,
        _ => 0,
    }
}

/// Whole days between two timestamps, floored like a timedelta's `days`
pub fn day_difference(later: Option<NaiveDateTime>, earlier: Option<NaiveDateTime>) -> Option<i64> {
    let (later, earlier) = (later?, earlier?);
    let seconds = (later - earlier).num_seconds();
    Some(seconds.div_euclid(SECONDS_PER_DAY))
}

/// Ratio that treats a zero or missing denominator as a missing value
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d).filter(|v| v.is_finite())
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?).filter(|v| v.is_finite())
}

/// Lateness flag for a delay; a missing delay is not late
pub fn late_flag(delay_days: Option<i64>) -> i64 {
    match delay_days {
        Some(d) if d > 0 => 1,
        _ => 0,
    }
}

/// Derive the features of a single record
///
/// `present` lists the columns the source provided; derived columns found
/// there are kept as they are.
pub fn derive_record(record: &OrderRecord, present: &ColumnSet) -> OrderRecord {
    let mut out = record.clone();

    if !present.contains(&Column::DeliveryDelayDays) {
        out.delivery_delay_days = day_difference(record.delivery_date, record.delivery_forecast);
    }

    if !present.contains(&Column::DeliveryLeadTime) {
        out.delivery_lead_time = day_difference(record.delivery_date, record.order_date);
    }

    if !present.contains(&Column::IsLate) {
        out.is_late = Some(late_flag(out.delivery_delay_days));
    }

    if present.contains(&Column::IsConfirmed) {
        out.is_confirmed = Some(coerce_confirmed(record.is_confirmed) as f64);
    }

    if !present.contains(&Column::FreightShare) {
        out.freight_share = safe_ratio(record.freight_price, record.total);
    }

    if !present.contains(&Column::DiscountAbs) {
        out.discount_abs = difference(record.subtotal, record.total);
    }

    out
}

/// Derive features for a whole table, returning a new augmented table
pub fn derive_features(table: &OrderTable) -> OrderTable {
    let present = table.columns();

    let missing: Vec<&str> = Column::REQUIRED_FOR_FEATURES
        .iter()
        .filter(|c| !present.contains(c))
        .map(|c| c.as_str())
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "Deriving features without columns [{}]; dependent features will be missing",
            missing.join(", ")
        );
    }

    let records: Vec<OrderRecord> = table
        .records()
        .iter()
        .map(|r| derive_record(r, present))
        .collect();

    let mut columns = present.clone();
    columns.extend(DERIVED_COLUMNS);

    log::debug!(
        "Derived features for {} records ({} columns)",
        records.len(),
        columns.len()
    );

    OrderTable::new(columns, records)
}
