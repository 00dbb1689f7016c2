//! Pairwise correlation of the financial and delivery features

use crate::dataset::{Column, OrderTable};
use crate::error::Result;
use crate::stats::descriptive::{correlation_matrix, CorrelationMatrix};

/// Features entering the correlation matrix, in display order
pub const FEATURE_CORRELATION_COLUMNS: [Column; 11] = [
    Column::Subtotal,
    Column::Discount,
    Column::Total,
    Column::DiscountAbs,
    Column::FreightPrice,
    Column::DeliveryLeadTime,
    Column::DeliveryDelayDays,
    Column::IsLate,
    Column::IsConfirmed,
    Column::FreightShare,
    Column::ProductPrice,
];

/// Pearson correlation matrix over the features present in `table`
///
/// Rows with a missing value in any of the used features are dropped before
/// computing. Returns `None` when fewer than two features are available.
pub fn feature_correlation(table: &OrderTable) -> Result<Option<CorrelationMatrix>> {
    let mut used = Vec::new();
    for column in FEATURE_CORRELATION_COLUMNS {
        if table.has_column(column) {
            used.push(column);
        } else {
            log::warn!("Correlation matrix: column '{}' not found, skipped", column);
        }
    }

    if used.len() < 2 {
        log::warn!("Correlation matrix skipped: fewer than two features available");
        return Ok(None);
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); used.len()];
    for record in table.records() {
        let row: Option<Vec<f64>> = used.iter().map(|&c| record.numeric(c)).collect();
        if let Some(row) = row {
            for (target, value) in columns.iter_mut().zip(row) {
                target.push(value);
            }
        }
    }

    log::debug!(
        "Correlation matrix: {} of {} rows complete",
        columns[0].len(),
        table.len()
    );

    let labels = used.iter().map(|c| c.as_str().to_string()).collect();
    correlation_matrix(labels, &columns).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::OrderRecord;

    fn record(subtotal: Option<f64>, total: Option<f64>) -> OrderRecord {
        OrderRecord {
            subtotal,
            total,
            ..Default::default()
        }
    }

    #[test]
    fn test_listwise_deletion() {
        let table = OrderTable::new(
            [Column::Subtotal, Column::Total],
            vec![
                record(Some(1.0), Some(2.0)),
                record(Some(2.0), None),
                record(Some(3.0), Some(6.0)),
                record(Some(4.0), Some(8.0)),
            ],
        );

        let matrix = feature_correlation(&table).unwrap().unwrap();
        assert_eq!(matrix.labels, vec!["subtotal", "total"]);
        assert_eq!(matrix.n_observations, 3);
        assert!((matrix.get("subtotal", "total").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_features() {
        let table = OrderTable::new([Column::Subtotal], vec![record(Some(1.0), None)]);
        assert!(feature_correlation(&table).unwrap().is_none());
    }
}
