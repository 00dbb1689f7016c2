//! First look at a loaded dataset: size, gaps and numeric summaries

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, OrderTable};
use crate::error::Result;
use crate::stats::descriptive::drop_missing;
use crate::stats::{describe, DescriptiveStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInspection {
    pub column: Column,
    pub missing: usize,
    /// Present for numeric columns with at least one value
    pub stats: Option<DescriptiveStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInspection {
    pub rows: usize,
    pub columns: Vec<ColumnInspection>,
}

impl DatasetInspection {
    pub fn column(&self, column: Column) -> Option<&ColumnInspection> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

/// Row count, missing values per column and `describe` of numeric columns
pub fn inspect(table: &OrderTable) -> Result<DatasetInspection> {
    let mut columns = Vec::with_capacity(table.columns().len());

    for &column in table.columns() {
        let missing = table.missing_count(column).unwrap_or(0);
        let stats = match table.numeric_column(column).filter(|_| column.is_numeric()) {
            Some(values) => {
                let data = drop_missing(&values);
                if data.is_empty() {
                    None
                } else {
                    Some(describe(&data)?)
                }
            }
            None => None,
        };

        columns.push(ColumnInspection {
            column,
            missing,
            stats,
        });
    }

    Ok(DatasetInspection {
        rows: table.len(),
        columns,
    })
}
