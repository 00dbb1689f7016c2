use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::dataset::{Column, OrderRecord, OrderTable};
use crate::error::{Error, Result};

/// Records of an order table grouped by a derived key
///
/// Groups are kept in key order. Records whose key is `None` belong to no
/// group.
#[derive(Debug)]
pub struct OrderGroupBy<'a, K>
where
    K: Debug + Ord + Clone,
{
    /// Grouped row indices
    groups: BTreeMap<K, Vec<usize>>,

    /// Original table
    source: &'a OrderTable,

    /// Rows that fell into no group
    dropped: usize,
}

impl<'a, K> OrderGroupBy<'a, K>
where
    K: Debug + Ord + Clone,
{
    /// Group the rows of `source` by the key returned from `key_fn`
    pub fn new<F>(source: &'a OrderTable, key_fn: F) -> Self
    where
        F: Fn(&OrderRecord) -> Option<K>,
    {
        let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
        let mut dropped = 0;

        for (i, record) in source.records().iter().enumerate() {
            match key_fn(record) {
                Some(key) => groups.entry(key).or_default().push(i),
                None => dropped += 1,
            }
        }

        OrderGroupBy {
            groups,
            source,
            dropped,
        }
    }

    /// Get the number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of rows excluded because their key was null
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Return the size of each group
    pub fn size(&self) -> BTreeMap<K, usize> {
        self.groups
            .iter()
            .map(|(k, indices)| (k.clone(), indices.len()))
            .collect()
    }

    /// Sum of a numeric column per group, nulls skipped
    ///
    /// A group whose values are all null sums to 0.
    pub fn sum(&self, column: Column) -> Result<BTreeMap<K, f64>> {
        self.check_numeric(column)?;
        Ok(self.aggregate(|records| {
            records.iter().filter_map(|r| r.numeric(column)).sum::<f64>()
        }))
    }

    /// Mean of a numeric column per group, `None` when a group has no values
    pub fn mean(&self, column: Column) -> Result<BTreeMap<K, Option<f64>>> {
        self.check_numeric(column)?;
        Ok(self.aggregate(|records| {
            let values: Vec<f64> = records.iter().filter_map(|r| r.numeric(column)).collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }))
    }

    /// Apply an arbitrary aggregation to the records of every group
    pub fn aggregate<R, F>(&self, func: F) -> BTreeMap<K, R>
    where
        F: Fn(&[&OrderRecord]) -> R,
    {
        let records = self.source.records();
        self.groups
            .iter()
            .map(|(key, indices)| {
                let group: Vec<&OrderRecord> = indices.iter().map(|&i| &records[i]).collect();
                (key.clone(), func(&group))
            })
            .collect()
    }

    fn check_numeric(&self, column: Column) -> Result<()> {
        if !column.is_numeric() {
            return Err(Error::InvalidInput(format!(
                "Column '{}' is not numeric",
                column
            )));
        }
        self.source.require(&[column])
    }
}
