//! Removal of mostly-missing columns

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Percentage of missing values for every column, in column order.
///
/// Returns `None` for each column of a table with zero rows, since the
/// fraction is undefined there.
pub fn missing_percentages(df: &DataFrame) -> Vec<(String, Option<f64>)> {
    let height = df.height();
    df.get_columns()
        .iter()
        .map(|col| {
            let pct = if height == 0 {
                None
            } else {
                Some(col.null_count() as f64 * 100.0 / height as f64)
            };
            (col.name().to_string(), pct)
        })
        .collect()
}

/// Columns whose missing percentage is strictly above `threshold`
pub fn columns_above_threshold(df: &DataFrame, threshold: f64) -> Vec<(String, f64)> {
    missing_percentages(df)
        .into_iter()
        .filter_map(|(name, pct)| pct.filter(|p| *p > threshold).map(|p| (name, p)))
        .collect()
}

/// Drops columns that are entirely missing or exceed a missing-value threshold
#[derive(Debug, Clone)]
pub struct ColumnPruner {
    threshold: f64,
    dropped: Vec<String>,
}

impl ColumnPruner {
    /// Create a pruner with a threshold expressed in percent
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            dropped: Vec::new(),
        }
    }

    /// Columns removed by the last call to [`ColumnPruner::transform`]
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Drop all-missing columns and those above the threshold
    pub fn transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.dropped = missing_percentages(df)
            .into_iter()
            .filter_map(|(name, pct)| match pct {
                Some(p) if p >= 100.0 || p > self.threshold => {
                    debug!(column = %name, missing_pct = p, "Dropping column");
                    Some(name)
                }
                _ => None,
            })
            .collect();

        let mut result = df.clone();
        for name in &self.dropped {
            result = result.drop(name)?;
        }
        Ok(result)
    }
}

impl Default for ColumnPruner {
    fn default() -> Self {
        Self::new(80.0)
    }
}
