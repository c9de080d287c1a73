//! Mean imputation of numeric columns

use super::is_numeric_dtype;
use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Fills missing numeric values with the column mean
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumericImputer {
    exclude: HashSet<String>,
    // column name -> fill value, in column order
    fill_values: Vec<(String, f64)>,
    is_fitted: bool,
}

impl NumericImputer {
    /// Create a new imputer
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to leave some numeric columns untouched (e.g. the client ID)
    pub fn with_excluded(mut self, columns: &[&str]) -> Self {
        self.exclude = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Compute the mean of every numeric column.
    ///
    /// A column with no observed value gets a fill value of 0.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.fill_values.clear();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) || self.exclude.contains(col.name().as_str()) {
                continue;
            }
            let series = col.as_materialized_series().cast(&DataType::Float64)?;
            let mean = series.f64()?.mean().unwrap_or(0.0);
            debug!(column = %col.name(), mean, nulls = col.null_count(), "Fitted numeric imputer");
            self.fill_values.push((col.name().to_string(), mean));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Cast fitted columns to `Float64` and fill their missing values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CleanError::NotFitted("NumericImputer"));
        }

        let mut result = df.clone();

        for (col_name, fill) in &self.fill_values {
            if let Ok(col) = df.column(col_name) {
                let series = col.as_materialized_series().cast(&DataType::Float64)?;
                let filled: Float64Chunked = series
                    .f64()?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*fill)))
                    .collect();
                result.with_column(filled.with_name(series.name().clone()).into_series())?;
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Fill value of each imputed column
    pub fn fill_values(&self) -> &[(String, f64)] {
        &self.fill_values
    }
}
