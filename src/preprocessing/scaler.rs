//! Feature scaling implementations

use super::is_numeric_dtype;
use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    #[default]
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// mean or min
    pub center: f64,
    /// std or range
    pub scale: f64,
}

/// Feature scaler fitted and applied on the same table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    exclude: HashSet<String>,
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            exclude: HashSet::new(),
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Builder method to leave some numeric columns unscaled
    pub fn with_excluded(mut self, columns: &[&str]) -> Self {
        self.exclude = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Fit the scaler to every numeric column of the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.params.clear();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) || self.exclude.contains(col.name().as_str()) {
                continue;
            }
            let series = col.as_materialized_series().cast(&DataType::Float64)?;
            let params = self.compute_params(&series)?;
            self.params.push((col.name().to_string(), params));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    /// Fitted columns come back as `Float64`; nulls stay null.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CleanError::NotFitted("Scaler"));
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            if let Ok(column) = df.column(col_name) {
                let series = column.as_materialized_series().cast(&DataType::Float64)?;
                result.with_column(Self::scale_series(&series, params)?)?;
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Fitted parameters per column
    pub fn params(&self) -> &[(String, ScalerParams)] {
        &self.params
    }

    fn compute_params(&self, series: &Series) -> Result<ScalerParams> {
        let ca = series.f64()?;

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                // Population standard deviation
                let std = ca.std(0).unwrap_or(0.0);
                Ok(ScalerParams {
                    center: mean,
                    scale: nonzero_scale(std, mean.abs()),
                })
            }
            ScalerType::MinMax => {
                let min = ca.min().unwrap_or(0.0);
                let max = ca.max().unwrap_or(1.0);
                let range = max - min;
                Ok(ScalerParams {
                    center: min,
                    scale: nonzero_scale(range, min.abs().max(max.abs())),
                })
            }
            ScalerType::None => Ok(ScalerParams {
                center: 0.0,
                scale: 1.0,
            }),
        }
    }

    fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series.f64()?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.center) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

/// Spread to divide by, or 1 when the spread is rounding noise.
///
/// A spread within a few ulps of `magnitude` counts as zero, so a column of
/// values equal up to floating-point error scales to zeros.
fn nonzero_scale(spread: f64, magnitude: f64) -> f64 {
    if !spread.is_finite() || spread <= 10.0 * f64::EPSILON * magnitude.max(1.0) {
        1.0
    } else {
        spread
    }
}
