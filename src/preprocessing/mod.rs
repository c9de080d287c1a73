//! Data preprocessing module
//!
//! Stages of the client feature pipeline, applied strictly in order:
//! - Column pruning of mostly-missing columns
//! - Categorical encoding (ordinal lookup and one-hot expansion)
//! - Type coercion (booleans to 0/1, date-like text to datetimes)
//! - Mean imputation of numeric columns
//! - Per-client aggregation
//! - Feature scaling

mod aggregator;
mod coercion;
mod config;
mod encoder;
mod imputer;
mod pipeline;
mod pruning;
mod scaler;

pub use aggregator::{Accumulator, AggregationMode, ClientAggregator, ClientRow, ClientRows};
pub use coercion::{BooleanNormalizer, DatetimeCoercer};
pub use config::{PipelineConfig, SchemaConfig, DEFAULT_ORDINAL_LEVELS};
pub use encoder::{CategoricalEncoder, NominalEncoder, OrdinalEncoder};
pub use imputer::NumericImputer;
pub use pipeline::{CleaningOutput, CleaningPipeline, CleaningReport, Stage, StageReport};
pub use pruning::{columns_above_threshold, missing_percentages, ColumnPruner};
pub use scaler::{Scaler, ScalerParams, ScalerType};

use crate::error::{CleanError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

/// Returns true for every integer and floating point dtype
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Most frequent non-missing value.
///
/// Ties are broken by first appearance, so the result never depends on hash
/// ordering. Returns `None` when every value is missing.
pub fn first_mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<T>>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = Vec::new();

    for value in values.into_iter().flatten() {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for value in order {
        let count = counts[&value];
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Fetch a column as a materialized series or fail with a schema error
pub(crate) fn required_series<'a>(df: &'a DataFrame, name: &str, stage: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| CleanError::missing_column(name, stage))
}
