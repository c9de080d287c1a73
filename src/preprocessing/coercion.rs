//! Type coercion: booleans to 0/1 integers and date-like text to datetimes

use super::{first_mode, required_series, SchemaConfig};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

const DATETIME_STAGE: &str = "datetime coercion";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse the textual spellings of a boolean
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Fills missing booleans with the column mode and coerces them to 0/1
#[derive(Debug, Clone, Default)]
pub struct BooleanNormalizer {
    text_columns: HashSet<String>,
    fill_values: Vec<(String, bool)>,
}

impl BooleanNormalizer {
    /// Normalizer for boolean-typed columns only
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to also normalize text columns holding booleans
    pub fn with_text_columns(mut self, columns: &[String]) -> Self {
        self.text_columns = columns.iter().cloned().collect();
        self
    }

    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self::new().with_text_columns(&schema.boolean_columns)
    }

    /// Fill value used for each normalized column by the last transform
    pub fn fill_values(&self) -> &[(String, bool)] {
        &self.fill_values
    }

    /// Replace every boolean column with an `Int64` column of 0 and 1.
    ///
    /// Columns with no observed value are filled with 0.
    pub fn transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fill_values.clear();
        let mut result = df.clone();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let values: Vec<Option<bool>> = match series.dtype() {
                DataType::Boolean => series.bool()?.into_iter().collect(),
                DataType::String if self.text_columns.contains(series.name().as_str()) => series
                    .str()?
                    .into_iter()
                    .map(|v| v.and_then(parse_bool))
                    .collect(),
                _ if self.text_columns.contains(series.name().as_str()) => {
                    series.cast(&DataType::Boolean)?.bool()?.into_iter().collect()
                }
                _ => continue,
            };

            let fill = first_mode(values.iter().copied()).unwrap_or(false);
            debug!(column = %series.name(), fill, "Normalizing boolean column");

            let ints: Int64Chunked = values
                .into_iter()
                .map(|v| Some(i64::from(v.unwrap_or(fill))))
                .collect();
            result.with_column(ints.with_name(series.name().clone()).into_series())?;
            self.fill_values.push((series.name().to_string(), fill));
        }

        Ok(result)
    }
}

/// Parse a date-like string into milliseconds since the Unix epoch
pub(crate) fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Parses configured date-like columns into millisecond datetimes
#[derive(Debug, Clone, Default)]
pub struct DatetimeCoercer {
    columns: Vec<String>,
}

impl DatetimeCoercer {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self {
            columns: schema.datetime_columns.clone(),
        }
    }

    /// Convert each configured column; unparseable values become null
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        let target = DataType::Datetime(TimeUnit::Milliseconds, None);

        for col_name in &self.columns {
            let series = required_series(df, col_name, DATETIME_STAGE)?;
            let converted = match series.dtype() {
                DataType::Datetime(_, _) | DataType::Date => series.cast(&target)?,
                _ => {
                    let text = series.cast(&DataType::String)?;
                    let ca = text.str()?;
                    let millis: Int64Chunked = ca
                        .into_iter()
                        .map(|v| v.and_then(parse_timestamp_millis))
                        .collect();

                    let unparsed = millis.null_count() - ca.null_count();
                    if unparsed > 0 {
                        debug!(column = %col_name, unparsed, "Unparseable dates set to null");
                    }
                    millis
                        .with_name(series.name().clone())
                        .into_datetime(TimeUnit::Milliseconds, None)
                        .into_series()
                }
            };
            result.with_column(converted)?;
        }

        Ok(result)
    }
}
