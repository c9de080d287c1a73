//! Categorical encoding: ordinal lookup and one-hot expansion

use super::{first_mode, required_series, SchemaConfig};
use crate::error::{CleanError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const ORDINAL_STAGE: &str = "ordinal encoding";
const NOMINAL_STAGE: &str = "one-hot encoding";

/// Cast any series to text so encoders can read it.
///
/// All-missing columns often come out of the loader with a non-string
/// dtype; casting keeps them readable as text.
fn as_text(series: &Series) -> Result<Series> {
    Ok(series.cast(&DataType::String)?)
}

/// Maps ordered text labels to integers through a fixed lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    // column name -> (label -> integer), in column order
    mappings: Vec<(String, HashMap<String, i64>)>,
}

impl OrdinalEncoder {
    /// Encoder applying the same labels to every column
    pub fn new(columns: &[&str], levels: &[&str]) -> Self {
        let lookup: HashMap<String, i64> = levels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.to_string(), i as i64))
            .collect();
        Self {
            mappings: columns
                .iter()
                .map(|c| (c.to_string(), lookup.clone()))
                .collect(),
        }
    }

    /// Encoder for the ordinal columns of a schema
    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self {
            mappings: schema
                .ordinal_columns
                .iter()
                .map(|c| (c.clone(), schema.ordinal_map(c)))
                .collect(),
        }
    }

    /// Columns this encoder rewrites
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|(c, _)| c.as_str())
    }

    /// Replace each configured column by its integer codes.
    ///
    /// Labels missing from the lookup, and existing nulls, become null.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (col_name, mapping) in &self.mappings {
            let series = required_series(df, col_name, ORDINAL_STAGE)?;
            let text = as_text(series)?;
            let ca = text.str()?;

            let codes: Int64Chunked = ca
                .into_iter()
                .map(|v| v.and_then(|s| mapping.get(s).copied()))
                .collect();

            let unmapped = codes.null_count() - ca.null_count();
            if unmapped > 0 {
                debug!(column = %col_name, unmapped, "Labels outside the ordinal lookup set to null");
            }

            result.with_column(codes.with_name(series.name().clone()).into_series())?;
        }

        Ok(result)
    }
}

/// Fitted state for one nominal column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NominalColumn {
    name: String,
    fill_value: Option<String>,
    categories: Vec<String>,
}

/// Fills nominal columns with their mode, then expands them into indicators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominalEncoder {
    columns: Vec<String>,
    separator: String,
    fitted: Vec<NominalColumn>,
    is_fitted: bool,
}

impl NominalEncoder {
    /// Create a new encoder for the given columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            separator: "_".to_string(),
            fitted: Vec::new(),
            is_fitted: false,
        }
    }

    /// Encoder for the nominal columns of a schema
    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self {
            columns: schema.nominal_columns.clone(),
            separator: schema.one_hot_separator.clone(),
            fitted: Vec::new(),
            is_fitted: false,
        }
    }

    /// Builder method to set the separator used in indicator names
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Learn the fill value and the category list of each column
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.fitted.clear();

        for col_name in &self.columns {
            let series = required_series(df, col_name, NOMINAL_STAGE)?;
            let text = as_text(series)?;
            let ca = text.str()?;

            let fill_value = first_mode(ca.into_iter()).map(|s| s.to_string());

            let mut seen = HashSet::new();
            let mut categories = Vec::new();
            for value in ca.into_iter().flatten() {
                if seen.insert(value) {
                    categories.push(value.to_string());
                }
            }

            debug!(
                column = %col_name,
                fill = ?fill_value,
                categories = categories.len(),
                "Fitted nominal column"
            );
            self.fitted.push(NominalColumn {
                name: col_name.clone(),
                fill_value,
                categories,
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each nominal column by boolean indicator columns appended at the end
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(CleanError::NotFitted("NominalEncoder"));
        }

        let mut result = df.clone();

        for column in &self.fitted {
            let series = required_series(df, &column.name, NOMINAL_STAGE)?;
            let text = as_text(series)?;
            let ca = text.str()?;

            let filled: Vec<Option<&str>> = ca
                .into_iter()
                .map(|v| v.or(column.fill_value.as_deref()))
                .collect();

            // Create one indicator per category
            for category in &column.categories {
                let indicator: BooleanChunked = filled
                    .iter()
                    .map(|v| Some(*v == Some(category.as_str())))
                    .collect();
                let name = self.indicator_name(&column.name, category);
                if result.column(&name).is_ok() {
                    return Err(CleanError::DataError(format!(
                        "indicator column {name} for {} would overwrite an existing column",
                        column.name
                    )));
                }
                result.with_column(indicator.with_name(name.into()).into_series())?;
            }

            // Drop original column
            result = result.drop(&column.name)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the indicator columns produced by the last fit, in order
    pub fn indicator_columns(&self) -> Vec<String> {
        self.fitted
            .iter()
            .flat_map(|c| {
                c.categories
                    .iter()
                    .map(move |cat| self.indicator_name(&c.name, cat))
            })
            .collect()
    }

    /// Fill value chosen for each column by the last fit
    pub fn fill_values(&self) -> HashMap<String, Option<String>> {
        self.fitted
            .iter()
            .map(|c| (c.name.clone(), c.fill_value.clone()))
            .collect()
    }

    fn indicator_name(&self, column: &str, category: &str) -> String {
        format!("{}{}{}", column, self.separator, category)
    }
}

/// Ordinal mapping followed by one-hot expansion over disjoint column sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    ordinal: OrdinalEncoder,
    nominal: NominalEncoder,
}

impl CategoricalEncoder {
    pub fn new(ordinal: OrdinalEncoder, nominal: NominalEncoder) -> Self {
        Self { ordinal, nominal }
    }

    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self::new(
            OrdinalEncoder::from_schema(schema),
            NominalEncoder::from_schema(schema),
        )
    }

    /// Apply the ordinal lookup, then fit and apply the one-hot expansion
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let ordinal = self.ordinal.transform(df)?;
        self.nominal.fit_transform(&ordinal)
    }

    pub fn ordinal(&self) -> &OrdinalEncoder {
        &self.ordinal
    }

    pub fn nominal(&self) -> &NominalEncoder {
        &self.nominal
    }
}
