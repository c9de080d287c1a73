//! Pipeline configuration

use super::{AggregationMode, ScalerType};
use crate::error::{CleanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Ordered labels used by the ordinal encoder; label `i` maps to `i`.
pub const DEFAULT_ORDINAL_LEVELS: [&str; 7] = [
    "very_low",
    "low",
    "moderate_low",
    "moderate",
    "moderate_high",
    "high",
    "very_high",
];

/// Names and roles of the columns the pipeline knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Client identifier used as the aggregation key
    pub id_column: String,

    /// Columns mapped through the ordinal lookup
    pub ordinal_columns: Vec<String>,

    /// Ordered labels shared by all ordinal columns
    pub ordinal_levels: Vec<String>,

    /// Per-column label lists that replace `ordinal_levels`
    pub ordinal_overrides: HashMap<String, Vec<String>>,

    /// Columns expanded into one-hot indicators
    pub nominal_columns: Vec<String>,

    /// Text columns holding boolean values.
    /// Columns with a boolean dtype are always normalized.
    pub boolean_columns: Vec<String>,

    /// Date-like text columns parsed into datetimes
    pub datetime_columns: Vec<String>,

    /// Separator between column name and category in indicator names
    pub one_hot_separator: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_column: "ID".to_string(),
            ordinal_columns: vec![
                "Infraction_CLH".to_string(),
                "Base_67254".to_string(),
                "Infraction_TEN".to_string(),
            ],
            ordinal_levels: DEFAULT_ORDINAL_LEVELS.iter().map(|s| s.to_string()).collect(),
            ordinal_overrides: HashMap::new(),
            nominal_columns: vec![
                "Infraction_YFSG".to_string(),
                "Infraction_DQLY".to_string(),
            ],
            boolean_columns: Vec::new(),
            datetime_columns: vec!["Expenditure_AHF".to_string()],
            one_hot_separator: "_".to_string(),
        }
    }
}

impl SchemaConfig {
    /// Schema with only an ID column and no encoded columns
    pub fn empty(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            ordinal_columns: Vec::new(),
            ordinal_overrides: HashMap::new(),
            nominal_columns: Vec::new(),
            boolean_columns: Vec::new(),
            datetime_columns: Vec::new(),
            ..Self::default()
        }
    }

    /// Label lookup for an ordinal column
    pub fn ordinal_map(&self, column: &str) -> HashMap<String, i64> {
        self.ordinal_overrides
            .get(column)
            .unwrap_or(&self.ordinal_levels)
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as i64))
            .collect()
    }

    pub fn with_ordinal_columns(mut self, columns: &[&str]) -> Self {
        self.ordinal_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_nominal_columns(mut self, columns: &[&str]) -> Self {
        self.nominal_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_boolean_columns(mut self, columns: &[&str]) -> Self {
        self.boolean_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_datetime_columns(mut self, columns: &[&str]) -> Self {
        self.datetime_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Override the label list of a single ordinal column
    pub fn with_ordinal_override(mut self, column: &str, levels: &[&str]) -> Self {
        self.ordinal_overrides.insert(
            column.to_string(),
            levels.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    fn validate(&self) -> Result<()> {
        if self.id_column.trim().is_empty() {
            return Err(CleanError::ConfigError("id_column must not be empty".to_string()));
        }

        let ordinal: HashSet<&str> = self.ordinal_columns.iter().map(|s| s.as_str()).collect();
        if let Some(col) = self.nominal_columns.iter().find(|c| ordinal.contains(c.as_str())) {
            return Err(CleanError::ConfigError(format!(
                "column {col} is listed as both ordinal and nominal"
            )));
        }

        let encoded = self
            .ordinal_columns
            .iter()
            .chain(&self.nominal_columns)
            .chain(&self.boolean_columns)
            .chain(&self.datetime_columns);
        for col in encoded {
            if *col == self.id_column {
                return Err(CleanError::ConfigError(format!(
                    "id column {col} cannot also be an encoded column"
                )));
            }
        }

        for (col, levels) in &self.ordinal_overrides {
            if levels.is_empty() {
                return Err(CleanError::ConfigError(format!(
                    "ordinal override for {col} has no levels"
                )));
            }
        }
        if !self.ordinal_columns.is_empty() && self.ordinal_levels.is_empty() {
            return Err(CleanError::ConfigError("ordinal_levels must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Configuration for a cleaning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column roles
    pub schema: SchemaConfig,

    /// Columns whose missing percentage is strictly above this value are dropped
    pub missing_threshold: f64,

    /// How transaction rows are collapsed per client
    pub aggregation: AggregationMode,

    /// Scaling applied to the aggregated table
    pub scaler_type: ScalerType,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            missing_threshold: 80.0,
            aggregation: AggregationMode::Contiguous,
            scaler_type: ScalerType::Standard,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the column schema
    pub fn with_schema(mut self, schema: SchemaConfig) -> Self {
        self.schema = schema;
        self
    }

    /// Builder method to set the missing-value threshold (percent)
    pub fn with_missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = threshold;
        self
    }

    /// Builder method to set the aggregation mode
    pub fn with_aggregation(mut self, mode: AggregationMode) -> Self {
        self.aggregation = mode;
        self
    }

    /// Builder method to set the scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Check internal consistency before a run
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.missing_threshold) {
            return Err(CleanError::InvalidParameter {
                name: "missing_threshold".to_string(),
                value: self.missing_threshold.to_string(),
                reason: "must be a percentage between 0 and 100".to_string(),
            });
        }
        self.schema.validate()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
