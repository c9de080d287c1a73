//! The client cleaning pipeline

use super::{
    aggregator::ClientAggregator,
    coercion::{BooleanNormalizer, DatetimeCoercer},
    config::PipelineConfig,
    encoder::CategoricalEncoder,
    imputer::NumericImputer,
    pruning::ColumnPruner,
    scaler::{Scaler, ScalerParams},
};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::info;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ColumnPruning,
    CategoricalEncoding,
    TypeCoercion,
    NumericImputation,
    ClientAggregation,
    Scaling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ColumnPruning => "column pruning",
            Stage::CategoricalEncoding => "categorical encoding",
            Stage::TypeCoercion => "type coercion",
            Stage::NumericImputation => "numeric imputation",
            Stage::ClientAggregation => "client aggregation",
            Stage::Scaling => "scaling",
        };
        f.write_str(name)
    }
}

/// Shape and timing of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub columns_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    pub elapsed_secs: f64,
}

/// Everything fitted or decided during one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub stages: Vec<StageReport>,
    /// Columns removed by pruning
    pub dropped_columns: Vec<String>,
    /// Indicator columns created by one-hot encoding
    pub indicator_columns: Vec<String>,
    /// Mode used to fill each boolean column
    pub boolean_fill_values: Vec<(String, bool)>,
    /// Mean used to fill each numeric column
    pub numeric_fill_values: Vec<(String, f64)>,
    /// Scaler parameters per output column
    pub scaler_params: Vec<(String, ScalerParams)>,
    /// Rows in the aggregated table
    pub client_rows: usize,
    /// Clients whose rows were not contiguous
    pub split_clients: usize,
}

impl CleaningReport {
    /// Total seconds spent across all stages
    pub fn total_secs(&self) -> f64 {
        self.stages.iter().map(|s| s.elapsed_secs).sum()
    }
}

/// Result of a run: the cleaned table and its report
#[derive(Debug, Clone)]
pub struct CleaningOutput {
    pub frame: DataFrame,
    pub report: CleaningReport,
}

/// Runs the cleaning stages in order over a single table
#[derive(Debug, Clone, Default)]
pub struct CleaningPipeline {
    config: PipelineConfig,
}

impl CleaningPipeline {
    /// Create a pipeline with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with a custom configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean a table and return only the result
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(self.run(df)?.frame)
    }

    /// Clean a table, keeping the per-run report
    pub fn run(&self, df: &DataFrame) -> Result<CleaningOutput> {
        self.config.validate()?;
        let schema = &self.config.schema;
        let id = schema.id_column.as_str();
        let mut report = CleaningReport::default();

        let mut pruner = ColumnPruner::new(self.config.missing_threshold);
        let df = timed(Stage::ColumnPruning, df, &mut report, |df| pruner.transform(df))?;
        report.dropped_columns = pruner.dropped().to_vec();

        let mut encoder = CategoricalEncoder::from_schema(schema);
        let df = timed(Stage::CategoricalEncoding, &df, &mut report, |df| {
            encoder.fit_transform(df)
        })?;
        report.indicator_columns = encoder.nominal().indicator_columns();

        let dates = DatetimeCoercer::from_schema(schema);
        let mut booleans = BooleanNormalizer::from_schema(schema);
        let df = timed(Stage::TypeCoercion, &df, &mut report, |df| {
            booleans.transform(&dates.transform(df)?)
        })?;
        report.boolean_fill_values = booleans.fill_values().to_vec();

        let mut imputer = NumericImputer::new().with_excluded(&[id]);
        let df = timed(Stage::NumericImputation, &df, &mut report, |df| {
            imputer.fit_transform(df)
        })?;
        report.numeric_fill_values = imputer.fill_values().to_vec();

        let mut aggregator = ClientAggregator::new(id).with_mode(self.config.aggregation);
        let df = timed(Stage::ClientAggregation, &df, &mut report, |df| {
            aggregator.transform(df)
        })?;
        report.client_rows = aggregator.client_rows();
        report.split_clients = aggregator.split_clients();

        let mut scaler = Scaler::new(self.config.scaler_type).with_excluded(&[id]);
        let frame = timed(Stage::Scaling, &df, &mut report, |df| scaler.fit_transform(df))?;
        report.scaler_params = scaler.params().to_vec();

        info!(
            clients = frame.height(),
            columns = frame.width(),
            elapsed_secs = report.total_secs(),
            "Cleaning finished"
        );
        Ok(CleaningOutput { frame, report })
    }
}

/// Run one stage, log its completion and record its shape and timing
fn timed<F>(stage: Stage, df: &DataFrame, report: &mut CleaningReport, apply: F) -> Result<DataFrame>
where
    F: FnOnce(&DataFrame) -> Result<DataFrame>,
{
    let start = Instant::now();
    let out = apply(df)?;
    let elapsed_secs = start.elapsed().as_secs_f64();

    info!(
        stage = %stage,
        rows = out.height(),
        columns = out.width(),
        elapsed_ms = elapsed_secs * 1000.0,
        "Stage complete"
    );
    report.stages.push(StageReport {
        stage,
        rows_in: df.height(),
        columns_in: df.width(),
        rows_out: out.height(),
        columns_out: out.width(),
        elapsed_secs,
    });
    Ok(out)
}
