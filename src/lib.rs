//! Client Features - batch cleaning of per-transaction client records
//!
//! This crate turns a raw table of transactions into a numeric,
//! one-row-per-client feature table ready for modeling.
//!
//! # Modules
//!
//! - [`preprocessing`] - The cleaning stages and the pipeline that runs them
//! - [`utils`] - Loading and saving tables (CSV, JSON, Parquet)
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use client_features::prelude::*;
//!
//! let df = DataLoader::new().load("transactions.csv")?;
//! let output = CleaningPipeline::new().run(&df)?;
//! println!("{} clients", output.frame.height());
//! # Ok::<(), client_features::CleanError>(())
//! ```

// Core error handling
pub mod error;

// Cleaning stages
pub mod preprocessing;

// Loading and saving
pub mod utils;

// Services
pub mod cli;

pub use error::{CleanError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CleanError, Result};

    // Pipeline
    pub use crate::preprocessing::{
        AggregationMode, CleaningOutput, CleaningPipeline, CleaningReport, PipelineConfig,
        ScalerType, SchemaConfig,
    };

    // Stages
    pub use crate::preprocessing::{
        BooleanNormalizer, CategoricalEncoder, ClientAggregator, ColumnPruner, DatetimeCoercer,
        NominalEncoder, NumericImputer, OrdinalEncoder, Scaler,
    };

    // IO
    pub use crate::utils::{DataLoader, DataSaver};
}
