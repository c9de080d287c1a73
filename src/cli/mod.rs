//! Client Features CLI Module
//!
//! Command-line interface for cleaning transaction tables and inspecting them.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::preprocessing::{
    columns_above_threshold, missing_percentages, AggregationMode, CleaningPipeline, CleaningReport, PipelineConfig,
    ScalerType,
};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "client-features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn per-transaction client records into a one-row-per-client feature table")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Scaler choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScalerArg {
    Standard,
    Minmax,
    None,
}

impl From<ScalerArg> for ScalerType {
    fn from(arg: ScalerArg) -> Self {
        match arg {
            ScalerArg::Standard => ScalerType::Standard,
            ScalerArg::Minmax => ScalerType::MinMax,
            ScalerArg::None => ScalerType::None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a transaction table into one row per client
    Clean {
        /// Input data file (CSV, TSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Output file; format follows the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Pipeline configuration (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Missing-value threshold in percent, overrides the configuration
        #[arg(long)]
        threshold: Option<f64>,

        /// Merge non-contiguous rows of the same client
        #[arg(long)]
        grouped: bool,

        /// Scaler, overrides the configuration
        #[arg(long, value_enum)]
        scaler: Option<ScalerArg>,

        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show data information and missing-value percentages
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Highlight columns above this missing percentage
        #[arg(long, default_value = "80")]
        threshold: f64,
    },

    /// Write the default pipeline configuration
    Config {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Assemble the run configuration from a file and command-line overrides
pub fn build_config(
    config_path: Option<&Path>,
    threshold: Option<f64>,
    grouped: bool,
    scaler: Option<ScalerArg>,
) -> anyhow::Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(threshold) = threshold {
        config = config.with_missing_threshold(threshold);
    }
    if grouped {
        config = config.with_aggregation(AggregationMode::Grouped);
    }
    if let Some(scaler) = scaler {
        config = config.with_scaler(scaler.into());
    }
    config.validate()?;
    Ok(config)
}

pub fn cmd_clean(
    data_path: &Path,
    output_path: &Path,
    config: PipelineConfig,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Clean");

    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new().load(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Cleaning");
    let output = CleaningPipeline::with_config(config).run(&df)?;
    step_done(&format!("{:.3}s", output.report.total_secs()));

    print_report(&output.report);

    step_run(&format!("Saving → {}", output_path.display()));
    let mut frame = output.frame;
    DataSaver::save(&mut frame, output_path)?;
    step_done(&format!("{} rows × {} cols", frame.height(), frame.width()));

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&output.report)?)?;
        step_ok(&format!("Report → {}", path.display()));
    }

    println!();
    Ok(())
}

fn print_report(report: &CleaningReport) {
    println!();
    for stage in &report.stages {
        println!(
            "  {:<22} {:>7} × {:<5} {}",
            muted(&stage.stage.to_string()),
            stage.rows_out,
            stage.columns_out,
            dim(&format!("{:.1} ms", stage.elapsed_secs * 1000.0))
        );
    }
    if !report.dropped_columns.is_empty() {
        println!("  {:<22} {}", muted("dropped"), report.dropped_columns.join(", "));
    }
    if report.split_clients > 0 {
        println!(
            "  {}",
            format!(
                "{} clients have non-contiguous rows (use --grouped to merge them)",
                report.split_clients
            )
            .yellow()
        );
    }
    println!();
}

pub fn cmd_info(data_path: &Path, threshold: f64) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!(
        "  {:<24} {:<12} {:>6} {:>9}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Missing")
    );
    println!("  {}", dim(&"─".repeat(54)));

    for (col, (_, pct)) in df.get_columns().iter().zip(missing_percentages(&df)) {
        let pct_text = match pct {
            Some(p) => format!("{:.1}%", p),
            None => "-".to_string(),
        };
        let pct_text = match pct {
            Some(p) if p >= 100.0 || p > threshold => pct_text.red().to_string(),
            _ => pct_text,
        };
        println!(
            "  {:<24} {:<12} {:>6} {:>9}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            pct_text
        );
    }

    let flagged = columns_above_threshold(&df, threshold);
    println!();
    if flagged.is_empty() {
        step_ok(&format!("No column above {}% missing", threshold));
    } else {
        println!(
            "  {} {} column(s) above {}% missing would be dropped",
            "!".yellow(),
            flagged.len(),
            threshold
        );
    }

    println!();
    Ok(())
}

pub fn cmd_config(output_path: &Path) -> anyhow::Result<()> {
    PipelineConfig::default().to_json_file(output_path)?;
    step_ok(&format!("Default configuration → {}", output_path.display()));
    Ok(())
}
