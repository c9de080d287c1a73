//! Client Features - Main Entry Point
//!
//! Cleans a transaction table into a one-row-per-client feature table.

use clap::Parser;
use client_features::cli::{build_config, cmd_clean, cmd_config, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client_features=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean { data, output, config, threshold, grouped, scaler, report } => {
            let config = build_config(config.as_deref(), threshold, grouped, scaler)?;
            cmd_clean(&data, &output, config, report.as_deref())?;
        }
        Commands::Info { data, threshold } => {
            cmd_info(&data, threshold)?;
        }
        Commands::Config { output } => {
            cmd_config(&output)?;
        }
    }

    Ok(())
}
