use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use deal_pipeline::{run_etl, PipelineConfig};

/// Daily deal ingestion and revenue forecast run
#[derive(Debug, Parser)]
#[command(name = "run_etl", version, about)]
struct Cli {
    /// Ingestion date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,

    /// Directory holding the dated extract files
    #[arg(long, default_value = "daily_extracts")]
    extract_dir: PathBuf,

    /// Warehouse database file
    #[arg(long, default_value = "warehouse.duckdb")]
    database: PathBuf,
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() {
    tracing_subscriber::fmt().init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> deal_pipeline::Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::new(cli.extract_dir, cli.database);

    let report = run_etl(&config, cli.date)?;

    match &report.published {
        Some(forecast) => println!(
            "Forecast for {} updated using {}: {:.2}",
            forecast.date, forecast.model, forecast.value
        ),
        None => println!("No forecast produced for {}", cli.date),
    }

    Ok(())
}
