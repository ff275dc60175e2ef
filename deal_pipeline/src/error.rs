//! Error types for the pipeline crate

use std::path::PathBuf;

use revenue_forecast::ForecastError;
use thiserror::Error;

/// Errors raised while running the daily pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The dated extract file does not exist
    #[error("Extract not found: {}", path.display())]
    ExtractMissing { path: PathBuf },

    /// I/O failure reading the extract
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed extract contents
    #[error("Extract error: {0}")]
    Extract(#[from] csv::Error),

    /// Warehouse database failure
    #[error(transparent)]
    Warehouse(#[from] duckdb::Error),

    /// Warehouse rows that cannot be interpreted
    #[error("Warehouse data error: {0}")]
    WarehouseData(String),

    /// A transformation procedure name that is not in the registry
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    /// Failure inside the forecasting core
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;
