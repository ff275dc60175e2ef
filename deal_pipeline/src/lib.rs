//! # Deal Pipeline
//!
//! Daily sales-deal ETL around the [`revenue_forecast`] core: reads the
//! dated extract, stages it into an embedded `DuckDB` warehouse, runs the
//! dimensional transformation procedures and publishes the one-day-ahead
//! revenue forecast into the warehouse's single forecast slot.
//!
//! The `run_etl` binary drives one run per ingestion date:
//!
//! ```text
//! run_etl --date 2024-01-31 --extract-dir daily_extracts --database warehouse.duckdb
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod warehouse;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::error::{PipelineError, Result};
pub use crate::extract::{load_extract, ExtractRow};
pub use crate::pipeline::{run_etl, RunReport};
pub use crate::warehouse::{DealWarehouse, StoredForecast};
