//! Pipeline configuration

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use revenue_forecast::ForecastConfig;

use crate::warehouse;

/// Everything one pipeline run needs to know, passed in explicitly
/// instead of read from the environment.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the dated extract files
    pub extract_dir: PathBuf,
    /// Path of the warehouse database file
    pub database_path: PathBuf,
    /// Transformation procedures to run after staging, in order
    pub procedures: Vec<String>,
    /// Forecasting configuration (horizon, model priority)
    pub forecast: ForecastConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_dir: PathBuf::from("daily_extracts"),
            database_path: PathBuf::from("warehouse.duckdb"),
            procedures: warehouse::PROCEDURE_ORDER
                .iter()
                .map(|name| name.to_string())
                .collect(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Configuration with explicit paths and the default procedures
    pub fn new(extract_dir: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    /// Path of the extract file for one ingestion date
    pub fn extract_path(&self, ingestion_date: NaiveDate) -> PathBuf {
        self.extract_dir
            .join(format!("Before_{}.csv", ingestion_date.format("%Y-%m-%d")))
    }

    /// The configured extract directory
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }
}
