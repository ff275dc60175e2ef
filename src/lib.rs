//! # dealcast
//!
//! `dealcast_workspace` ties together the daily deal ETL and the revenue
//! forecasting core.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use dealcast_workspace::forecast::{evaluate_models, DailySeries, ForecastConfig};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = DailySeries::from_parts(start, vec![100.0; 30]).unwrap();
//! let ensemble = evaluate_models(&series, &ForecastConfig::default());
//! assert!(!ensemble.is_empty());
//! ```

/// The forecasting core: series assembly, model ensemble, selection
pub use revenue_forecast as forecast;

/// The ETL shell: extract ingestion, warehouse, run orchestration
pub use deal_pipeline as pipeline;
