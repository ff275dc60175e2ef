//! # Revenue Forecast
//!
//! A Rust library for one-day-ahead revenue forecasting from won-deal
//! records.
//!
//! ## Features
//!
//! - Gap-filled daily revenue series built from raw deal records
//! - Competing forecasting models (Holt-Winters smoothing,
//!   trend/seasonality decomposition, gradient-boosted calendar
//!   regression), each attempted independently
//! - Deterministic first-available selection over a declared model
//!   priority, and a publishing seam for the warehouse forecast slot
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use revenue_forecast::{evaluate_models, DailySeries, ForecastConfig};
//!
//! // Thirty days of steady revenue
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = DailySeries::from_parts(start, vec![100.0; 30]).unwrap();
//!
//! let ensemble = evaluate_models(&series, &ForecastConfig::default());
//! assert_eq!(ensemble.len(), 3);
//!
//! let chosen = revenue_forecast::select(&ensemble, &ForecastConfig::default().priority).unwrap();
//! assert!((chosen.next_value() - 100.0).abs() < 1.0);
//! ```

pub mod config;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod selector;
pub mod series;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::ensemble::{evaluate_models, EnsembleResult, ModelForecast};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ForecastResult, ModelKind, TrainedForecastModel};
pub use crate::selector::{publish_next_day, select, ForecastSink, PublishedForecast};
pub use crate::series::{DailySeries, DealHistorySource, DealRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
