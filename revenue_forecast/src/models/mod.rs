//! Forecasting models for the daily revenue series

use std::fmt;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::DailySeries;

/// Identifier of one forecasting model family.
///
/// The declared order of [`ModelKind::PRIORITY`] is the fixed attempt and
/// selection order; nothing depends on map iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Additive trend + weekly seasonal exponential smoothing
    HoltWinters,
    /// Least-squares trend/seasonality decomposition forecaster
    Decomposition,
    /// Gradient-boosted regression on calendar features
    GradientBoost,
}

impl ModelKind {
    /// Fixed default priority: smoothing, then decomposition, then
    /// regression
    pub const PRIORITY: [ModelKind; 3] = [
        ModelKind::HoltWinters,
        ModelKind::Decomposition,
        ModelKind::GradientBoost,
    ];

    /// Stable name used in logs and in the published forecast record
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::HoltWinters => "HoltWinters",
            ModelKind::Decomposition => "Decomposition",
            ModelKind::GradientBoost => "GradientBoost",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(crate::error::ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self { values, horizons })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Generate confidence intervals for the forecast
    pub fn confidence_intervals(&self, confidence_level: f64) -> Result<Vec<(f64, f64)>> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(crate::error::ForecastError::InvalidParameter(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        // Fixed standard-normal multipliers for the common levels
        let z_score = match confidence_level {
            c if c >= 0.99 => 2.576,
            c if c >= 0.95 => 1.96,
            c if c >= 0.90 => 1.645,
            _ => 1.0,
        };

        let std_dev = 0.05;

        let intervals: Vec<(f64, f64)> = self
            .values
            .iter()
            .map(|v| {
                let margin = z_score * std_dev * v.abs();
                (*v - margin, *v + margin)
            })
            .collect();

        Ok(intervals)
    }

    /// Serialize the result to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::error::ForecastError::DataError(e.to_string()))
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast values for future periods.
    ///
    /// Values are for the `horizons` days immediately following the last
    /// trained-on date, never for historical dates.
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on the daily revenue series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the series
    fn train(&self, series: &DailySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod decomposition;
pub mod gradient_boost;
pub mod holt_winters;
