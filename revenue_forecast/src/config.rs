//! Configuration for a forecasting run

use crate::error::{ForecastError, Result};
use crate::models::ModelKind;

/// Configuration handed to the forecasting core at invocation time.
///
/// Replaces ambient environment lookups: everything the evaluator and the
/// selector need to know arrives through this structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastConfig {
    /// How many days ahead to forecast
    pub horizon: usize,
    /// Model attempt order; the selector picks the first entry that
    /// produced a forecast
    pub priority: Vec<ModelKind>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            priority: ModelKind::PRIORITY.to_vec(),
        }
    }
}

impl ForecastConfig {
    /// Create a configuration with a custom horizon and the default
    /// model priority
    pub fn with_horizon(horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            horizon,
            ..Self::default()
        })
    }

    /// Override the model priority order
    pub fn with_priority(mut self, priority: Vec<ModelKind>) -> Result<Self> {
        if priority.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Model priority must name at least one model".to_string(),
            ));
        }

        self.priority = priority;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_day_ahead_all_models() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon, 1);
        assert_eq!(config.priority, ModelKind::PRIORITY.to_vec());
    }

    #[test]
    fn zero_horizon_is_rejected() {
        assert!(ForecastConfig::with_horizon(0).is_err());
    }

    #[test]
    fn empty_priority_is_rejected() {
        assert!(ForecastConfig::default().with_priority(Vec::new()).is_err());
    }
}
