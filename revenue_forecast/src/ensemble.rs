//! Model ensemble evaluation: every model is attempted independently and
//! failures never abort the run

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ForecastConfig;
use crate::error::Result;
use crate::models::decomposition::Decomposition;
use crate::models::gradient_boost::GradientBoost;
use crate::models::holt_winters::HoltWinters;
use crate::models::{ForecastModel, ModelKind, TrainedForecastModel};
use crate::series::DailySeries;

/// One model's forecast: which model, for which dates, with which values.
///
/// Values are clamped at 0; dates start the day after the last historical
/// date of the evaluated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    /// Which model produced the forecast
    pub model: ModelKind,
    /// Forecast dates, one per horizon step
    pub dates: Vec<NaiveDate>,
    /// Forecast values, aligned with `dates`
    pub values: Vec<f64>,
}

impl ModelForecast {
    /// The first forecast value (the next-day prediction)
    pub fn next_value(&self) -> f64 {
        self.values[0]
    }

    /// The first forecast date
    pub fn next_date(&self) -> NaiveDate {
        self.dates[0]
    }
}

/// The per-model forecasts that succeeded in one evaluation run.
///
/// Insertion order is the attempt order, which is the declared priority
/// order; the selector relies on this for its tie-break.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    forecasts: Vec<ModelForecast>,
}

impl EnsembleResult {
    /// An ensemble with no successful models
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an ensemble from pre-computed forecasts, keeping their order.
    ///
    /// Intended for tests and for callers that evaluate models themselves;
    /// [`evaluate_models`] is the normal entry point.
    pub fn from_forecasts(forecasts: Vec<ModelForecast>) -> Self {
        Self { forecasts }
    }

    /// Whether no model produced a forecast
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    /// Number of models that produced a forecast
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    /// Look up one model's forecast
    pub fn get(&self, model: ModelKind) -> Option<&ModelForecast> {
        self.forecasts.iter().find(|f| f.model == model)
    }

    /// Forecasts in attempt order
    pub fn iter(&self) -> impl Iterator<Item = &ModelForecast> {
        self.forecasts.iter()
    }

    /// The models present, in attempt order
    pub fn models(&self) -> Vec<ModelKind> {
        self.forecasts.iter().map(|f| f.model).collect()
    }

    fn push(&mut self, forecast: ModelForecast) {
        self.forecasts.push(forecast);
    }
}

/// Train one model and forecast `horizon` steps ahead
fn attempt_model(model: ModelKind, series: &DailySeries, horizon: usize) -> Result<Vec<f64>> {
    let result = match model {
        ModelKind::HoltWinters => HoltWinters::weekly().train(series)?.forecast(horizon)?,
        ModelKind::Decomposition => Decomposition::weekly().train(series)?.forecast(horizon)?,
        ModelKind::GradientBoost => GradientBoost::standard().train(series)?.forecast(horizon)?,
    };
    Ok(result.values().to_vec())
}

/// Fit every configured model against the series and collect the
/// forecasts that succeeded.
///
/// Models are attempted strictly in `config.priority` order. A failure in
/// one model (insufficient data, numerical trouble) is logged and the
/// model is omitted; sibling models are unaffected. An empty or all-zero
/// series short-circuits to an empty result without fitting anything.
pub fn evaluate_models(series: &DailySeries, config: &ForecastConfig) -> EnsembleResult {
    let Some(last_date) = series.last_date() else {
        info!("no usable time series data, skipping forecasting");
        return EnsembleResult::empty();
    };
    if series.total() == 0.0 {
        info!("all aggregated deal values are zero, skipping forecasting");
        return EnsembleResult::empty();
    }

    let mut ensemble = EnsembleResult::empty();

    for &model in &config.priority {
        match attempt_model(model, series, config.horizon) {
            Ok(values) if !values.is_empty() => {
                let values: Vec<f64> = values.into_iter().map(|v| v.max(0.0)).collect();
                let dates: Vec<NaiveDate> = (1..=values.len() as i64)
                    .map(|step| last_date + Duration::days(step))
                    .collect();
                info!(
                    model = model.as_str(),
                    next_value = values[0],
                    "model fit succeeded"
                );
                ensemble.push(ModelForecast {
                    model,
                    dates,
                    values,
                });
            }
            Ok(_) => {
                warn!(model = model.as_str(), "model produced no values, omitted");
            }
            Err(error) => {
                warn!(model = model.as_str(), %error, "model failed, omitted from ensemble");
            }
        }
    }

    if ensemble.is_empty() {
        info!("all models failed or were skipped, no forecast produced");
    }

    ensemble
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn empty_series_short_circuits() {
        let ensemble = evaluate_models(&DailySeries::empty(), &ForecastConfig::default());
        assert!(ensemble.is_empty());
    }

    #[test]
    fn zero_series_short_circuits() {
        let series = DailySeries::from_parts(start(), vec![0.0; 20]).unwrap();
        let ensemble = evaluate_models(&series, &ForecastConfig::default());
        assert!(ensemble.is_empty());
    }

    #[test]
    fn attempt_order_matches_priority() {
        let series = DailySeries::from_parts(start(), vec![100.0; 30]).unwrap();
        let ensemble = evaluate_models(&series, &ForecastConfig::default());
        assert_eq!(ensemble.models(), ModelKind::PRIORITY.to_vec());
    }

    #[test]
    fn forecast_dates_start_after_history() {
        let series = DailySeries::from_parts(start(), vec![100.0; 30]).unwrap();
        let ensemble = evaluate_models(&series, &ForecastConfig::default());

        let expected = start() + Duration::days(30);
        for forecast in ensemble.iter() {
            assert_eq!(forecast.next_date(), expected);
        }
    }
}
