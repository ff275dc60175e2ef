//! Forecast selection and publication

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ForecastConfig;
use crate::ensemble::{EnsembleResult, ModelForecast};
use crate::error::Result;
use crate::models::ModelKind;

/// The single (model, date, value) triple written to the forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedForecast {
    /// Model whose forecast was chosen
    pub model: ModelKind,
    /// Date the forecast is for
    pub date: NaiveDate,
    /// Forecast value
    pub value: f64,
}

/// External persistence for the current forecast.
///
/// Implementations must be idempotent under retry: publishing the same
/// triple twice leaves the stored state identical to publishing it once.
/// A publish failure is fatal for the run and must be surfaced as an
/// error, never swallowed.
pub trait ForecastSink {
    /// Overwrite the persisted "current forecast" slot
    fn publish(&mut self, forecast: &PublishedForecast) -> Result<()>;
}

/// Pick the first model of the priority order that produced a forecast.
///
/// Purely positional: no accuracy signal participates, and the same
/// ensemble always yields the same choice.
pub fn select<'a>(
    ensemble: &'a EnsembleResult,
    priority: &[ModelKind],
) -> Option<&'a ModelForecast> {
    priority.iter().find_map(|&model| ensemble.get(model))
}

/// Select one model's forecast and publish it for the day after the
/// ingestion date.
///
/// The published date is always `ingestion_date + 1`, independent of the
/// dates the chosen model forecast internally (the two can diverge when
/// the series has trailing gaps). Returns `Ok(None)` without touching the
/// sink when the ensemble is empty; propagates sink failures.
pub fn publish_next_day(
    ensemble: &EnsembleResult,
    ingestion_date: NaiveDate,
    config: &ForecastConfig,
    sink: &mut dyn ForecastSink,
) -> Result<Option<PublishedForecast>> {
    let Some(chosen) = select(ensemble, &config.priority) else {
        info!("ensemble is empty, nothing to publish");
        return Ok(None);
    };

    let published = PublishedForecast {
        model: chosen.model,
        date: ingestion_date + Duration::days(1),
        value: chosen.next_value(),
    };

    sink.publish(&published)?;
    info!(
        model = published.model.as_str(),
        date = %published.date,
        value = published.value,
        "forecast published"
    );

    Ok(Some(published))
}
