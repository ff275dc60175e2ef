//! Additive Holt-Winters smoothing over the daily revenue series
//!
//! Triple exponential smoothing with an additive trend and an additive
//! weekly seasonal component:
//! - Level: `l_t = alpha*(y_t - s_{t-m}) + (1-alpha)*(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = beta*(l_t - l_{t-1}) + (1-beta)*b_{t-1}`
//! - Seasonal: `s_t = gamma*(y_t - l_t) + (1-gamma)*s_{t-m}`
//! - Forecast: `y_{t+h} = l_t + h*b_t + s_{t+h-m}`

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::DailySeries;

/// Candidate level smoothing parameters for the grid search
const ALPHA_GRID: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];
/// Candidate trend and seasonal smoothing parameters
const BETA_GAMMA_GRID: [f64; 4] = [0.05, 0.1, 0.2, 0.3];

/// Additive Holt-Winters model with SSE-minimizing smoothing parameters
#[derive(Debug, Clone)]
pub struct HoltWinters {
    /// Name of the model
    name: String,
    /// Seasonal period in days
    period: usize,
}

/// Trained Holt-Winters model
#[derive(Debug, Clone)]
pub struct TrainedHoltWinters {
    /// Name of the model
    name: String,
    /// Seasonal period in days
    period: usize,
    /// Final smoothed level
    level: f64,
    /// Final smoothed trend
    trend: f64,
    /// Seasonal indices, one per day of the period
    seasonals: Vec<f64>,
    /// Number of observations trained on
    n: usize,
}

/// Smoothing state after one full pass over the series
struct SmoothedState {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    sse: f64,
}

impl HoltWinters {
    /// Create a model with an explicit seasonal period
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be at least 2 days".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Holt-Winters (additive, period={})", period),
            period,
        })
    }

    /// Create a model with weekly seasonality
    pub fn weekly() -> Self {
        Self {
            name: "Holt-Winters (additive, period=7)".to_string(),
            period: 7,
        }
    }

    /// Get the seasonal period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Initial level, trend and seasonal indices from the first season(s)
    fn initialize_state(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let level = values.iter().take(period).sum::<f64>() / period as f64;

        let trend = if values.len() >= 2 * period {
            (0..period)
                .map(|i| (values[period + i] - values[i]) / period as f64)
                .sum::<f64>()
                / period as f64
        } else {
            0.0
        };

        let mut seasonals: Vec<f64> = values.iter().take(period).map(|y| y - level).collect();

        // Additive seasonal indices sum to zero
        let adjustment = seasonals.iter().sum::<f64>() / period as f64;
        for s in seasonals.iter_mut() {
            *s -= adjustment;
        }

        (level, trend, seasonals)
    }

    /// Run the smoothing recursions over the full series
    fn smooth(values: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64) -> SmoothedState {
        let (mut level, mut trend, mut seasonals) = Self::initialize_state(values, period);
        let mut sse = 0.0;

        for (t, &y) in values.iter().enumerate().skip(period) {
            let season_idx = t % period;
            let s = seasonals[season_idx];

            let one_step = level + trend + s;
            let error = y - one_step;
            sse += error * error;

            let level_prev = level;
            level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend);
            trend = beta * (level - level_prev) + (1.0 - beta) * trend;
            seasonals[season_idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }

        SmoothedState {
            level,
            trend,
            seasonals,
            sse,
        }
    }
}

impl ForecastModel for HoltWinters {
    type Trained = TrainedHoltWinters;

    fn train(&self, series: &DailySeries) -> Result<TrainedHoltWinters> {
        let values = series.values();
        let needed = 2 * self.period;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        // Coarse grid search over the smoothing parameters, keeping the
        // combination with the smallest one-step-ahead SSE
        let mut best: Option<SmoothedState> = None;
        for alpha in ALPHA_GRID {
            for beta in BETA_GAMMA_GRID {
                for gamma in BETA_GAMMA_GRID {
                    let state = Self::smooth(values, self.period, alpha, beta, gamma);
                    if !state.sse.is_finite() {
                        continue;
                    }
                    match &best {
                        Some(current) if current.sse <= state.sse => {}
                        _ => best = Some(state),
                    }
                }
            }
        }

        let state = best.ok_or_else(|| {
            ForecastError::ModelError(
                "Smoothing diverged for every parameter combination".to_string(),
            )
        })?;

        Ok(TrainedHoltWinters {
            name: self.name.clone(),
            period: self.period,
            level: state.level,
            trend: state.trend,
            seasonals: state.seasonals,
            n: values.len(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedHoltWinters {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        let values: Vec<f64> = (1..=horizons)
            .map(|h| {
                let season_idx = (self.n + h - 1) % self.period;
                self.level + h as f64 * self.trend + self.seasonals[season_idx]
            })
            .collect();

        ForecastResult::new(values, horizons)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_of(values: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailySeries::from_parts(start, values).unwrap()
    }

    #[test]
    fn constant_series_forecasts_the_constant() {
        let series = series_of(vec![100.0; 30]);
        let trained = HoltWinters::weekly().train(&series).unwrap();
        let forecast = trained.forecast(1).unwrap();

        assert_eq!(forecast.horizons(), 1);
        assert!((forecast.values()[0] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn tracks_weekly_pattern() {
        // Two high days per week on an otherwise flat series
        let values: Vec<f64> = (0..42)
            .map(|i| if i % 7 < 2 { 200.0 } else { 50.0 })
            .collect();
        let series = series_of(values);
        let trained = HoltWinters::weekly().train(&series).unwrap();

        // Day 42 is the start of a new week: a high day
        let forecast = trained.forecast(7).unwrap();
        assert!(forecast.values()[0] > forecast.values()[3]);
    }

    #[test]
    fn needs_two_full_seasons() {
        let series = series_of(vec![10.0, 20.0, 30.0]);
        let result = HoltWinters::weekly().train(&series);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 14, got: 3 })
        ));
    }

    #[test]
    fn rejects_degenerate_period() {
        assert!(HoltWinters::new(1).is_err());
        assert!(HoltWinters::new(7).is_ok());
    }
}
