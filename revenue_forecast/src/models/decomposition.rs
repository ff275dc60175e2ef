//! Trend/seasonality decomposition forecaster
//!
//! Fits the series as a linear trend plus a weekly seasonal component
//! expressed with Fourier terms, estimated jointly by least squares:
//!
//! `y_t = a + b*t + sum_k ( c_k*sin(2*pi*k*t/7) + d_k*cos(2*pi*k*t/7) )`
//!
//! Forecasting evaluates the fitted curve only at time indices strictly
//! after the last historical observation.

use std::f64::consts::PI;

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::DailySeries;

/// Number of Fourier harmonic pairs used for the weekly component
const FOURIER_ORDER: usize = 3;

/// Decomposition model with weekly seasonality
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Name of the model
    name: String,
    /// Seasonal period in days
    period: usize,
}

/// Trained decomposition model
#[derive(Debug, Clone)]
pub struct TrainedDecomposition {
    /// Name of the model
    name: String,
    /// Seasonal period in days
    period: usize,
    /// Fitted coefficients: intercept, slope, then sin/cos pairs
    coefficients: Vec<f64>,
    /// Number of observations trained on
    n: usize,
}

impl Decomposition {
    /// Create a model with an explicit seasonal period
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be at least 2 days".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Decomposition (trend+seasonal, period={})", period),
            period,
        })
    }

    /// Create a model with weekly seasonality
    pub fn weekly() -> Self {
        Self {
            name: "Decomposition (trend+seasonal, period=7)".to_string(),
            period: 7,
        }
    }

    /// Get the seasonal period
    pub fn period(&self) -> usize {
        self.period
    }
}

/// Design-matrix row for time index `t`: intercept, trend, Fourier pairs
fn design_row(t: f64, period: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + 2 * FOURIER_ORDER);
    row.push(1.0);
    row.push(t);
    for k in 1..=FOURIER_ORDER {
        let angle = 2.0 * PI * k as f64 * t / period as f64;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

/// Solve the normal equations `X'X beta = X'y` by Gaussian elimination
/// with partial pivoting
fn solve_least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    let p = rows[0].len();

    let mut gram = vec![vec![0.0; p]; p];
    let mut moment = vec![0.0; p];
    for (row, &y) in rows.iter().zip(targets.iter()) {
        for i in 0..p {
            moment[i] += row[i] * y;
            for j in 0..p {
                gram[i][j] += row[i] * row[j];
            }
        }
    }

    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&a, &b| {
                gram[a][col]
                    .abs()
                    .partial_cmp(&gram[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if gram[pivot_row][col].abs() < 1e-10 {
            return Err(ForecastError::ModelError(
                "Normal equations are singular".to_string(),
            ));
        }
        gram.swap(col, pivot_row);
        moment.swap(col, pivot_row);

        for row in (col + 1)..p {
            let factor = gram[row][col] / gram[col][col];
            for j in col..p {
                gram[row][j] -= factor * gram[col][j];
            }
            moment[row] -= factor * moment[col];
        }
    }

    let mut beta = vec![0.0; p];
    for row in (0..p).rev() {
        let tail: f64 = ((row + 1)..p).map(|j| gram[row][j] * beta[j]).sum();
        beta[row] = (moment[row] - tail) / gram[row][row];
    }

    Ok(beta)
}

impl ForecastModel for Decomposition {
    type Trained = TrainedDecomposition;

    fn train(&self, series: &DailySeries) -> Result<TrainedDecomposition> {
        let values = series.values();
        let needed = 2 * self.period;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let rows: Vec<Vec<f64>> = (0..values.len())
            .map(|t| design_row(t as f64, self.period))
            .collect();
        let coefficients = solve_least_squares(&rows, values)?;

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelError(
                "Least-squares fit produced non-finite coefficients".to_string(),
            ));
        }

        Ok(TrainedDecomposition {
            name: self.name.clone(),
            period: self.period,
            coefficients,
            n: values.len(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedDecomposition {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        // Time indices n, n+1, ... are strictly after the last
        // historical observation at n-1
        let values: Vec<f64> = (0..horizons)
            .map(|step| {
                let t = (self.n + step) as f64;
                design_row(t, self.period)
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(x, c)| x * c)
                    .sum()
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
        let trained = Decomposition::weekly().train(&series).unwrap();
        let forecast = trained.forecast(1).unwrap();

        assert!((forecast.values()[0] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn recovers_a_linear_trend() {
        let values: Vec<f64> = (0..28).map(|t| 10.0 + 2.0 * t as f64).collect();
        let series = series_of(values);
        let trained = Decomposition::weekly().train(&series).unwrap();

        // Next point on the line is 10 + 2*28 = 66
        let forecast = trained.forecast(1).unwrap();
        assert!((forecast.values()[0] - 66.0).abs() < 1e-3);
    }

    #[test]
    fn needs_two_full_seasons() {
        let series = series_of(vec![5.0, 6.0, 7.0]);
        let result = Decomposition::weekly().train(&series);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 14, got: 3 })
        ));
    }

    #[test]
    fn forecast_dates_follow_history() {
        let values: Vec<f64> = (0..21).map(|t| 50.0 + (t % 7) as f64).collect();
        let series = series_of(values);
        let trained = Decomposition::weekly().train(&series).unwrap();

        let forecast = trained.forecast(3).unwrap();
        assert_eq!(forecast.horizons(), 3);
        assert_eq!(forecast.values().len(), 3);
    }
}
