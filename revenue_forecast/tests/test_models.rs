use assert_approx_eq::assert_approx_eq;
use chrono::{Datelike, Duration, NaiveDate};
use revenue_forecast::models::decomposition::Decomposition;
use revenue_forecast::models::gradient_boost::GradientBoost;
use revenue_forecast::models::holt_winters::HoltWinters;
use revenue_forecast::models::{ForecastModel, TrainedForecastModel};
use revenue_forecast::series::DailySeries;
use revenue_forecast::ForecastError;

fn series_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn constant_series(days: usize, value: f64) -> DailySeries {
    DailySeries::from_parts(series_start(), vec![value; days]).unwrap()
}

#[test]
fn all_models_recover_a_constant_level() {
    let series = constant_series(30, 100.0);

    let hw = HoltWinters::weekly().train(&series).unwrap();
    let hw_forecast = hw.forecast(1).unwrap();
    assert_approx_eq!(hw_forecast.values()[0], 100.0, 0.5);

    let dc = Decomposition::weekly().train(&series).unwrap();
    let dc_forecast = dc.forecast(1).unwrap();
    assert_approx_eq!(dc_forecast.values()[0], 100.0, 0.5);

    let gb = GradientBoost::standard().train(&series).unwrap();
    let gb_forecast = gb.forecast(1).unwrap();
    assert_approx_eq!(gb_forecast.values()[0], 100.0, 0.5);
}

#[test]
fn holt_winters_supports_multi_day_horizons() {
    let series = constant_series(28, 40.0);
    let trained = HoltWinters::weekly().train(&series).unwrap();

    let forecast = trained.forecast(7).unwrap();
    assert_eq!(forecast.horizons(), 7);
    for value in forecast.values() {
        assert_approx_eq!(*value, 40.0, 0.5);
    }
}

#[test]
fn decomposition_extrapolates_trend() {
    let values: Vec<f64> = (0..28).map(|t| 200.0 + 5.0 * t as f64).collect();
    let series = DailySeries::from_parts(series_start(), values).unwrap();

    let trained = Decomposition::weekly().train(&series).unwrap();
    let forecast = trained.forecast(2).unwrap();

    assert_approx_eq!(forecast.values()[0], 200.0 + 5.0 * 28.0, 0.5);
    assert_approx_eq!(forecast.values()[1], 200.0 + 5.0 * 29.0, 0.5);
}

#[test]
fn gradient_boost_uses_calendar_features() {
    // Fridays spike to 1000, everything else sits at 100
    let values: Vec<f64> = (0..42)
        .map(|i| {
            let date = series_start() + Duration::days(i);
            if date.weekday().num_days_from_monday() == 4 {
                1000.0
            } else {
                100.0
            }
        })
        .collect();
    let series = DailySeries::from_parts(series_start(), values).unwrap();
    let trained = GradientBoost::standard().train(&series).unwrap();

    // Day 42 after 2024-01-01 is 2024-02-12, a Monday: expect an
    // ordinary day, not a spike
    let forecast = trained.forecast(1).unwrap();
    assert!(forecast.values()[0] < 500.0);
}

#[test]
fn seasonal_models_reject_short_series() {
    let series = DailySeries::from_parts(series_start(), vec![10.0, 20.0, 15.0]).unwrap();

    assert!(matches!(
        HoltWinters::weekly().train(&series),
        Err(ForecastError::InsufficientData { needed: 14, got: 3 })
    ));
    assert!(matches!(
        Decomposition::weekly().train(&series),
        Err(ForecastError::InsufficientData { needed: 14, got: 3 })
    ));

    // The regression model has no seasonal requirement
    assert!(GradientBoost::standard().train(&series).is_ok());
}

#[test]
fn forecast_result_serializes_to_json() {
    let series = constant_series(30, 75.0);
    let trained = HoltWinters::weekly().train(&series).unwrap();
    let forecast = trained.forecast(1).unwrap();

    let json = forecast.to_json().unwrap();
    assert!(json.contains("values"));
}

#[test]
fn confidence_intervals_bracket_the_forecast() {
    let series = constant_series(30, 75.0);
    let trained = Decomposition::weekly().train(&series).unwrap();
    let forecast = trained.forecast(1).unwrap();

    let intervals = forecast.confidence_intervals(0.95).unwrap();
    assert_eq!(intervals.len(), 1);
    let (lower, upper) = intervals[0];
    assert!(lower < forecast.values()[0]);
    assert!(upper > forecast.values()[0]);

    assert!(forecast.confidence_intervals(1.5).is_err());
}

#[test]
fn model_names_identify_the_family() {
    assert!(HoltWinters::weekly().name().contains("Holt-Winters"));
    assert!(Decomposition::weekly().name().contains("Decomposition"));
    assert!(GradientBoost::standard().name().contains("GradientBoost"));
}
