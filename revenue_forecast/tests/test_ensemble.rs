use chrono::{Duration, NaiveDate};
use rstest::rstest;
use revenue_forecast::{evaluate_models, DailySeries, ForecastConfig, ModelKind};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn steady_month() -> DailySeries {
    DailySeries::from_parts(start(), vec![100.0; 30]).unwrap()
}

fn three_days() -> DailySeries {
    DailySeries::from_parts(start(), vec![100.0, 120.0, 90.0]).unwrap()
}

#[test]
fn steady_history_yields_all_three_models() {
    let ensemble = evaluate_models(&steady_month(), &ForecastConfig::default());

    assert_eq!(ensemble.len(), 3);
    assert_eq!(ensemble.models(), ModelKind::PRIORITY.to_vec());
    for forecast in ensemble.iter() {
        assert!((forecast.next_value() - 100.0).abs() < 1.0);
    }
}

// Failures are injected through the data and the horizon: short series
// starve the seasonal models, a multi-day horizon starves the regression
// model. Whatever fails, the ensemble holds exactly the complement and
// nothing escalates.
#[rstest]
#[case::none_fail(30, 1, vec![ModelKind::HoltWinters, ModelKind::Decomposition, ModelKind::GradientBoost])]
#[case::seasonal_models_fail(3, 1, vec![ModelKind::GradientBoost])]
#[case::regression_fails(30, 2, vec![ModelKind::HoltWinters, ModelKind::Decomposition])]
#[case::all_fail(3, 2, vec![])]
fn failed_models_are_omitted_without_aborting(
    #[case] days: usize,
    #[case] horizon: usize,
    #[case] expected: Vec<ModelKind>,
) {
    let series = DailySeries::from_parts(start(), vec![100.0; days]).unwrap();
    let config = ForecastConfig::with_horizon(horizon).unwrap();

    let ensemble = evaluate_models(&series, &config);
    assert_eq!(ensemble.models(), expected);
}

#[test]
fn sparse_history_still_gets_a_regression_forecast() {
    let ensemble = evaluate_models(&three_days(), &ForecastConfig::default());

    assert_eq!(ensemble.models(), vec![ModelKind::GradientBoost]);
    let forecast = ensemble.get(ModelKind::GradientBoost).unwrap();
    assert!(forecast.next_value() >= 0.0);
}

#[test]
fn forecasts_are_never_negative() {
    // Revenue declining linearly to zero: the trend-following models
    // would extrapolate below zero without the clamp
    let values: Vec<f64> = (0..30).map(|t| 290.0 - 10.0 * t as f64).collect();
    let series = DailySeries::from_parts(start(), values).unwrap();

    let ensemble = evaluate_models(&series, &ForecastConfig::default());
    assert!(!ensemble.is_empty());
    for forecast in ensemble.iter() {
        for value in &forecast.values {
            assert!(*value >= 0.0, "model {} went negative", forecast.model);
        }
    }
}

#[test]
fn empty_series_yields_empty_ensemble() {
    let ensemble = evaluate_models(&DailySeries::empty(), &ForecastConfig::default());
    assert!(ensemble.is_empty());
    assert_eq!(ensemble.len(), 0);
}

#[test]
fn all_zero_series_is_skipped_before_fitting() {
    let series = DailySeries::from_parts(start(), vec![0.0; 60]).unwrap();
    let ensemble = evaluate_models(&series, &ForecastConfig::default());
    assert!(ensemble.is_empty());
}

#[test]
fn custom_priority_changes_attempt_order() {
    let config = ForecastConfig::default()
        .with_priority(vec![ModelKind::GradientBoost, ModelKind::HoltWinters])
        .unwrap();

    let ensemble = evaluate_models(&steady_month(), &config);
    assert_eq!(
        ensemble.models(),
        vec![ModelKind::GradientBoost, ModelKind::HoltWinters]
    );
}

#[test]
fn forecast_dates_are_contiguous_after_history() {
    let config = ForecastConfig::with_horizon(3).unwrap();
    let ensemble = evaluate_models(&steady_month(), &config);

    let first_forecast_day = start() + Duration::days(30);
    for forecast in ensemble.iter() {
        for (offset, date) in forecast.dates.iter().enumerate() {
            assert_eq!(*date, first_forecast_day + Duration::days(offset as i64));
        }
    }
}
