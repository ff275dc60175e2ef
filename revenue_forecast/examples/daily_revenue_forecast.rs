use chrono::{Duration, NaiveDate};
use revenue_forecast::{evaluate_models, publish_next_day, DailySeries, DealRecord, ForecastConfig,
    ForecastSink, PublishedForecast};

/// Prints the forecast instead of writing to a warehouse
struct ConsoleSink;

impl ForecastSink for ConsoleSink {
    fn publish(&mut self, forecast: &PublishedForecast) -> revenue_forecast::Result<()> {
        println!(
            "Would publish: {} forecasts {:.2} for {}",
            forecast.model, forecast.value, forecast.date
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Revenue Forecast: Daily Forecasting Example");
    println!("===========================================\n");

    // Six weeks of synthetic won deals: quieter weekends, busy midweek
    println!("Building the daily series...");
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut records = Vec::new();
    for day in 0..42i64 {
        let date = start + Duration::days(day);
        let value = match day % 7 {
            5 | 6 => 40.0,
            2 | 3 => 160.0,
            _ => 100.0,
        };
        let won_time = date.and_hms_opt(14, 30, 0);
        records.push(DealRecord::new(won_time, value));
    }

    let series = DailySeries::from_records(&records);
    println!(
        "Series covers {} days, {:.2} total revenue\n",
        series.len(),
        series.total()
    );

    // Fit the ensemble
    println!("Evaluating models...");
    let config = ForecastConfig::default();
    let ensemble = evaluate_models(&series, &config);
    for forecast in ensemble.iter() {
        println!(
            "  {} -> {:.2} on {}",
            forecast.model,
            forecast.next_value(),
            forecast.next_date()
        );
    }

    // Select and "publish"
    println!("\nSelecting and publishing...");
    let ingestion_date = series.last_date().unwrap();
    let published = publish_next_day(&ensemble, ingestion_date, &config, &mut ConsoleSink)?;

    match published {
        Some(forecast) => println!("\nDone: {} chosen", forecast.model),
        None => println!("\nNo forecast could be produced"),
    }

    Ok(())
}
