//! Orchestration of one daily ETL-and-forecast run

use chrono::NaiveDate;
use revenue_forecast::{
    evaluate_models, publish_next_day, DailySeries, DealHistorySource, PublishedForecast,
};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract;
use crate::warehouse::DealWarehouse;

/// What one run did, for callers and tests
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Rows appended to staging
    pub staged_rows: usize,
    /// Qualifying historical records after the merge
    pub history_rows: usize,
    /// Days covered by the assembled series
    pub series_days: usize,
    /// The published forecast, if any model succeeded
    pub published: Option<PublishedForecast>,
}

/// Run the full pipeline for one ingestion date: extract → staging →
/// procedures → forecast → publish.
///
/// Completes `Ok` with `published: None` when no forecast was possible
/// (missing data, every model failed); fails on I/O, warehouse or
/// publish errors.
pub fn run_etl(config: &PipelineConfig, ingestion_date: NaiveDate) -> Result<RunReport> {
    let extract_path = config.extract_path(ingestion_date);
    info!(path = %extract_path.display(), "loading daily extract");
    let rows = extract::load_extract(&extract_path)?;
    let won_in_batch = rows
        .iter()
        .filter(|row| row.to_deal_record().qualifies())
        .count();
    info!(
        rows = rows.len(),
        won_deals = won_in_batch,
        "extract loaded"
    );

    let mut warehouse = DealWarehouse::open(&config.database_path)?;
    let staged_rows = warehouse.load_staging(&rows, ingestion_date)?;
    info!(rows = staged_rows, date = %ingestion_date, "staged extract rows");

    for procedure in &config.procedures {
        info!(procedure = procedure.as_str(), "running procedure");
        warehouse.run_procedure(procedure, ingestion_date)?;
    }

    // The fact table is keyed by deal, so after update_fact_deals the
    // history already contains today's batch exactly once
    let history = warehouse.won_deal_history()?;
    info!(records = history.len(), "loaded won-deal history");

    let series = DailySeries::from_records(&history);
    if series.is_empty() {
        info!("no qualifying deal records, skipping forecasting");
    } else {
        info!(
            days = series.len(),
            total = series.total(),
            "assembled daily revenue series"
        );
    }

    let ensemble = evaluate_models(&series, &config.forecast);
    let published = publish_next_day(
        &ensemble,
        ingestion_date,
        &config.forecast,
        &mut warehouse,
    )?;

    Ok(RunReport {
        staged_rows,
        history_rows: history.len(),
        series_days: series.len(),
        published,
    })
}
