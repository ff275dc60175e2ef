//! Embedded `DuckDB` warehouse: staging, dimensional procedures, deal
//! history and the single current-forecast slot

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use duckdb::{Connection, ToSql};
use revenue_forecast::{
    DealHistorySource, DealRecord, ForecastError, ForecastSink, PublishedForecast,
};

use crate::error::{PipelineError, Result};
use crate::extract::ExtractRow;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "0001_core_tables",
    sql: r#"
CREATE TABLE IF NOT EXISTS staging_deals (
    staging_raw_id BIGINT NOT NULL,
    deal_id BIGINT NOT NULL,
    deal_created_date TIMESTAMP,
    won_time TIMESTAMP,
    deal_value DOUBLE NOT NULL,
    owner TEXT,
    product TEXT,
    organization TEXT,
    status TEXT,
    ingestion_date DATE NOT NULL
);

CREATE TABLE IF NOT EXISTS dim_owners (
    owner_name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dim_products (
    product_name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dim_organizations (
    organization_name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dim_deal_status (
    status_name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dim_date (
    date_day DATE PRIMARY KEY,
    day_of_month INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day_of_week INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS fact_deals (
    deal_id BIGINT PRIMARY KEY,
    deal_created_date TIMESTAMP,
    won_time TIMESTAMP,
    deal_value DOUBLE NOT NULL,
    owner TEXT,
    product TEXT,
    organization TEXT,
    status TEXT,
    ingestion_date DATE NOT NULL
);

CREATE TABLE IF NOT EXISTS current_forecast (
    slot_id INTEGER PRIMARY KEY,
    forecast_date DATE NOT NULL,
    forecast_value DOUBLE NOT NULL,
    model_name TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
}];

/// Transformation procedures in their required execution order
pub const PROCEDURE_ORDER: [&str; 6] = [
    "update_dim_owners",
    "update_dim_products",
    "update_dim_organizations",
    "update_dim_deal_status",
    "update_dim_date",
    "update_fact_deals",
];

/// Named transformation statements. Each takes the ingestion date as its
/// single parameter.
const PROCEDURES: &[(&str, &str)] = &[
    (
        "update_dim_owners",
        "INSERT OR IGNORE INTO dim_owners \
         SELECT DISTINCT owner FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) AND owner IS NOT NULL",
    ),
    (
        "update_dim_products",
        "INSERT OR IGNORE INTO dim_products \
         SELECT DISTINCT product FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) AND product IS NOT NULL",
    ),
    (
        "update_dim_organizations",
        "INSERT OR IGNORE INTO dim_organizations \
         SELECT DISTINCT organization FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) AND organization IS NOT NULL",
    ),
    (
        "update_dim_deal_status",
        "INSERT OR IGNORE INTO dim_deal_status \
         SELECT DISTINCT status FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) AND status IS NOT NULL",
    ),
    (
        "update_dim_date",
        "INSERT OR IGNORE INTO dim_date \
         SELECT DISTINCT CAST(won_time AS DATE), \
                CAST(EXTRACT(day FROM won_time) AS INTEGER), \
                CAST(EXTRACT(month FROM won_time) AS INTEGER), \
                CAST(EXTRACT(isodow FROM won_time) - 1 AS INTEGER) \
         FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) AND won_time IS NOT NULL",
    ),
    (
        "update_fact_deals",
        "INSERT OR REPLACE INTO fact_deals \
         SELECT deal_id, deal_created_date, won_time, deal_value, \
                owner, product, organization, status, ingestion_date \
         FROM staging_deals \
         WHERE ingestion_date = TRY_CAST(? AS DATE) \
         QUALIFY row_number() OVER (PARTITION BY deal_id ORDER BY staging_raw_id DESC) = 1",
    ),
];

/// The forecast currently stored in the single slot
#[derive(Debug, Clone, PartialEq)]
pub struct StoredForecast {
    pub forecast_date: NaiveDate,
    pub forecast_value: f64,
    pub model_name: String,
}

/// The deal warehouse over one embedded `DuckDB` connection.
///
/// The pipeline is single-threaded, so a single connection is enough; no
/// pooling.
pub struct DealWarehouse {
    connection: Connection,
}

impl DealWarehouse {
    /// Open (or create) the warehouse database file and apply the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let warehouse = Self {
            connection: Connection::open(path)?,
        };
        warehouse.apply_migrations()?;
        Ok(warehouse)
    }

    /// Open an in-memory warehouse (tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let warehouse = Self {
            connection: Connection::open_in_memory()?,
        };
        warehouse.apply_migrations()?;
        Ok(warehouse)
    }

    fn apply_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            self.connection.execute_batch(migration.sql)?;
            let params: [&dyn ToSql; 1] = [&migration.version];
            self.connection.execute(
                "INSERT OR IGNORE INTO schema_migrations (version) VALUES (?)",
                params.as_slice(),
            )?;
        }
        Ok(())
    }

    /// Append one extract batch to the staging table.
    ///
    /// `staging_raw_id` restarts at 1 for every batch, mirroring the
    /// upstream export numbering. Returns the number of rows staged.
    pub fn load_staging(&self, rows: &[ExtractRow], ingestion_date: NaiveDate) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let date_text = ingestion_date.format("%Y-%m-%d").to_string();
        self.connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize> {
            for (index, row) in rows.iter().enumerate() {
                let raw_id = index as i64 + 1;
                let created = row.deal_created_date.map(timestamp_text);
                let won = row.won_time.map(timestamp_text);
                let params: [&dyn ToSql; 10] = [
                    &raw_id,
                    &row.deal_id,
                    &created,
                    &won,
                    &row.deal_value,
                    &row.owner,
                    &row.product,
                    &row.organization,
                    &row.status,
                    &date_text,
                ];
                self.connection.execute(
                    "INSERT INTO staging_deals \
                     (staging_raw_id, deal_id, deal_created_date, won_time, deal_value, \
                      owner, product, organization, status, ingestion_date) \
                     VALUES (?, ?, TRY_CAST(? AS TIMESTAMP), TRY_CAST(? AS TIMESTAMP), ?, \
                             ?, ?, ?, ?, TRY_CAST(? AS DATE))",
                    params.as_slice(),
                )?;
            }
            Ok(rows.len())
        })();

        self.finalize_transaction(result)
    }

    /// Execute one named transformation procedure for an ingestion date
    pub fn run_procedure(&self, name: &str, ingestion_date: NaiveDate) -> Result<()> {
        let sql = PROCEDURES
            .iter()
            .find(|(procedure, _)| *procedure == name)
            .map(|(_, sql)| *sql)
            .ok_or_else(|| PipelineError::UnknownProcedure(name.to_string()))?;

        let date_text = ingestion_date.format("%Y-%m-%d").to_string();
        let params: [&dyn ToSql; 1] = [&date_text];
        self.connection.execute(sql, params.as_slice())?;
        Ok(())
    }

    /// Read back the current forecast slot, if one has been published
    pub fn current_forecast(&self) -> Result<Option<StoredForecast>> {
        let mut statement = self.connection.prepare(
            "SELECT strftime(forecast_date, '%Y-%m-%d'), forecast_value, model_name \
             FROM current_forecast WHERE slot_id = 0",
        )?;
        let mut rows = statement.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        match rows.next() {
            Some(row) => {
                let (date_text, forecast_value, model_name) = row?;
                let forecast_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
                    .map_err(|e| PipelineError::WarehouseData(e.to_string()))?;
                Ok(Some(StoredForecast {
                    forecast_date,
                    forecast_value,
                    model_name,
                }))
            }
            None => Ok(None),
        }
    }

    fn finalize_transaction<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.connection.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(error) => {
                let _ = self.connection.execute_batch("ROLLBACK");
                Err(error)
            }
        }
    }
}

fn timestamp_text(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl DealHistorySource for DealWarehouse {
    fn won_deal_history(&self) -> revenue_forecast::Result<Vec<DealRecord>> {
        let fetch = || -> Result<Vec<DealRecord>> {
            let mut statement = self.connection.prepare(
                "SELECT strftime(won_time, '%Y-%m-%d %H:%M:%S'), deal_value \
                 FROM fact_deals \
                 WHERE won_time IS NOT NULL AND deal_value > 0 \
                 ORDER BY won_time",
            )?;
            let rows = statement.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (won_text, deal_value) = row?;
                let won_time =
                    NaiveDateTime::parse_from_str(&won_text, "%Y-%m-%d %H:%M:%S").ok();
                records.push(DealRecord::new(won_time, deal_value));
            }
            Ok(records)
        };

        fetch().map_err(|e| ForecastError::DataError(e.to_string()))
    }
}

impl ForecastSink for DealWarehouse {
    /// Overwrite the single forecast slot. `INSERT OR REPLACE` on the
    /// fixed key makes retries idempotent.
    fn publish(&mut self, forecast: &PublishedForecast) -> revenue_forecast::Result<()> {
        let date_text = forecast.date.format("%Y-%m-%d").to_string();
        let model_name = forecast.model.as_str().to_string();
        let params: [&dyn ToSql; 3] = [&date_text, &forecast.value, &model_name];
        self.connection
            .execute(
                "INSERT OR REPLACE INTO current_forecast \
                 (slot_id, forecast_date, forecast_value, model_name, updated_at) \
                 VALUES (0, TRY_CAST(? AS DATE), ?, ?, CURRENT_TIMESTAMP)",
                params.as_slice(),
            )
            .map_err(|e| ForecastError::PublishFailed(e.to_string()))?;
        Ok(())
    }
}
