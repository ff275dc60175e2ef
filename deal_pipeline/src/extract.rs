//! Daily extract ingestion
//!
//! Reads the dated `Before_<date>.csv` extract. Timestamp columns that
//! fail to parse become `None` rather than errors, matching the lenient
//! coercion the upstream export needs.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use revenue_forecast::DealRecord;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// One row of the daily extract
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRow {
    pub deal_id: i64,
    pub deal_created_date: Option<NaiveDateTime>,
    pub won_time: Option<NaiveDateTime>,
    pub deal_value: f64,
    pub owner: Option<String>,
    pub product: Option<String>,
    pub organization: Option<String>,
    pub status: Option<String>,
}

/// Raw CSV row with the export's column headers
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Deal_ID")]
    deal_id: i64,
    #[serde(rename = "Deal_Created_Date")]
    deal_created_date: Option<String>,
    #[serde(rename = "Won_Time")]
    won_time: Option<String>,
    #[serde(rename = "Deal_Value")]
    deal_value: Option<f64>,
    #[serde(rename = "Owner")]
    owner: Option<String>,
    #[serde(rename = "Product")]
    product: Option<String>,
    #[serde(rename = "Organization")]
    organization: Option<String>,
    #[serde(rename = "Deal_Status")]
    status: Option<String>,
}

/// Parse an extract timestamp, accepting datetime and date-only forms.
/// Anything unparseable is coerced to `None`.
fn parse_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn normalize(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl ExtractRow {
    fn from_raw(raw: RawRow) -> Self {
        Self {
            deal_id: raw.deal_id,
            deal_created_date: parse_timestamp(raw.deal_created_date.as_deref()),
            won_time: parse_timestamp(raw.won_time.as_deref()),
            deal_value: raw.deal_value.unwrap_or(0.0),
            owner: normalize(raw.owner),
            product: normalize(raw.product),
            organization: normalize(raw.organization),
            status: normalize(raw.status),
        }
    }

    /// View of the row as a deal record for the forecasting core
    pub fn to_deal_record(&self) -> DealRecord {
        DealRecord::new(self.won_time, self.deal_value)
    }
}

/// Load the extract file at `path`.
///
/// A missing file is a typed, fatal error: the run was invoked for a day
/// whose extract never arrived.
pub fn load_extract(path: &Path) -> Result<Vec<ExtractRow>> {
    if !path.exists() {
        return Err(PipelineError::ExtractMissing {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for raw in reader.deserialize::<RawRow>() {
        rows.push(ExtractRow::from_raw(raw?));
    }

    Ok(rows)
}
