//! Deal records and the gap-filled daily revenue series built from them

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// One transactional deal event: a close timestamp and a monetary value.
///
/// Records with a missing `won_time` or a non-positive `deal_value` never
/// contribute to the daily series; they are filtered out during assembly
/// rather than rejected as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    /// When the deal was won, if it was won at all
    pub won_time: Option<NaiveDateTime>,
    /// Monetary value of the deal
    pub deal_value: f64,
}

impl DealRecord {
    /// Create a new deal record
    pub fn new(won_time: Option<NaiveDateTime>, deal_value: f64) -> Self {
        Self {
            won_time,
            deal_value,
        }
    }

    /// Whether this record contributes to the revenue series
    pub fn qualifies(&self) -> bool {
        self.won_time.is_some() && self.deal_value > 0.0 && self.deal_value.is_finite()
    }
}

/// Source of persisted historical deal records.
///
/// Implemented by the warehouse layer; the forecasting core only sees the
/// resulting record collection.
pub trait DealHistorySource {
    /// All persisted deals with a non-null won time and a positive value
    fn won_deal_history(&self) -> Result<Vec<DealRecord>>;
}

/// A calendar-date-indexed, gap-filled aggregation of deal values.
///
/// The series is stored as a start date plus one value per day, so the
/// no-gaps invariant holds by construction: day `i` of `values` is
/// `start + i` days, every day between the first and last observed date
/// is present, and days without deals carry 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    start: Option<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// The empty series: no qualifying records were available.
    ///
    /// This is a normal outcome ("no forecast possible"), not an error.
    pub fn empty() -> Self {
        Self {
            start: None,
            values: Vec::new(),
        }
    }

    /// Build the daily series from a collection of deal records.
    ///
    /// Records with a missing won time or non-positive value are dropped,
    /// survivors are summed per calendar day, and the result is reindexed
    /// to a contiguous daily calendar between the minimum and maximum
    /// observed date with 0 on days that saw no deals.
    pub fn from_records(records: &[DealRecord]) -> Self {
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records.iter().filter(|r| r.qualifies()) {
            if let Some(won_time) = record.won_time {
                *by_day.entry(won_time.date()).or_insert(0.0) += record.deal_value;
            }
        }

        let (Some((&first, _)), Some((&last, _))) =
            (by_day.first_key_value(), by_day.last_key_value())
        else {
            return Self::empty();
        };

        let span = (last - first).num_days() as usize + 1;
        let mut values = vec![0.0; span];
        for (date, value) in &by_day {
            let offset = (*date - first).num_days() as usize;
            values[offset] = *value;
        }

        Self {
            start: Some(first),
            values,
        }
    }

    /// Build a series directly from a start date and per-day values.
    ///
    /// Days are consecutive starting at `start`. Values must be
    /// non-negative; an empty value vector is rejected (use
    /// [`DailySeries::empty`] for the no-data case).
    pub fn from_parts(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::DataError(
                "series values must not be empty; use DailySeries::empty for no data".to_string(),
            ));
        }
        if values.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(ForecastError::DataError(
                "series values must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self {
            start: Some(start),
            values,
        })
    }

    /// Number of days covered by the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no days at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First covered date, if any
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Last covered date, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.start
            .map(|start| start + Duration::days(self.values.len() as i64 - 1))
    }

    /// Aggregated value for one calendar day, if the day is covered
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        let start = self.start?;
        let offset = (date - start).num_days();
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied()
    }

    /// Per-day values in date order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Covered dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        match self.start {
            Some(start) => (0..self.values.len() as i64)
                .map(|offset| start + Duration::days(offset))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Sum of all daily values.
    ///
    /// A total of 0 on a non-empty series is the low-confidence condition:
    /// forecasting can proceed but every model will predict ~0.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, value: f64) -> DealRecord {
        let won_time = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").ok();
        DealRecord::new(won_time, value)
    }

    #[test]
    fn aggregates_by_calendar_day() {
        let records = vec![
            record("2024-03-01 09:30:00", 100.0),
            record("2024-03-01 17:45:00", 50.0),
            record("2024-03-02 08:00:00", 25.0),
        ];

        let series = DailySeries::from_records(&records);
        assert_eq!(series.len(), 2);
        let day_one = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(series.value_on(day_one), Some(150.0));
    }

    #[test]
    fn fills_gaps_with_zero() {
        let records = vec![
            record("2024-03-01 12:00:00", 10.0),
            record("2024-03-05 12:00:00", 20.0),
        ];

        let series = DailySeries::from_records(&records);
        assert_eq!(series.len(), 5);
        assert_eq!(series.values(), &[10.0, 0.0, 0.0, 0.0, 20.0]);
    }

    #[test]
    fn drops_unqualified_records() {
        let records = vec![
            DealRecord::new(None, 500.0),
            record("2024-03-01 12:00:00", 0.0),
            record("2024-03-01 12:00:00", -3.5),
        ];

        let series = DailySeries::from_records(&records);
        assert!(series.is_empty());
        assert_eq!(series.start_date(), None);
    }

    #[test]
    fn from_parts_rejects_negative_values() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DailySeries::from_parts(start, vec![1.0, -1.0]).is_err());
        assert!(DailySeries::from_parts(start, Vec::new()).is_err());
    }
}
