//! CSV tick feed with precomputed indicator readings.
//!
//! Columns: `timestamp,close,reference_ma,di_plus,di_minus,adx_rating,bar_close`.
//! Empty indicator cells mean the reading is missing for that row. `bar_close`
//! marks the tick that completes a bar.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::{IndicatorReading, PriceReading};

/// Accepted timestamp layouts.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors from loading a tick feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: timestamp {now} is before the previous row")]
    OutOfOrder { row: usize, now: NaiveDateTime },
}

#[derive(Debug, Deserialize)]
struct RawTick {
    timestamp: String,
    close: f64,
    reference_ma: Option<f64>,
    di_plus: Option<f64>,
    di_minus: Option<f64>,
    adx_rating: Option<f64>,
    bar_close: Option<bool>,
}

/// One tick of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub now: NaiveDateTime,
    pub close: f64,
    pub reference_ma: Option<f64>,
    pub indicator: Option<IndicatorReading>,
    pub bar_close: bool,
}

impl TickRecord {
    pub fn price_reading(&self) -> Option<PriceReading> {
        self.reference_ma.map(|ma| PriceReading::new(self.close, ma))
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

/// Load a feed from a CSV file.
pub fn load_ticks(path: &Path) -> Result<Vec<TickRecord>, FeedError> {
    let reader = csv::Reader::from_path(path)?;
    collect_ticks(reader)
}

/// Read a feed from any CSV source with a header row.
pub fn read_ticks<R: Read>(source: R) -> Result<Vec<TickRecord>, FeedError> {
    collect_ticks(csv::Reader::from_reader(source))
}

fn collect_ticks<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<TickRecord>, FeedError> {
    let mut ticks: Vec<TickRecord> = Vec::new();
    for (index, result) in reader.deserialize::<RawTick>().enumerate() {
        let raw = result?;
        let row = index + 1;
        let now = parse_timestamp(&raw.timestamp).ok_or_else(|| FeedError::Timestamp {
            row,
            value: raw.timestamp.clone(),
        })?;
        if ticks.last().is_some_and(|prev| now < prev.now) {
            return Err(FeedError::OutOfOrder { row, now });
        }

        let indicator = match (raw.di_plus, raw.di_minus, raw.adx_rating) {
            (Some(p), Some(m), Some(a)) => Some(IndicatorReading::new(p, m, a)),
            _ => None,
        };
        ticks.push(TickRecord {
            now,
            close: raw.close,
            reference_ma: raw.reference_ma,
            indicator,
            bar_close: raw.bar_close.unwrap_or(false),
        });
    }
    Ok(ticks)
}
