// File: src/db/clickhouse/models/candle.rs
use crate::domain::{Candle, DomainError, Timeframe};
use chrono::{DateTime, Duration, Utc};
use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// Raw 1-minute candle as stored in ClickHouse
#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct DbCandleRaw {
    pub ticker: String,
    pub time: i64,
    pub open_units: i64,
    pub open_nano: i32,
    pub high_units: i64,
    pub high_nano: i32,
    pub low_units: i64,
    pub low_nano: i32,
    pub close_units: i64,
    pub close_nano: i32,
    pub volume: i64,
}

/// Last close of a ticker
#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct DbClosePrice {
    pub ticker: String,
    pub close_units: i64,
    pub close_nano: i32,
}

impl DbClosePrice {
    pub fn price(&self) -> f64 {
        convert_price(self.close_units, self.close_nano)
    }
}

impl TryFrom<DbCandleRaw> for Candle {
    type Error = DomainError;

    fn try_from(raw: DbCandleRaw) -> Result<Self, Self::Error> {
        let timestamp = DateTime::<Utc>::from_timestamp(raw.time, 0).unwrap_or_default();
        Candle::new(
            timestamp,
            convert_price(raw.open_units, raw.open_nano),
            convert_price(raw.high_units, raw.high_nano),
            convert_price(raw.low_units, raw.low_nano),
            convert_price(raw.close_units, raw.close_nano),
            raw.volume,
        )
    }
}

/// Converts units/nano into a float price
pub fn convert_price(units: i64, nano: i32) -> f64 {
    units as f64 + (nano as f64 / 1_000_000_000.0)
}

/// Folds ascending 1-minute candles into `timeframe` buckets anchored at
/// `session_open`. Candles before the open are dropped.
pub fn resample(
    candles: &[Candle],
    timeframe: Timeframe,
    session_open: DateTime<Utc>,
) -> Vec<Candle> {
    let bucket_of = |c: &Candle| -> Option<i64> {
        let offset = (c.timestamp - session_open).num_seconds();
        if offset < 0 {
            return None;
        }
        match timeframe.minutes() {
            Some(minutes) => Some(offset / (minutes * 60)),
            None => Some(0),
        }
    };

    let mut result: Vec<Candle> = Vec::new();
    let mut current_bucket: Option<i64> = None;

    for candle in candles {
        let Some(bucket) = bucket_of(candle) else {
            continue;
        };

        if current_bucket == Some(bucket) {
            if let Some(last) = result.last_mut() {
                last.high = last.high.max(candle.high);
                last.low = last.low.min(candle.low);
                last.close = candle.close;
                last.volume += candle.volume;
                continue;
            }
        }

        let start = match timeframe.minutes() {
            Some(minutes) => session_open + Duration::minutes(bucket * minutes),
            None => session_open,
        };
        result.push(Candle {
            timestamp: start,
            ..candle.clone()
        });
        current_bucket = Some(bucket);
    }

    result
}
