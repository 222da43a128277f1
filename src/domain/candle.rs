use super::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. A day's series is ordered by `timestamp` with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Result<Self, DomainError> {
        for (name, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() {
                return Err(DomainError::NonFinitePrice(name));
            }
        }
        if low > high {
            return Err(DomainError::InvalidCandleRange { low, high });
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: volume.max(0),
        })
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// True range against the previous bar's close; plain range for the first bar.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => self
                .range()
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => self.range(),
        }
    }
}
