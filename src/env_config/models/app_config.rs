use crate::domain::timeframe::Timeframe;
use crate::logger::config::LogFormat;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub clickhouse: ClickhouseConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub zones: ZonesConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    pub zone_warmup: ZoneWarmupConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize)]
pub struct ClickhouseConfig {
    pub timeout: u64,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub timeout: u64,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
}

/// Zone extraction and proximity parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    pub timeframe: Timeframe,
    /// Minimum impulse size, in ATRs
    pub atr_multiplier: f64,
    pub zone_candles_min: usize,
    pub zone_candles_max: usize,
    /// NEAR threshold, in percent of the zone midpoint
    pub near_zone_percent: f64,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Minute15,
            atr_multiplier: 1.5,
            zone_candles_min: 2,
            zone_candles_max: 6,
            near_zone_percent: 0.5,
        }
    }
}

/// Exchange session description used to cut a day out of the 1-minute candle table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub utc_offset_minutes: i32,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
    pub candles_table: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            session_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            session_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            candles_table: "market_data.candles_1min".to_string(),
        }
    }
}

impl MarketConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Today's date on the exchange clock.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }

    /// UTC instants of the session open and close on `date`.
    pub fn session_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let shift = Duration::minutes(i64::from(self.utc_offset_minutes));
        let open = (date.and_time(self.session_open) - shift).and_utc();
        let close = (date.and_time(self.session_close) - shift).and_utc();
        (open, close)
    }
}

/// Market holidays keyed by year ("2026" = ["2026-01-26", ...]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub holidays: BTreeMap<String, Vec<NaiveDate>>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneWarmupConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    #[serde(default)]
    pub start_time: Option<String>, // UTC, "HH:MM:SS"
    #[serde(default)]
    pub end_time: Option<String>, // UTC, "HH:MM:SS"
}

impl ZoneWarmupConfig {
    /// Checks if the current time is within the allowed operation window
    pub fn is_operation_allowed(&self) -> bool {
        self.is_operation_allowed_at(Utc::now().time())
    }

    pub fn is_operation_allowed_at(&self, now: NaiveTime) -> bool {
        // If no time window is configured, always allow operation
        let (Some(start_str), Some(end_str)) = (&self.start_time, &self.end_time) else {
            return true;
        };

        if let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(start_str, "%H:%M:%S"),
            NaiveTime::parse_from_str(end_str, "%H:%M:%S"),
        ) {
            if start <= end {
                return start <= now && now <= end;
            } else {
                // Window crosses midnight, e.g. start=21:00:00, end=04:00:00
                return start <= now || now <= end;
            }
        }

        // If parsing fails, default to allowing operation
        true
    }
}
