// In-memory doubles of the candle provider and zone store, plus candle fixtures.
use crate::db::clickhouse::repository::candle_repository::{CandleRepository, ProviderError};
use crate::db::postgres::repository::zone_repository::TraitZoneRepository;
use crate::domain::{Candle, Timeframe, Zone};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::Error as SqlxError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// 2026-01-27 09:15 IST
pub const SESSION_START: i64 = 1_769_485_500;

pub fn series(rows: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let start = DateTime::<Utc>::from_timestamp(SESSION_START, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| {
            Candle::new(start + Duration::minutes(15 * i as i64), o, h, l, c, 1_000).unwrap()
        })
        .collect()
}

/// Quiet drift, two-candle base at 99.8-100.5, five-candle rally, flat top.
/// Extracts to a HIGH bullish zone, impulse candles 9..16.
pub fn bullish_day() -> Vec<Candle> {
    let mut rows = Vec::new();
    for _ in 0..3 {
        rows.push((100.5, 100.8, 100.2, 100.6));
        rows.push((100.6, 100.9, 100.3, 100.5));
    }
    rows.extend([
        (100.5, 100.7, 100.1, 100.3),
        (100.3, 100.5, 99.9, 100.1),
        (100.1, 100.3, 99.8, 100.2),
        (100.2, 100.4, 99.9, 100.0),
        (100.0, 101.6, 99.95, 101.5),
        (101.5, 103.1, 101.4, 103.0),
        (103.0, 104.6, 102.9, 104.5),
        (104.5, 106.1, 104.4, 106.0),
        (106.0, 107.6, 105.9, 107.5),
    ]);
    for k in 0..15 {
        rows.push(if k % 2 == 0 {
            (107.5, 107.8, 107.2, 107.4)
        } else {
            (107.4, 107.7, 107.1, 107.6)
        });
    }
    series(&rows)
}

#[derive(Default)]
pub struct FakeCandles {
    pub candles: HashMap<(String, NaiveDate), Vec<Candle>>,
    pub live: HashMap<String, f64>,
    pub closes: HashMap<(String, NaiveDate), f64>,
    pub failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCandles {
    pub fn with_day(mut self, symbol: &str, date: NaiveDate, candles: Vec<Candle>) -> Self {
        self.candles.insert((symbol.to_string(), date), candles);
        self
    }

    pub fn with_live(mut self, symbol: &str, price: f64) -> Self {
        self.live.insert(symbol.to_string(), price);
        self
    }

    pub fn with_close(mut self, symbol: &str, date: NaiveDate, price: f64) -> Self {
        self.closes.insert((symbol.to_string(), date), price);
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandleRepository for FakeCandles {
    async fn historical_candles(
        &self,
        symbol: &str,
        date: NaiveDate,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, ProviderError> {
        self.calls.lock().unwrap().push(format!("candles:{}:{}", symbol, date));
        if self.failing.contains(symbol) {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(self
            .candles
            .get(&(symbol.to_string(), date))
            .cloned()
            .unwrap_or_default())
    }

    async fn current_prices(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.calls.lock().unwrap().push("live".to_string());
        Ok(symbols
            .iter()
            .filter_map(|s| self.live.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }

    async fn closing_prices(
        &self,
        symbols: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.calls.lock().unwrap().push(format!("closes:{}", date));
        Ok(symbols
            .iter()
            .filter_map(|s| self.closes.get(&(s.clone(), date)).map(|p| (s.clone(), *p)))
            .collect())
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Mirrors the PostgreSQL store: identity-key de-duplication and
/// (zone_type, zone_low) ordering on read.
#[derive(Default)]
pub struct InMemoryZoneStore {
    pub zones: Mutex<Vec<Zone>>,
}

impl InMemoryZoneStore {
    pub fn with(zones: Vec<Zone>) -> Self {
        Self {
            zones: Mutex::new(zones),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.lock().unwrap().len()
    }
}

/// Same key as the `zones` unique constraint.
fn same_identity(a: &Zone, b: &Zone) -> bool {
    a.symbol == b.symbol
        && a.fetch_date == b.fetch_date
        && a.timeframe == b.timeframe
        && a.zone_type == b.zone_type
        && a.zone_low == b.zone_low
        && a.zone_high == b.zone_high
}

#[async_trait]
impl TraitZoneRepository for InMemoryZoneStore {
    async fn get_zones(&self, symbol: &str, fetch_date: NaiveDate) -> Result<Vec<Zone>, SqlxError> {
        let mut found: Vec<Zone> = self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.symbol == symbol && z.fetch_date == fetch_date)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.zone_type
                .as_str()
                .cmp(b.zone_type.as_str())
                .then(a.zone_low.total_cmp(&b.zone_low))
        });
        Ok(found)
    }

    async fn insert_zone(&self, zone: &Zone) -> Result<bool, SqlxError> {
        let mut zones = self.zones.lock().unwrap();
        if zones.iter().any(|z| same_identity(z, zone)) {
            return Ok(false);
        }
        zones.push(zone.clone());
        Ok(true)
    }

    async fn replace_zones(
        &self,
        symbol: &str,
        fetch_date: NaiveDate,
        zone: &Zone,
    ) -> Result<bool, SqlxError> {
        let mut zones = self.zones.lock().unwrap();
        zones.retain(|z| !(z.symbol == symbol && z.fetch_date == fetch_date));
        zones.push(zone.clone());
        Ok(true)
    }
}
