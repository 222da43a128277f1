// File: src/db/clickhouse/repository/candle_repository.rs
use crate::db::clickhouse::connection::ClickhouseConnection;
use crate::db::clickhouse::models::candle::{DbCandleRaw, DbClosePrice, resample};
use crate::domain::{Candle, Timeframe};
use crate::env_config::models::app_config::MarketConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Market data failures. An empty result is `Ok(vec![])`, never an error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("market data provider unavailable: {0}")]
    Unavailable(String),
}

impl From<clickhouse::error::Error> for ProviderError {
    fn from(e: clickhouse::error::Error) -> Self {
        ProviderError::Unavailable(e.to_string())
    }
}

#[async_trait]
pub trait CandleRepository {
    /// Candles of one exchange session, resampled to `timeframe`, ascending
    async fn historical_candles(
        &self,
        symbol: &str,
        date: NaiveDate,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, ProviderError>;

    /// Latest known close per symbol; symbols without data are absent
    async fn current_prices(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ProviderError>;

    /// Last close of each symbol within the session of `date`
    async fn closing_prices(
        &self,
        symbols: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, f64>, ProviderError>;

    async fn ping(&self) -> Result<(), ProviderError>;
}

pub struct ClickhouseCandleRepository {
    connection: Arc<ClickhouseConnection>,
    market: MarketConfig,
}

impl ClickhouseCandleRepository {
    pub fn new(connection: Arc<ClickhouseConnection>, market: MarketConfig) -> Self {
        Self { connection, market }
    }

    async fn last_closes(
        &self,
        symbols: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let client = self.connection.get_client();
        let query = format!(
            "SELECT
                ticker,
                argMax(close_units, time) AS close_units,
                argMax(close_nano, time) AS close_nano
            FROM {}
            WHERE has(?, ticker) AND time >= ? AND time < ?
            GROUP BY ticker",
            self.market.candles_table
        );

        let rows = client
            .query(&query)
            .bind(symbols)
            .bind(from.timestamp())
            .bind(to.timestamp())
            .fetch_all::<DbClosePrice>()
            .await
            .map_err(|e| {
                error!("Failed to fetch closes for {:?}: {}", symbols, e);
                ProviderError::from(e)
            })?;

        let prices: HashMap<String, f64> = rows
            .into_iter()
            .map(|row| (row.ticker.clone(), row.price()))
            .collect();

        debug!("Fetched {} closes for {} symbols", prices.len(), symbols.len());
        Ok(prices)
    }
}

#[async_trait]
impl CandleRepository for ClickhouseCandleRepository {
    async fn historical_candles(
        &self,
        symbol: &str,
        date: NaiveDate,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, ProviderError> {
        let client = self.connection.get_client();
        let (session_open, session_close) = self.market.session_bounds(date);

        let query = format!(
            "SELECT
                ticker,
                time,
                open_units,
                open_nano,
                high_units,
                high_nano,
                low_units,
                low_nano,
                close_units,
                close_nano,
                volume
            FROM {}
            WHERE ticker = ? AND time >= ? AND time < ?
            ORDER BY time ASC",
            self.market.candles_table
        );

        debug!(
            "Fetching candles for {} on {} ({} to {})",
            symbol, date, session_open, session_close
        );

        let raw = client
            .query(&query)
            .bind(symbol)
            .bind(session_open.timestamp())
            .bind(session_close.timestamp())
            .fetch_all::<DbCandleRaw>()
            .await?;

        let fetched = raw.len();
        let minutes: Vec<Candle> = raw
            .into_iter()
            .filter_map(|row| {
                let time = row.time;
                match Candle::try_from(row) {
                    Ok(candle) => Some(candle),
                    Err(e) => {
                        warn!("Skipping bad candle for {} at {}: {}", symbol, time, e);
                        None
                    }
                }
            })
            .collect();

        let candles = resample(&minutes, timeframe, session_open);

        info!(
            "Fetched {} minute candles for {} on {}, {} {} candles",
            fetched,
            symbol,
            date,
            candles.len(),
            timeframe
        );

        Ok(candles)
    }

    async fn current_prices(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let to = Utc::now();
        // Seven days covers the longest exchange closure
        let from = to - chrono::Duration::days(7);
        self.last_closes(symbols, from, to).await
    }

    async fn closing_prices(
        &self,
        symbols: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let (open, close) = self.market.session_bounds(date);
        self.last_closes(symbols, open, close).await
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let client = self.connection.get_client();
        client.query("SELECT 1").execute().await?;
        Ok(())
    }
}
