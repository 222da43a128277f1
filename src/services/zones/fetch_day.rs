use crate::db::clickhouse::repository::candle_repository::{CandleRepository, ProviderError};
use crate::db::postgres::repository::zone_repository::TraitZoneRepository;
use crate::domain::{Timeframe, Zone};
use crate::services::zones::ImpulseZoneExtractor;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("zone store failed: {0}")]
    Store(#[from] SqlxError),
}

/// Result of ensuring zones for one (symbol, Fetch Day) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchDayOutcome {
    /// Zones were already stored; nothing was recomputed.
    Existing(usize),
    /// A zone was extracted. `false` means an identical zone won the insert race.
    Extracted(Zone, bool),
    /// The provider returned no candles for the day.
    NoCandles,
    /// Candles were present but no zone qualified.
    NoSignal,
}

impl FetchDayOutcome {
    pub fn zones_available(&self) -> usize {
        match self {
            FetchDayOutcome::Existing(n) => *n,
            FetchDayOutcome::Extracted(..) => 1,
            FetchDayOutcome::NoCandles | FetchDayOutcome::NoSignal => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchDayOutcome::Existing(_) => "existing",
            FetchDayOutcome::Extracted(..) => "extracted",
            FetchDayOutcome::NoCandles => "no_candles",
            FetchDayOutcome::NoSignal => "no_signal",
        }
    }
}

pub struct FetchDayProcessor {
    candles: Arc<dyn CandleRepository + Send + Sync>,
    zones: Arc<dyn TraitZoneRepository + Send + Sync>,
    extractor: ImpulseZoneExtractor,
    timeframe: Timeframe,
}

impl FetchDayProcessor {
    pub fn new(
        candles: Arc<dyn CandleRepository + Send + Sync>,
        zones: Arc<dyn TraitZoneRepository + Send + Sync>,
        extractor: ImpulseZoneExtractor,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            candles,
            zones,
            extractor,
            timeframe,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Ensures zones exist for the pair, extracting from Fetch-Day candles only
    /// when the store has none.
    pub async fn process(
        &self,
        symbol: &str,
        fetch_day: NaiveDate,
    ) -> Result<FetchDayOutcome, ProcessError> {
        let stored = self.zones.get_zones(symbol, fetch_day).await?;
        if !stored.is_empty() {
            debug!("{}: {} zones already stored for {}", symbol, stored.len(), fetch_day);
            return Ok(FetchDayOutcome::Existing(stored.len()));
        }

        self.extract_and_store(symbol, fetch_day).await
    }

    /// Always runs extraction; the store ignores a zone it already holds.
    pub async fn extract_and_store(
        &self,
        symbol: &str,
        fetch_day: NaiveDate,
    ) -> Result<FetchDayOutcome, ProcessError> {
        let candles = self
            .candles
            .historical_candles(symbol, fetch_day, self.timeframe)
            .await?;

        if candles.is_empty() {
            info!("{}: no {} candles for {}", symbol, self.timeframe, fetch_day);
            return Ok(FetchDayOutcome::NoCandles);
        }

        match self.extractor.extract(&candles, symbol, fetch_day, self.timeframe) {
            Some(zone) => {
                let inserted = self.zones.insert_zone(&zone).await?;
                info!(
                    "{}: {} zone {:.2}-{:.2} ({}) for {}, inserted={}",
                    symbol,
                    zone.zone_type,
                    zone.zone_low,
                    zone.zone_high,
                    zone.impulse_strength,
                    fetch_day,
                    inserted
                );
                Ok(FetchDayOutcome::Extracted(zone, inserted))
            }
            None => {
                info!("{}: no zone in {} candles for {}", symbol, candles.len(), fetch_day);
                Ok(FetchDayOutcome::NoSignal)
            }
        }
    }

    pub async fn process_many(
        &self,
        symbols: &[String],
        fetch_day: NaiveDate,
    ) -> Vec<(String, Result<FetchDayOutcome, ProcessError>)> {
        let mut results = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let result = self.process(symbol, fetch_day).await;
            if let Err(e) = &result {
                warn!("{}: processing {} failed: {}", symbol, fetch_day, e);
            }
            results.push((symbol.clone(), result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImpulseStrength, ZoneType};
    use crate::services::test_support::{FakeCandles, InMemoryZoneStore, bullish_day};

    fn fetch_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
    }

    fn processor(
        candles: FakeCandles,
        store: Arc<InMemoryZoneStore>,
    ) -> (FetchDayProcessor, Arc<FakeCandles>) {
        let candles = Arc::new(candles);
        let processor = FetchDayProcessor::new(
            candles.clone(),
            store,
            ImpulseZoneExtractor::default(),
            Timeframe::Minute15,
        );
        (processor, candles)
    }

    #[tokio::test]
    async fn test_extracts_and_stores_zone() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(
            FakeCandles::default().with_day("RELIANCE", fetch_day(), bullish_day()),
            store.clone(),
        );

        let outcome = processor.process("RELIANCE", fetch_day()).await.unwrap();

        match outcome {
            FetchDayOutcome::Extracted(zone, inserted) => {
                assert!(inserted);
                assert_eq!(zone.zone_type, ZoneType::Bullish);
                assert_eq!(zone.impulse_strength, ImpulseStrength::High);
                assert_eq!(zone.zone_low, 99.8);
                assert_eq!(zone.zone_high, 100.5);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_zones_skip_provider() {
        let zone = Zone::new(
            "TCS",
            fetch_day(),
            Timeframe::Minute15,
            ZoneType::Bearish,
            3500.0,
            3510.0,
            ImpulseStrength::Manual,
        )
        .unwrap();
        let store = Arc::new(InMemoryZoneStore::with(vec![zone]));
        let (processor, candles) = processor(FakeCandles::default(), store);

        let outcome = processor.process("TCS", fetch_day()).await.unwrap();

        assert_eq!(outcome, FetchDayOutcome::Existing(1));
        assert!(candles.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_does_not_duplicate() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(
            FakeCandles::default().with_day("RELIANCE", fetch_day(), bullish_day()),
            store.clone(),
        );

        let first = processor.extract_and_store("RELIANCE", fetch_day()).await.unwrap();
        let second = processor.extract_and_store("RELIANCE", fetch_day()).await.unwrap();

        assert!(matches!(first, FetchDayOutcome::Extracted(_, true)));
        match second {
            FetchDayOutcome::Extracted(zone, inserted) => {
                assert!(!inserted);
                assert_eq!(zone.zone_low, 99.8);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_stored_zone_round_trips() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(
            FakeCandles::default().with_day("RELIANCE", fetch_day(), bullish_day()),
            store.clone(),
        );

        let outcome = processor.process("RELIANCE", fetch_day()).await.unwrap();
        let FetchDayOutcome::Extracted(zone, _) = outcome else {
            panic!("expected a zone");
        };
        let stored = store.get_zones("RELIANCE", fetch_day()).await.unwrap();

        assert_eq!(stored, vec![zone]);
    }

    #[tokio::test]
    async fn test_empty_day_is_no_candles() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(FakeCandles::default(), store.clone());

        let outcome = processor.process("INFY", fetch_day()).await.unwrap();

        assert_eq!(outcome, FetchDayOutcome::NoCandles);
        assert_eq!(outcome.zones_available(), 0);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_short_day_is_no_signal() {
        let store = Arc::new(InMemoryZoneStore::default());
        let short: Vec<_> = bullish_day().into_iter().take(19).collect();
        let (processor, _) = processor(
            FakeCandles::default().with_day("INFY", fetch_day(), short),
            store,
        );

        let outcome = processor.process("INFY", fetch_day()).await.unwrap();

        assert_eq!(outcome, FetchDayOutcome::NoSignal);
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error_not_no_signal() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(FakeCandles::default().failing("INFY"), store);

        let result = processor.process("INFY", fetch_day()).await;

        assert!(matches!(result, Err(ProcessError::Provider(_))));
    }

    #[tokio::test]
    async fn test_process_many_continues_after_failure() {
        let store = Arc::new(InMemoryZoneStore::default());
        let (processor, _) = processor(
            FakeCandles::default()
                .with_day("RELIANCE", fetch_day(), bullish_day())
                .failing("INFY"),
            store,
        );
        let symbols = vec!["INFY".to_string(), "RELIANCE".to_string()];

        let results = processor.process_many(&symbols, fetch_day()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "INFY");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "RELIANCE");
        assert!(matches!(results[1].1, Ok(FetchDayOutcome::Extracted(_, true))));
    }
}
