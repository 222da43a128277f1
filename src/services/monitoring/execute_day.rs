use crate::db::clickhouse::repository::candle_repository::{CandleRepository, ProviderError};
use crate::db::postgres::repository::zone_repository::TraitZoneRepository;
use crate::domain::{MonitoringRecord, MonitoringReport};
use crate::services::calendar::{CalendarError, TradingCalendar, trading_calendar::parse_date};
use crate::services::monitoring::ProximityClassifier;
use crate::services::zones::FetchDayProcessor;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Validation(#[from] CalendarError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("zone store failed: {0}")]
    Store(#[from] SqlxError),
}

/// Trims, upper-cases, drops empties and removes repeats keeping first-seen order.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = Vec::with_capacity(symbols.len());
    for s in symbols {
        let symbol = s.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen
}

pub struct ExecuteDayMonitor {
    calendar: Arc<TradingCalendar>,
    processor: Arc<FetchDayProcessor>,
    candles: Arc<dyn CandleRepository + Send + Sync>,
    zones: Arc<dyn TraitZoneRepository + Send + Sync>,
    classifier: ProximityClassifier,
}

impl ExecuteDayMonitor {
    pub fn new(
        calendar: Arc<TradingCalendar>,
        processor: Arc<FetchDayProcessor>,
        candles: Arc<dyn CandleRepository + Send + Sync>,
        zones: Arc<dyn TraitZoneRepository + Send + Sync>,
        classifier: ProximityClassifier,
    ) -> Self {
        Self {
            calendar,
            processor,
            candles,
            zones,
            classifier,
        }
    }

    /// Validate the Execute Day, make sure every symbol has its Fetch-Day zones,
    /// then classify each symbol's price for the Execute Day.
    ///
    /// Prices are live when the Execute Day is `today` or later and the day's
    /// closing prices otherwise. Symbols without a positive price are left out.
    pub async fn monitor<S: AsRef<str>>(
        &self,
        execute_day: &str,
        symbols: &[S],
        today: NaiveDate,
    ) -> Result<MonitoringReport, MonitorError> {
        let fetch_day = self.calendar.validate_execute_day(execute_day, today)?;
        let execute_date = parse_date(execute_day)?;
        let symbols = normalize_symbols(symbols);

        info!(
            "Monitoring {} symbols for {} (fetch day {})",
            symbols.len(),
            execute_date,
            fetch_day
        );

        // Failures are logged by the processor; a symbol without zones still gets classified.
        self.processor.process_many(&symbols, fetch_day).await;

        let prices = self.prices(&symbols, execute_date, today).await?;

        let mut records = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let ltp = match prices.get(symbol) {
                Some(p) if *p > 0.0 => *p,
                _ => {
                    debug!("{}: no price for {}, skipped", symbol, execute_date);
                    continue;
                }
            };

            let zones = self.zones.get_zones(symbol, fetch_day).await?;
            let proximity = self.classifier.classify(ltp, &zones);
            records.push(MonitoringRecord::from_proximity(
                symbol.as_str(),
                ltp,
                zones,
                proximity,
                fetch_day,
                execute_date,
            ));
        }

        info!(
            "Monitoring {}: {} records, {} alerts",
            execute_date,
            records.len(),
            records.iter().filter(|r| r.is_alert()).count()
        );

        Ok(MonitoringReport {
            fetch_day,
            execute_day: execute_date,
            records,
        })
    }

    async fn prices(
        &self,
        symbols: &[String],
        execute_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }
        if execute_date >= today {
            self.candles.current_prices(symbols).await
        } else {
            self.candles.closing_prices(symbols, execute_date).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reaction, Timeframe, ZoneStatus};
    use crate::services::calendar::HolidayCalendar;
    use crate::services::test_support::{FakeCandles, InMemoryZoneStore, bullish_day};
    use crate::services::zones::ImpulseZoneExtractor;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monitor(
        candles: FakeCandles,
    ) -> (ExecuteDayMonitor, Arc<FakeCandles>, Arc<InMemoryZoneStore>) {
        let candles = Arc::new(candles);
        let store = Arc::new(InMemoryZoneStore::default());
        let holidays = HolidayCalendar::from_dates([d(2026, 1, 26)]);
        let calendar = Arc::new(TradingCalendar::new(holidays));
        let processor = Arc::new(FetchDayProcessor::new(
            candles.clone(),
            store.clone(),
            ImpulseZoneExtractor::default(),
            Timeframe::Minute15,
        ));
        let monitor = ExecuteDayMonitor::new(
            calendar,
            processor,
            candles.clone(),
            store.clone(),
            ProximityClassifier::default(),
        );
        (monitor, candles, store)
    }

    #[test]
    fn test_normalize_symbols() {
        let symbols = normalize_symbols(&[" reliance", "RELIANCE", "", "  ", "infy ", "Reliance"]);

        assert_eq!(symbols, vec!["RELIANCE".to_string(), "INFY".to_string()]);
    }

    #[tokio::test]
    async fn test_live_monitoring_on_execute_day() {
        let (monitor, candles, store) = monitor(
            FakeCandles::default()
                .with_day("RELIANCE", d(2026, 1, 28), bullish_day())
                .with_live("RELIANCE", 100.2)
                .with_live("INFY", 1500.0),
        );

        let report = monitor
            .monitor("2026-01-30", &["reliance", "INFY", "TCS"], d(2026, 1, 30))
            .await
            .unwrap();

        assert_eq!(report.fetch_day, d(2026, 1, 28));
        assert_eq!(report.execute_day, d(2026, 1, 30));
        assert_eq!(report.records.len(), 2);

        let reliance = &report.records[0];
        assert_eq!(reliance.symbol, "RELIANCE");
        assert_eq!(reliance.status, ZoneStatus::InsideBullish);
        assert_eq!(reliance.reaction, Reaction::Holding);
        assert_eq!(reliance.zones.len(), 1);
        assert!(reliance.is_alert());

        let infy = &report.records[1];
        assert_eq!(infy.status, ZoneStatus::Far);
        assert_eq!(infy.distance_percent, 100.0);
        assert!(infy.zones.is_empty());

        assert!(candles.calls().contains(&"live".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_historical_replay_uses_closing_prices() {
        let (monitor, candles, _) = monitor(
            FakeCandles::default()
                .with_day("RELIANCE", d(2026, 1, 28), bullish_day())
                .with_close("RELIANCE", d(2026, 1, 30), 99.7),
        );

        let report = monitor
            .monitor("2026-01-30", &["RELIANCE"], d(2026, 2, 10))
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].ltp, 99.7);
        assert_eq!(report.records[0].status, ZoneStatus::Near);
        assert_eq!(report.records[0].reaction, Reaction::FirstTouch);
        assert!(candles.calls().contains(&"closes:2026-01-30".to_string()));
        assert!(!candles.calls().contains(&"live".to_string()));
    }

    #[tokio::test]
    async fn test_zones_come_from_fetch_day_only() {
        let (monitor, candles, _) = monitor(FakeCandles::default().with_live("SBIN", 700.0));

        monitor
            .monitor("2026-01-30", &["SBIN"], d(2026, 1, 30))
            .await
            .unwrap();

        let candle_calls: Vec<_> = candles
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("candles:"))
            .collect();
        assert_eq!(candle_calls, vec!["candles:SBIN:2026-01-28".to_string()]);
    }

    #[tokio::test]
    async fn test_future_fetch_day_is_rejected() {
        let (monitor, candles, _) = monitor(FakeCandles::default());

        let err = monitor
            .monitor("2026-02-03", &["RELIANCE"], d(2026, 1, 29))
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::Validation(CalendarError::FutureFetchDay { .. })));
        assert!(err.to_string().contains("is in the future"));
        assert!(candles.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        let (monitor, _, _) = monitor(FakeCandles::default());

        let err = monitor
            .monitor("30-01-2026", &["RELIANCE"], d(2026, 1, 30))
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::Validation(CalendarError::InvalidFormat { .. })));
    }

    #[tokio::test]
    async fn test_provider_failure_during_extraction_is_not_fatal() {
        let candles = FakeCandles::default()
            .failing("INFY")
            .with_live("INFY", 1500.0);
        let (monitor, _, _) = monitor(candles);

        let report = monitor
            .monitor("2026-01-30", &["INFY"], d(2026, 1, 30))
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].status, ZoneStatus::Far);
    }

    #[tokio::test]
    async fn test_non_positive_price_is_skipped() {
        let (monitor, _, _) = monitor(FakeCandles::default().with_live("INFY", 0.0));

        let report = monitor
            .monitor("2026-01-30", &["INFY"], d(2026, 1, 30))
            .await
            .unwrap();

        assert!(report.records.is_empty());
    }
}
