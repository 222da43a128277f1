use crate::db::clickhouse::clickhouse_service::ClickhouseService;
use crate::db::postgres::postgres_service::PostgresService;
use crate::env_config::models::app_setting::AppSettings;
use crate::services::calendar::TradingCalendar;
use crate::services::monitoring::{ExecuteDayMonitor, ProximityClassifier};
use crate::services::zones::{ExtractorParams, FetchDayProcessor, ImpulseZoneExtractor};
use chrono::NaiveDate;
use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub clickhouse_service: Arc<ClickhouseService>,
    pub postgres_service: Arc<PostgresService>,
    pub calendar: Arc<TradingCalendar>,
    pub processor: Arc<FetchDayProcessor>,
    pub monitor: Arc<ExecuteDayMonitor>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        clickhouse_service: Arc<ClickhouseService>,
        postgres_service: Arc<PostgresService>,
        calendar: TradingCalendar,
    ) -> Self {
        let zones_config = &settings.app_config.zones;
        let calendar = Arc::new(calendar);

        let processor = Arc::new(FetchDayProcessor::new(
            clickhouse_service.repository_candle.clone(),
            postgres_service.repository_zone.clone(),
            ImpulseZoneExtractor::new(ExtractorParams::from(zones_config)),
            zones_config.timeframe,
        ));

        let monitor = Arc::new(ExecuteDayMonitor::new(
            calendar.clone(),
            processor.clone(),
            clickhouse_service.repository_candle.clone(),
            postgres_service.repository_zone.clone(),
            ProximityClassifier::from(zones_config),
        ));

        Self {
            settings,
            clickhouse_service,
            postgres_service,
            calendar,
            processor,
            monitor,
        }
    }

    /// Current date at the exchange.
    pub fn today(&self) -> NaiveDate {
        self.settings.app_config.market.today()
    }
}
