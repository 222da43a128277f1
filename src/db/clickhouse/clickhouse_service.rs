use crate::db::clickhouse::connection::ClickhouseConnection;
use crate::db::clickhouse::repository::candle_repository::{
    CandleRepository, ClickhouseCandleRepository,
};
use crate::env_config::models::app_setting::AppSettings;
use std::sync::Arc;
use tracing::info;

/// Market-data side of the service.
pub struct ClickhouseService {
    pub repository_candle: Arc<dyn CandleRepository + Send + Sync>,
}

impl ClickhouseService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self, clickhouse::error::Error> {
        let connection = Arc::new(ClickhouseConnection::new(settings.clone()).await?);

        let market = settings.app_config.market.clone();
        info!(
            "Candle provider reads {} (session {}-{}, UTC{:+} min)",
            market.candles_table,
            market.session_open,
            market.session_close,
            market.utc_offset_minutes
        );

        let repository_candle: Arc<dyn CandleRepository + Send + Sync> =
            Arc::new(ClickhouseCandleRepository::new(connection.clone(), market));

        Ok(Self { repository_candle })
    }
}
