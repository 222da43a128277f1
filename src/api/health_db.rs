use axum::{extract::Extension, http::StatusCode};
use std::sync::Arc;
use tracing::warn;

use crate::app_state::models::AppState;

pub async fn health_db(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    let clickhouse_ok = match app_state.clickhouse_service.repository_candle.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("ClickHouse health check failed: {}", e);
            false
        }
    };

    let postgres_ok = match app_state.postgres_service.repository_health_check.check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!("PostgreSQL health check failed: {}", e);
            false
        }
    };

    if clickhouse_ok && postgres_ok {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
