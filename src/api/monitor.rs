use crate::api::ApiError;
use crate::api::fetch_day::{execute_day_or_today, outcome_json};
use crate::app_state::models::AppState;
use crate::services::calendar::trading_calendar::parse_date;
use crate::services::monitoring::{self, normalize_symbols};
use crate::services::zones::FetchDayOutcome;
use axum::{Json, extract::Extension, extract::Query};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct MonitorQuery {
    pub execute_day: Option<String>,
    /// Comma-separated; falls back to the decode list of the Execute Day.
    pub symbols: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SmartMonitorRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub execute_day: Option<String>,
}

pub fn split_symbols(csv: &str) -> Vec<String> {
    let parts: Vec<&str> = csv.split(',').collect();
    normalize_symbols(&parts)
}

async fn resolve_symbols(
    app_state: &AppState,
    execute_day: &str,
    csv: Option<&str>,
) -> Result<Vec<String>, ApiError> {
    let symbols = csv.map(split_symbols).unwrap_or_default();
    if !symbols.is_empty() {
        return Ok(symbols);
    }

    let execute_date = parse_date(execute_day)?;
    let entries = app_state
        .postgres_service
        .repository_decode_list
        .get(execute_date)
        .await?;
    let symbols: Vec<String> = entries.into_iter().map(|e| e.symbol).collect();
    if symbols.is_empty() {
        return Err(ApiError::BadRequest(
            "No symbols to monitor. Add stocks first.".to_string(),
        ));
    }
    Ok(symbols)
}

pub async fn execute_day_monitor(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MonitorQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = app_state.today();
    let execute_day = execute_day_or_today(query.execute_day, today);
    let symbols = resolve_symbols(&app_state, &execute_day, query.symbols.as_deref()).await?;

    let report = app_state.monitor.monitor(&execute_day, &symbols, today).await?;

    Ok(Json(json!({
        "success": true,
        "data": report.records,
        "fetch_day": report.fetch_day,
        "execute_day": report.execute_day,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

pub async fn alerts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MonitorQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = app_state.today();
    let execute_day = execute_day_or_today(query.execute_day, today);
    let symbols = resolve_symbols(&app_state, &execute_day, query.symbols.as_deref()).await?;

    let report = app_state.monitor.monitor(&execute_day, &symbols, today).await?;
    let alerts = monitoring::alerts(&report.records);

    Ok(Json(json!({
        "success": true,
        "count": alerts.len(),
        "alerts": alerts,
        "fetch_day": report.fetch_day,
        "execute_day": report.execute_day,
    })))
}

/// Validates the Execute Day, prepares zones from its Fetch Day and queues the
/// symbols on the decode list.
pub async fn smart_monitor(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<SmartMonitorRequest>,
) -> Result<Json<Value>, ApiError> {
    let symbols = normalize_symbols(&request.symbols);
    if symbols.is_empty() {
        return Err(ApiError::BadRequest("No symbols provided".to_string()));
    }

    let today = app_state.today();
    let execute_day = execute_day_or_today(request.execute_day, today);
    let fetch_day = app_state.calendar.validate_execute_day(&execute_day, today)?;
    let execute_date = parse_date(&execute_day)?;

    let results = app_state.processor.process_many(&symbols, fetch_day).await;
    let zones_generated = results
        .iter()
        .any(|(_, r)| matches!(r, Ok(FetchDayOutcome::Extracted(_, true))));

    let queued = app_state
        .postgres_service
        .repository_decode_list
        .add(execute_date, &symbols, fetch_day)
        .await?;
    info!(
        "Smart monitor: {} symbols for {} ({} newly queued)",
        symbols.len(),
        execute_date,
        queued
    );

    let results: Vec<Value> = results
        .iter()
        .map(|(symbol, result)| outcome_json(symbol, result))
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": format!("Monitoring {} stocks on Execute Day", symbols.len()),
        "fetch_day": fetch_day,
        "execute_day": execute_date,
        "symbols": symbols,
        "zones_generated": zones_generated,
        "results": results,
    })))
}
