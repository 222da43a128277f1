use crate::api::ApiError;
use crate::app_state::models::AppState;
use crate::services::calendar::{CalendarError, trading_calendar::{DATE_FORMAT, parse_date}};
use crate::services::monitoring::normalize_symbols;
use crate::services::zones::{FetchDayOutcome, ProcessError};
use axum::{Json, extract::Extension, extract::Query};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Candles echoed back by the test endpoint.
const SAMPLE_CANDLES: usize = 3;

#[derive(Debug, Deserialize)]
pub struct ExecuteDayQuery {
    pub execute_day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessFetchDayRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub fetch_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestFetchDayQuery {
    pub symbol: Option<String>,
    pub fetch_date: Option<String>,
}

/// Execute Day from the request, or today's exchange date.
pub fn execute_day_or_today(execute_day: Option<String>, today: NaiveDate) -> String {
    execute_day
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| today.format(DATE_FORMAT).to_string())
}

/// Parses a Fetch Day and refuses one after `today`.
pub fn historical_fetch_day(input: &str, today: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let fetch_day = parse_date(input)?;
    if fetch_day > today {
        return Err(CalendarError::FutureFetchDay { fetch_day });
    }
    Ok(fetch_day)
}

pub fn outcome_json(symbol: &str, result: &Result<FetchDayOutcome, ProcessError>) -> Value {
    match result {
        Ok(outcome) => {
            let (zone, inserted) = match outcome {
                FetchDayOutcome::Extracted(zone, inserted) => (Some(zone), Some(*inserted)),
                _ => (None, None),
            };
            json!({
                "symbol": symbol,
                "status": outcome.label(),
                "zones": outcome.zones_available(),
                "zone": zone,
                "inserted": inserted,
            })
        }
        Err(e) => json!({
            "symbol": symbol,
            "status": "error",
            "zones": 0,
            "error": e.to_string(),
        }),
    }
}

pub async fn calculate_fetch_day(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ExecuteDayQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = app_state.today();
    let execute_day = execute_day_or_today(query.execute_day, today);
    let fetch_day = app_state.calendar.validate_execute_day(&execute_day, today)?;

    Ok(Json(json!({
        "success": true,
        "execute_day": execute_day,
        "fetch_day": fetch_day,
        "explanation": format!(
            "Zones will be loaded from {} (2 trading days before {})",
            fetch_day, execute_day
        ),
    })))
}

pub async fn process_fetch_day(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<ProcessFetchDayRequest>,
) -> Result<Json<Value>, ApiError> {
    let symbols = normalize_symbols(&request.symbols);
    let fetch_date = request.fetch_date.ok_or_else(|| ApiError::missing("symbols or fetch_date"))?;
    if symbols.is_empty() {
        return Err(ApiError::missing("symbols or fetch_date"));
    }
    let fetch_day = historical_fetch_day(&fetch_date, app_state.today())?;

    info!("Processing fetch day {} for {} symbols", fetch_day, symbols.len());
    let results = app_state.processor.process_many(&symbols, fetch_day).await;

    let results: Vec<Value> = results
        .iter()
        .map(|(symbol, result)| outcome_json(symbol, result))
        .collect();

    Ok(Json(json!({
        "success": true,
        "fetch_day": fetch_day,
        "results": results,
    })))
}

pub async fn test_fetch_day(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<TestFetchDayQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(symbol), Some(fetch_date)) = (query.symbol, query.fetch_date) else {
        return Err(ApiError::missing("symbol or fetch_date"));
    };
    let symbol = symbol.trim().to_uppercase();
    let fetch_day = parse_date(&fetch_date)?;
    let timeframe = app_state.processor.timeframe();

    let candles = app_state
        .clickhouse_service
        .repository_candle
        .historical_candles(&symbol, fetch_day, timeframe)
        .await?;

    let sample: Vec<_> = candles.iter().take(SAMPLE_CANDLES).collect();

    Ok(Json(json!({
        "success": true,
        "symbol": symbol,
        "fetch_date": fetch_day,
        "timeframe": timeframe,
        "candles_found": candles.len(),
        "data_available": !candles.is_empty(),
        "sample": sample,
    })))
}
