use crate::api::ApiError;
use crate::app_state::models::AppState;
use crate::services::calendar::TradingCalendar;
use crate::services::calendar::trading_calendar::parse_date;
use crate::services::monitoring::normalize_symbols;
use axum::{Json, extract::Extension, extract::Query};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SaveWatchlistRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub execute_day: Option<String>,
    /// Derived from the Execute Day when omitted.
    pub fetch_day: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchlistNameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteWatchlistRequest {
    pub name: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewWatchlist {
    pub name: String,
    pub description: String,
    pub execute_day: NaiveDate,
    pub fetch_day: NaiveDate,
    pub symbols: Vec<String>,
}

fn required_name(name: Option<String>) -> Result<String, ApiError> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::missing("watchlist name"))
}

pub fn new_watchlist(
    request: SaveWatchlistRequest,
    calendar: &TradingCalendar,
) -> Result<NewWatchlist, ApiError> {
    let symbols = normalize_symbols(&request.symbols);
    let (Some(name), Some(execute_day)) = (request.name, request.execute_day) else {
        return Err(ApiError::missing("required fields"));
    };
    let name = required_name(Some(name))?;
    if symbols.is_empty() {
        return Err(ApiError::missing("required fields"));
    }

    let execute_day = parse_date(&execute_day)?;
    let fetch_day = match request.fetch_day {
        Some(fetch_day) => parse_date(&fetch_day)?,
        None => calendar.calculate_fetch_day(execute_day),
    };

    Ok(NewWatchlist {
        name,
        description: request.description,
        execute_day,
        fetch_day,
        symbols,
    })
}

pub async fn save_watchlist(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<SaveWatchlistRequest>,
) -> Result<Json<Value>, ApiError> {
    let new = new_watchlist(request, &app_state.calendar)?;

    let saved = app_state
        .postgres_service
        .repository_watchlist
        .save(
            &new.name,
            &new.description,
            new.execute_day,
            new.fetch_day,
            &new.symbols,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Watchlist \"{}\" saved", saved.name),
        "watchlist": saved,
    })))
}

pub async fn get_watchlists(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let watchlists = app_state.postgres_service.repository_watchlist.list().await?;

    Ok(Json(json!({
        "success": true,
        "watchlists": watchlists,
    })))
}

pub async fn load_watchlist(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<WatchlistNameQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = required_name(query.name)?;

    let watchlist = app_state
        .postgres_service
        .repository_watchlist
        .get(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Watchlist not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "name": watchlist.name,
        "description": watchlist.description,
        "execute_day": watchlist.execute_day,
        "fetch_day": watchlist.fetch_day,
        "symbols": watchlist.symbols,
    })))
}

pub async fn delete_watchlist(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<DeleteWatchlistRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = required_name(request.name)?;

    if !app_state.postgres_service.repository_watchlist.delete(&name).await? {
        return Err(ApiError::NotFound("Watchlist not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Watchlist \"{}\" deleted", name),
    })))
}
