use crate::api::ApiError;
use crate::app_state::models::AppState;
use crate::services::calendar::trading_calendar::parse_date;
use crate::services::monitoring::normalize_symbols;
use axum::{Json, extract::Extension};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct AddDecodeListRequest {
    /// Execute Day the symbols are monitored on.
    pub decode_date: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
    pub fetch_date: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewDecodeList {
    pub execute_day: NaiveDate,
    pub fetch_day: NaiveDate,
    pub symbols: Vec<String>,
}

pub fn new_decode_list(request: AddDecodeListRequest) -> Result<NewDecodeList, ApiError> {
    let symbols = normalize_symbols(&request.symbols);
    let (Some(decode_date), Some(fetch_date)) = (request.decode_date, request.fetch_date) else {
        return Err(ApiError::missing("required fields"));
    };
    if symbols.is_empty() {
        return Err(ApiError::missing("required fields"));
    }

    Ok(NewDecodeList {
        execute_day: parse_date(&decode_date)?,
        fetch_day: parse_date(&fetch_date)?,
        symbols,
    })
}

/// Queues symbols for an Execute Day without extracting zones.
pub async fn add_decode_list(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<AddDecodeListRequest>,
) -> Result<Json<Value>, ApiError> {
    let new = new_decode_list(request)?;

    let queued = app_state
        .postgres_service
        .repository_decode_list
        .add(new.execute_day, &new.symbols, new.fetch_day)
        .await?;
    info!(
        "Decode list for {}: {} symbols, {} newly queued",
        new.execute_day,
        new.symbols.len(),
        queued
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("Added {} stocks to decode list", new.symbols.len()),
        "execute_day": new.execute_day,
        "fetch_day": new.fetch_day,
        "queued": queued,
    })))
}
