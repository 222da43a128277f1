use crate::api::ApiError;
use crate::app_state::models::AppState;
use crate::domain::{ImpulseStrength, Timeframe, Zone, ZoneType};
use crate::services::calendar::trading_calendar::parse_date;
use axum::{Json, extract::Extension, extract::Query};
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ZonesQuery {
    pub symbol: Option<String>,
    pub fetch_day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub symbol: String,
    pub fetch_day: String,
    pub zone_type: String,
    pub zone_low: f64,
    pub zone_high: f64,
}

/// Builds the MANUAL zone that replaces everything stored for the pair.
pub fn manual_zone(request: &UpdateZoneRequest, timeframe: Timeframe) -> Result<Zone, ApiError> {
    let symbol = request.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ApiError::missing("symbol"));
    }
    let fetch_day = parse_date(&request.fetch_day)?;
    let zone_type = ZoneType::from_str(&request.zone_type)?;

    Ok(Zone::new(
        symbol,
        fetch_day,
        timeframe,
        zone_type,
        request.zone_low,
        request.zone_high,
        ImpulseStrength::Manual,
    )?)
}

pub async fn get_zones(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ZonesQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(symbol), Some(fetch_day)) = (query.symbol, query.fetch_day) else {
        return Err(ApiError::missing("symbol or fetch_day"));
    };
    let symbol = symbol.trim().to_uppercase();
    let fetch_day = parse_date(&fetch_day)?;

    let zones = app_state
        .postgres_service
        .repository_zone
        .get_zones(&symbol, fetch_day)
        .await?;

    Ok(Json(json!({
        "success": true,
        "zones": zones,
    })))
}

pub async fn update_zone(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<UpdateZoneRequest>,
) -> Result<Json<Value>, ApiError> {
    let zone = manual_zone(&request, app_state.processor.timeframe())?;

    let saved = app_state
        .postgres_service
        .repository_zone
        .replace_zones(&zone.symbol, zone.fetch_date, &zone)
        .await?;
    if !saved {
        return Err(ApiError::Internal("Failed to save zone".to_string()));
    }

    info!(
        "Manual {} zone {:.2}-{:.2} saved for {} on {}",
        zone.zone_type, zone.zone_low, zone.zone_high, zone.symbol, zone.fetch_date
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("Zone updated for {}", zone.symbol),
        "zone": zone,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(zone_type: &str, low: f64, high: f64) -> UpdateZoneRequest {
        UpdateZoneRequest {
            symbol: " sbin ".to_string(),
            fetch_day: "2026-01-28".to_string(),
            zone_type: zone_type.to_string(),
            zone_low: low,
            zone_high: high,
        }
    }

    #[test]
    fn test_manual_zone() {
        let zone = manual_zone(&request("bearish", 710.0, 715.0), Timeframe::Minute15).unwrap();

        assert_eq!(zone.symbol, "SBIN");
        assert_eq!(zone.zone_type, ZoneType::Bearish);
        assert_eq!(zone.impulse_strength, ImpulseStrength::Manual);
        assert_eq!(zone.timeframe, Timeframe::Minute15);
        assert!(zone.impulse_start_time.is_none());
    }

    #[test]
    fn test_manual_zone_rejects_inverted_range() {
        let err = manual_zone(&request("BULLISH", 715.0, 710.0), Timeframe::Minute15).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_manual_zone_rejects_unknown_type() {
        let err = manual_zone(&request("SIDEWAYS", 710.0, 715.0), Timeframe::Minute15).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
