// src/db/postgres/models/zone.rs
use crate::domain::{DomainError, ImpulseStrength, Timeframe, Zone, ZoneType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PgZone {
    pub id: i64,
    pub symbol: String,
    pub fetch_date: NaiveDate,
    pub timeframe: String,
    pub zone_type: String,
    pub zone_low: f64,
    pub zone_high: f64,
    pub impulse_strength: String,
    pub impulse_start_time: Option<DateTime<Utc>>,
    pub impulse_end_time: Option<DateTime<Utc>>,
}

impl TryFrom<PgZone> for Zone {
    type Error = DomainError;

    fn try_from(row: PgZone) -> Result<Self, Self::Error> {
        let zone = Zone::new(
            row.symbol,
            row.fetch_date,
            row.timeframe.parse::<Timeframe>()?,
            row.zone_type.parse::<ZoneType>()?,
            row.zone_low,
            row.zone_high,
            row.impulse_strength.parse::<ImpulseStrength>()?,
        )?;

        Ok(Zone {
            impulse_start_time: row.impulse_start_time,
            impulse_end_time: row.impulse_end_time,
            ..zone
        })
    }
}
