use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Symbol queued for monitoring on an Execute Day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PgDecodeListEntry {
    pub symbol: String,
    pub fetch_day: NaiveDate,
}
