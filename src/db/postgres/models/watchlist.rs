use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Named set of symbols saved for an Execute Day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PgWatchlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub execute_day: NaiveDate,
    pub fetch_day: NaiveDate,
    pub symbols: Vec<String>,
    pub updated_at: DateTime<Utc>,
}
