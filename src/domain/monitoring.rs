use super::zone::Zone;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneStatus {
    InsideBullish,
    InsideBearish,
    Near,
    Far,
}

/// How price is behaving relative to its closest zone.
///
/// `Rejected` and `Broken` need intrabar history and are never produced by
/// the proximity classifier; they are kept so stored reports stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    #[serde(rename = "No Touch Yet")]
    NoTouchYet,
    #[serde(rename = "First Touch")]
    FirstTouch,
    #[serde(rename = "Holding")]
    Holding,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Broken")]
    Broken,
}

/// Result of classifying one price against one symbol's zones.
#[derive(Debug, Clone, PartialEq)]
pub struct Proximity {
    pub status: ZoneStatus,
    pub closest_zone: Option<Zone>,
    /// Signed, percent of the closest zone's midpoint
    pub distance_percent: f64,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringRecord {
    pub symbol: String,
    pub ltp: f64,
    pub zones: Vec<Zone>,
    pub status: ZoneStatus,
    pub closest_zone: Option<Zone>,
    pub distance_percent: f64,
    pub reaction: Reaction,
    pub fetch_date: NaiveDate,
    pub execute_date: NaiveDate,
}

impl MonitoringRecord {
    pub fn from_proximity(
        symbol: impl Into<String>,
        ltp: f64,
        zones: Vec<Zone>,
        proximity: Proximity,
        fetch_date: NaiveDate,
        execute_date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            ltp,
            zones,
            status: proximity.status,
            closest_zone: proximity.closest_zone,
            distance_percent: proximity.distance_percent,
            reaction: proximity.reaction,
            fetch_date,
            execute_date,
        }
    }

    /// Alert only on a first touch or on price holding inside a zone.
    pub fn is_alert(&self) -> bool {
        matches!(
            self.status,
            ZoneStatus::InsideBullish | ZoneStatus::InsideBearish | ZoneStatus::Near
        ) && matches!(self.reaction, Reaction::FirstTouch | Reaction::Holding)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringReport {
    pub fetch_day: NaiveDate,
    pub execute_day: NaiveDate,
    pub records: Vec<MonitoringRecord>,
}
