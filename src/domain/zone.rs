use super::error::DomainError;
use super::timeframe::Timeframe;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneType {
    Bullish,
    Bearish,
}

impl ZoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Bullish => "BULLISH",
            ZoneType::Bearish => "BEARISH",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BULLISH" => Ok(ZoneType::Bullish),
            "BEARISH" => Ok(ZoneType::Bearish),
            other => Err(DomainError::UnknownZoneType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpulseStrength {
    Medium,
    High,
    /// Zone entered by an operator rather than extracted
    Manual,
}

impl ImpulseStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpulseStrength::Medium => "MEDIUM",
            ImpulseStrength::High => "HIGH",
            ImpulseStrength::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for ImpulseStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpulseStrength {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MEDIUM" => Ok(ImpulseStrength::Medium),
            "HIGH" => Ok(ImpulseStrength::High),
            "MANUAL" => Ok(ImpulseStrength::Manual),
            other => Err(DomainError::UnknownImpulseStrength(other.to_string())),
        }
    }
}

/// Origin range of a day's dominant impulse.
///
/// Identity key is (symbol, fetch_date, timeframe, zone_type, zone_low, zone_high);
/// `zone_low <= zone_high` always holds for a value built through [`Zone::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub symbol: String,
    pub fetch_date: NaiveDate,
    pub timeframe: Timeframe,
    pub zone_type: ZoneType,
    pub zone_low: f64,
    pub zone_high: f64,
    pub impulse_strength: ImpulseStrength,
    pub impulse_start_time: Option<DateTime<Utc>>,
    pub impulse_end_time: Option<DateTime<Utc>>,
}

impl Zone {
    pub fn new(
        symbol: impl Into<String>,
        fetch_date: NaiveDate,
        timeframe: Timeframe,
        zone_type: ZoneType,
        zone_low: f64,
        zone_high: f64,
        impulse_strength: ImpulseStrength,
    ) -> Result<Self, DomainError> {
        if !zone_low.is_finite() {
            return Err(DomainError::NonFinitePrice("zone_low"));
        }
        if !zone_high.is_finite() {
            return Err(DomainError::NonFinitePrice("zone_high"));
        }
        if zone_low > zone_high {
            return Err(DomainError::InvalidZoneRange {
                low: zone_low,
                high: zone_high,
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            fetch_date,
            timeframe,
            zone_type,
            zone_low,
            zone_high,
            impulse_strength,
            impulse_start_time: None,
            impulse_end_time: None,
        })
    }

    pub fn with_impulse(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.impulse_start_time = Some(start);
        self.impulse_end_time = Some(end);
        self
    }

    pub fn midpoint(&self) -> f64 {
        (self.zone_low + self.zone_high) / 2.0
    }

    /// Inclusive on both edges.
    pub fn contains(&self, price: f64) -> bool {
        self.zone_low <= price && price <= self.zone_high
    }
}
