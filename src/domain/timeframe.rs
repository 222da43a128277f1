use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval, named the way the broker API names them ("15minute", "day").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Minute1,
    Minute3,
    Minute5,
    Minute10,
    Minute15,
    Minute30,
    Minute60,
    Day,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "minute",
            Timeframe::Minute3 => "3minute",
            Timeframe::Minute5 => "5minute",
            Timeframe::Minute10 => "10minute",
            Timeframe::Minute15 => "15minute",
            Timeframe::Minute30 => "30minute",
            Timeframe::Minute60 => "60minute",
            Timeframe::Day => "day",
        }
    }

    /// Bucket length in minutes; `None` for a whole session.
    pub fn minutes(&self) -> Option<i64> {
        match self {
            Timeframe::Minute1 => Some(1),
            Timeframe::Minute3 => Some(3),
            Timeframe::Minute5 => Some(5),
            Timeframe::Minute10 => Some(10),
            Timeframe::Minute15 => Some(15),
            Timeframe::Minute30 => Some(30),
            Timeframe::Minute60 => Some(60),
            Timeframe::Day => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minute" | "1minute" => Ok(Timeframe::Minute1),
            "3minute" => Ok(Timeframe::Minute3),
            "5minute" => Ok(Timeframe::Minute5),
            "10minute" => Ok(Timeframe::Minute10),
            "15minute" => Ok(Timeframe::Minute15),
            "30minute" => Ok(Timeframe::Minute30),
            "60minute" => Ok(Timeframe::Minute60),
            "day" => Ok(Timeframe::Day),
            other => Err(DomainError::UnknownTimeframe(other.to_string())),
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.as_str().to_string()
    }
}
