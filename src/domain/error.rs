use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("zone_low ({low}) is above zone_high ({high})")]
    InvalidZoneRange { low: f64, high: f64 },

    #[error("candle low ({low}) is above high ({high})")]
    InvalidCandleRange { low: f64, high: f64 },

    #[error("price field '{0}' is not a finite number")]
    NonFinitePrice(&'static str),

    #[error("unknown zone type '{0}'")]
    UnknownZoneType(String),

    #[error("unknown impulse strength '{0}'")]
    UnknownImpulseStrength(String),

    #[error("unknown timeframe '{0}'")]
    UnknownTimeframe(String),
}
