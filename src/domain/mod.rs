pub mod candle;
pub mod error;
pub mod monitoring;
pub mod timeframe;
pub mod zone;

pub use candle::Candle;
pub use error::DomainError;
pub use monitoring::{MonitoringRecord, MonitoringReport, Proximity, Reaction, ZoneStatus};
pub use timeframe::Timeframe;
pub use zone::{ImpulseStrength, Zone, ZoneType};
