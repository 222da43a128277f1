pub mod classifier;
pub mod execute_day;

pub use classifier::{ProximityClassifier, alerts};
pub use execute_day::{ExecuteDayMonitor, MonitorError, normalize_symbols};
