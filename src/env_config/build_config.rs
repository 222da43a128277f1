use super::models::app_config::AppConfig;
use super::models::app_env::Env;
use crate::services::calendar::HolidayCalendar;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Loads `<config_dir>/<env>.toml`. Start-up cannot continue without it.
    pub fn new(env: &Env, config_dir: &str) -> AppConfig {
        let path = Path::new(config_dir).join(format!("{}.toml", env));
        Self::from_file(&path)
            .unwrap_or_else(|e| panic!("Failed to load configuration: {}", e))
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn holiday_calendar(&self) -> Result<HolidayCalendar, ConfigError> {
        HolidayCalendar::from_years(&self.calendar.holidays)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let zones = &self.zones;

        if !zones.atr_multiplier.is_finite() || zones.atr_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zones.atr_multiplier must be positive, got {}",
                zones.atr_multiplier
            )));
        }
        if !zones.near_zone_percent.is_finite() || zones.near_zone_percent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zones.near_zone_percent must be positive, got {}",
                zones.near_zone_percent
            )));
        }
        if zones.zone_candles_min == 0 || zones.zone_candles_min > zones.zone_candles_max {
            return Err(ConfigError::Invalid(format!(
                "zones.zone_candles_min/max out of order: {}/{}",
                zones.zone_candles_min, zones.zone_candles_max
            )));
        }
        if self.market.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(format!(
                "market.utc_offset_minutes out of range: {}",
                self.market.utc_offset_minutes
            )));
        }
        if self.market.session_open >= self.market.session_close {
            return Err(ConfigError::Invalid(
                "market.session_open must be before market.session_close".to_string(),
            ));
        }
        if self.zone_warmup.enabled && self.zone_warmup.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "zone_warmup.interval_seconds must be > 0".to_string(),
            ));
        }

        self.holiday_calendar()?;
        Ok(())
    }
}
