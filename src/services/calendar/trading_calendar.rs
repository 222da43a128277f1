// File: src/services/calendar/trading_calendar.rs
use super::holidays::HolidayCalendar;
use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use tracing::{debug, warn};

/// Attempts made by [`TradingCalendar::previous_trading_day`] before giving up.
pub const MAX_LOOKBACK_DAYS: usize = 10;

/// Trading days between the Fetch Day and the Execute Day.
pub const FETCH_DAY_OFFSET: usize = 2;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalendarError {
    #[error("Invalid date format '{input}': expected YYYY-MM-DD")]
    InvalidFormat { input: String },

    #[error("Fetch Day ({fetch_day}) is in the future. No historical data available.")]
    FutureFetchDay { fetch_day: NaiveDate },

    #[error("invalid holiday year key '{0}'")]
    InvalidHolidayYear(String),

    #[error("holiday {date} is listed under year {year}")]
    HolidayYearMismatch { year: i32, date: NaiveDate },
}

/// Weekday/holiday arithmetic for the Execute Day -> Fetch Day cycle.
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    holidays: HolidayCalendar,
}

impl TradingCalendar {
    pub fn new(holidays: HolidayCalendar) -> Self {
        Self { holidays }
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(date)
    }

    /// Closest trading day strictly before `date`.
    ///
    /// After [`MAX_LOOKBACK_DAYS`] non-trading days in a row the walk stops and
    /// the calendar day before `date` is returned as is.
    pub fn previous_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let day_before = date.pred_opt().unwrap_or(date);
        let mut current = day_before;

        for _ in 0..MAX_LOOKBACK_DAYS {
            if self.is_trading_day(current) {
                return current;
            }
            current = current.pred_opt().unwrap_or(current);
        }

        warn!(
            "No trading day found within {} days before {}, falling back to {}",
            MAX_LOOKBACK_DAYS, date, day_before
        );
        day_before
    }

    /// Fetch Day = Execute Day minus two trading days.
    pub fn calculate_fetch_day(&self, execute_day: NaiveDate) -> NaiveDate {
        let mut current = execute_day;
        for _ in 0..FETCH_DAY_OFFSET {
            current = self.previous_trading_day(current);
        }
        debug!("Execute Day {} -> Fetch Day {}", execute_day, current);
        current
    }

    /// Trading days in `[start, end]`, ascending. Empty when `start > end`.
    pub fn trading_days_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_trading_day(*d))
            .collect()
    }

    /// Parses an Execute Day and derives its Fetch Day, refusing any Fetch Day
    /// after `today`. This is the only gate in front of zone extraction.
    pub fn validate_execute_day(
        &self,
        execute_day: &str,
        today: NaiveDate,
    ) -> Result<NaiveDate, CalendarError> {
        let execute_dt = parse_date(execute_day)?;

        if !self.holidays.covers_year(execute_dt.year()) {
            warn!(
                "Holiday calendar has no entries for {}, only weekends are skipped",
                execute_dt.year()
            );
        }

        let fetch_day = self.calculate_fetch_day(execute_dt);
        if fetch_day > today {
            return Err(CalendarError::FutureFetchDay { fetch_day });
        }

        Ok(fetch_day)
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| CalendarError::InvalidFormat {
        input: input.to_string(),
    })
}
