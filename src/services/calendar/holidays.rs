// File: src/services/calendar/holidays.rs
use super::trading_calendar::CalendarError;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Non-trading dates, grouped by year. Loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidayCalendar {
    by_year: BTreeMap<i32, BTreeSet<NaiveDate>>,
}

impl HolidayCalendar {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut by_year: BTreeMap<i32, BTreeSet<NaiveDate>> = BTreeMap::new();
        for date in dates {
            by_year.entry(date.year()).or_default().insert(date);
        }
        Self { by_year }
    }

    /// Builds the calendar from a `"year" -> [dates]` table, rejecting dates
    /// filed under the wrong year.
    pub fn from_years(table: &BTreeMap<String, Vec<NaiveDate>>) -> Result<Self, CalendarError> {
        let mut by_year: BTreeMap<i32, BTreeSet<NaiveDate>> = BTreeMap::new();

        for (key, dates) in table {
            let year: i32 = key
                .trim()
                .parse()
                .map_err(|_| CalendarError::InvalidHolidayYear(key.clone()))?;

            let entry = by_year.entry(year).or_default();
            for date in dates {
                if date.year() != year {
                    return Err(CalendarError::HolidayYearMismatch { year, date: *date });
                }
                entry.insert(*date);
            }
        }

        Ok(Self { by_year })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.by_year
            .get(&date.year())
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Whether any holiday list was supplied for `year`.
    pub fn covers_year(&self, year: i32) -> bool {
        self.by_year.contains_key(&year)
    }

    pub fn len(&self) -> usize {
        self.by_year.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
