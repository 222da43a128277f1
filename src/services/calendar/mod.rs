pub mod holidays;
pub mod trading_calendar;

pub use holidays::HolidayCalendar;
pub use trading_calendar::{CalendarError, TradingCalendar};
