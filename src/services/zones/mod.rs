pub mod extractor;
pub mod fetch_day;

pub use extractor::{ExtractorParams, ImpulseZoneExtractor};
pub use fetch_day::{FetchDayOutcome, FetchDayProcessor, ProcessError};
