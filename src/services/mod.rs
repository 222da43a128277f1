pub mod calendar;
pub mod monitoring;
pub mod warmup;
pub mod zones;

#[cfg(test)]
pub mod test_support;
