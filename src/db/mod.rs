pub mod clickhouse;
pub mod postgres;
