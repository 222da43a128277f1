pub mod candle_repository;
