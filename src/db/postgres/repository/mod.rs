pub mod decode_list_repository;
pub mod health_check_repository;
pub mod watchlist_repository;
pub mod zone_repository;
