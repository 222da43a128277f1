pub mod decode_list;
pub mod error;
pub mod fetch_day;
pub mod health_db;
pub mod monitor;
pub mod watchlists;
pub mod zones;

use axum::http::StatusCode;

pub use decode_list::add_decode_list;
pub use error::ApiError;
pub use fetch_day::{calculate_fetch_day, process_fetch_day, test_fetch_day};
pub use health_db::health_db;
pub use monitor::{alerts, execute_day_monitor, smart_monitor};
pub use watchlists::{delete_watchlist, get_watchlists, load_watchlist, save_watchlist};
pub use zones::{get_zones, update_zone};

pub async fn health_api() -> StatusCode {
    StatusCode::OK
}
