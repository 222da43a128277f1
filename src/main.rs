mod api;
mod app_state;
mod db;
mod domain;
mod env_config;
mod layers;
mod logger;
mod services;

use app_state::models::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use db::{
    clickhouse::clickhouse_service::ClickhouseService,
    postgres::postgres_service::PostgresService,
};
use env_config::models::app_setting::AppSettings;
use layers::{create_cors, create_trace};
use services::calendar::TradingCalendar;
use services::warmup::ZoneWarmupScheduler;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    let settings = Arc::new(AppSettings::load());

    logger::init_logger(
        &settings.app_config.log.level,
        settings.app_config.log.format,
        settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting t-zones ({} environment)", settings.app_env.env);
    debug!("Configuration details: {:#?}", settings);

    let addr: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port
    )
    .parse()
    .expect("Invalid server address configuration");

    let calendar = trading_calendar(&settings);
    let app_state = Arc::new(connect(settings, calendar).await);

    ZoneWarmupScheduler::new(app_state.clone()).start().await;

    serve(router(app_state), addr).await;
}

fn trading_calendar(settings: &AppSettings) -> TradingCalendar {
    let holidays = settings
        .app_config
        .holiday_calendar()
        .unwrap_or_else(|e| panic!("Invalid holiday calendar: {}", e));

    let this_year = settings.app_config.market.today().format("%Y").to_string();
    if !settings.app_config.calendar.holidays.contains_key(&this_year) {
        warn!("No holidays configured for {}, only weekends will be skipped", this_year);
    }
    info!("Holiday calendar loaded with {} dates", holidays.len());

    TradingCalendar::new(holidays)
}

async fn connect(settings: Arc<AppSettings>, calendar: TradingCalendar) -> AppState {
    let clickhouse = ClickhouseService::new(&settings).await.unwrap_or_else(|e| {
        error!("Failed to connect to ClickHouse: {}", e);
        panic!("Cannot continue without ClickHouse connection");
    });

    let postgres = PostgresService::new(&settings).await.unwrap_or_else(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        panic!("Cannot continue without PostgreSQL connection");
    });

    info!("Database connections established");
    AppState::new(settings, Arc::new(clickhouse), Arc::new(postgres), calendar)
}

fn router(app_state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/calculate-fetch-day", get(api::calculate_fetch_day))
        .route("/process-fetch-day", post(api::process_fetch_day))
        .route("/test-fetch-day", get(api::test_fetch_day))
        .route("/execute-day-monitor", get(api::execute_day_monitor))
        .route("/alerts", get(api::alerts))
        .route("/smart-monitor", post(api::smart_monitor))
        .route("/add-decode-list", post(api::add_decode_list))
        .route("/get-zones", get(api::get_zones))
        .route("/update-zone", post(api::update_zone))
        .route("/save-watchlist", post(api::save_watchlist))
        .route("/get-watchlists", get(api::get_watchlists))
        .route("/load-watchlist", get(api::load_watchlist))
        .route("/delete-watchlist", post(api::delete_watchlist));

    Router::new()
        .route("/api-health", get(api::health_api))
        .route("/db-health", get(api::health_db))
        .nest("/api", routes)
        .layer(axum::Extension(app_state))
        .layer(create_cors())
        .layer(create_trace())
}

async fn serve(app: Router, addr: SocketAddr) {
    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {}: {}", addr, e));

    info!("Listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        panic!("Server failed: {}", e);
    }

    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
