use sqlx::{Pool, Postgres};
use tracing::info;

const CREATE_ZONES: &str = "
CREATE TABLE IF NOT EXISTS zones (
    id BIGSERIAL PRIMARY KEY,
    symbol TEXT NOT NULL,
    fetch_date DATE NOT NULL,
    timeframe TEXT NOT NULL,
    zone_type TEXT NOT NULL CHECK (zone_type IN ('BULLISH', 'BEARISH')),
    zone_low DOUBLE PRECISION NOT NULL,
    zone_high DOUBLE PRECISION NOT NULL,
    impulse_strength TEXT NOT NULL DEFAULT 'MEDIUM',
    impulse_start_time TIMESTAMPTZ,
    impulse_end_time TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (zone_low <= zone_high),
    UNIQUE (symbol, fetch_date, timeframe, zone_type, zone_low, zone_high)
)";

const CREATE_ZONES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_zones_symbol_fetch_date ON zones (symbol, fetch_date)";

const CREATE_WATCHLISTS: &str = "
CREATE TABLE IF NOT EXISTS watchlists (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    execute_day DATE NOT NULL,
    fetch_day DATE NOT NULL,
    symbols TEXT[] NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATE_DECODE_LISTS: &str = "
CREATE TABLE IF NOT EXISTS decode_lists (
    execute_day DATE NOT NULL,
    symbol TEXT NOT NULL,
    fetch_day DATE NOT NULL,
    added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (execute_day, symbol)
)";

/// Creates the zone, watchlist and decode list tables when missing.
pub async fn ensure_schema(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    for statement in [
        CREATE_ZONES,
        CREATE_ZONES_INDEX,
        CREATE_WATCHLISTS,
        CREATE_DECODE_LISTS,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("PostgreSQL schema is up to date");
    Ok(())
}
