use crate::app_state::models::AppState;
use crate::db::postgres::models::watchlist::PgWatchlist;
use crate::services::calendar::TradingCalendar;
use crate::services::monitoring::normalize_symbols;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, warn};

/// A watchlist whose zones should be ready before its Execute Day.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmupTarget {
    pub name: String,
    pub execute_day: NaiveDate,
    pub fetch_day: NaiveDate,
    pub symbols: Vec<String>,
}

/// Picks watchlists with an Execute Day of `today` or later whose Fetch Day
/// ended before `today`. A Fetch Day equal to `today` may still be trading, and
/// a zone stored from a partial session is never recomputed. The Fetch Day is
/// recomputed from the current calendar.
pub fn plan_warmup(
    watchlists: &[PgWatchlist],
    calendar: &TradingCalendar,
    today: NaiveDate,
) -> Vec<WarmupTarget> {
    let mut targets = Vec::new();
    for wl in watchlists {
        if wl.execute_day < today {
            continue;
        }

        let fetch_day = calendar.calculate_fetch_day(wl.execute_day);
        if fetch_day >= today {
            debug!(
                "Watchlist '{}': fetch day {} has not closed yet",
                wl.name, fetch_day
            );
            continue;
        }
        if fetch_day != wl.fetch_day {
            warn!(
                "Watchlist '{}': stored fetch day {} differs from calendar {}",
                wl.name, wl.fetch_day, fetch_day
            );
        }

        let symbols = normalize_symbols(&wl.symbols);
        if symbols.is_empty() {
            continue;
        }

        targets.push(WarmupTarget {
            name: wl.name.clone(),
            execute_day: wl.execute_day,
            fetch_day,
            symbols,
        });
    }
    targets
}

pub struct ZoneWarmupScheduler {
    app_state: Arc<AppState>,
}

impl ZoneWarmupScheduler {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Runs one warm-up pass, returning how many symbols now have zones.
    pub async fn trigger_update(&self) -> Result<usize, Box<dyn std::error::Error>> {
        let watchlists = self
            .app_state
            .postgres_service
            .repository_watchlist
            .list()
            .await?;

        let targets = plan_warmup(&watchlists, &self.app_state.calendar, self.app_state.today());
        if targets.is_empty() {
            info!("No watchlists need zone warm-up");
            return Ok(0);
        }

        info!("Warming up zones for {} watchlists", targets.len());

        let mut ready = 0;
        for (index, target) in targets.iter().enumerate() {
            info!(
                "Watchlist {}/{}: '{}', {} symbols, fetch day {}",
                index + 1,
                targets.len(),
                target.name,
                target.symbols.len(),
                target.fetch_day
            );

            let results = self
                .app_state
                .processor
                .process_many(&target.symbols, target.fetch_day)
                .await;

            let with_zones = results
                .iter()
                .filter(|(_, r)| matches!(r, Ok(o) if o.zones_available() > 0))
                .count();
            let failed = results.iter().filter(|(_, r)| r.is_err()).count();

            info!(
                "Watchlist '{}': {} with zones, {} failed, {} without signal",
                target.name,
                with_zones,
                failed,
                results.len() - with_zones - failed
            );
            ready += with_zones;
        }

        Ok(ready)
    }

    pub async fn start(&self) {
        let warmup_config = &self.app_state.settings.app_config.zone_warmup;
        if !warmup_config.enabled {
            info!("Zone warm-up scheduler is disabled in configuration");
            return;
        }

        if let (Some(start), Some(end)) = (&warmup_config.start_time, &warmup_config.end_time) {
            info!("Warm-up operation window configured: {} to {} UTC", start, end);
        }

        info!(
            "Starting zone warm-up scheduler with {} second interval",
            warmup_config.interval_seconds
        );

        let app_state = self.app_state.clone();
        let mut interval = time::interval(Duration::from_secs(warmup_config.interval_seconds));

        tokio::spawn(async move {
            loop {
                interval.tick().await;

                if !app_state.settings.app_config.zone_warmup.is_operation_allowed() {
                    debug!(
                        "Warm-up: outside operation window (current time: {})",
                        Utc::now().format("%H:%M:%S")
                    );
                    continue;
                }

                let scheduler = ZoneWarmupScheduler::new(app_state.clone());
                match scheduler.trigger_update().await {
                    Ok(count) => info!("Warm-up: {} symbols have zones", count),
                    Err(e) => error!("Warm-up failed: {}", e),
                }
            }
        });
    }
}
