use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::repository::decode_list_repository::{
    StructDecodeListRepository, TraitDecodeListRepository,
};
use crate::db::postgres::repository::health_check_repository::{
    StructHealthCheckRepository, TraitHealthCheckRepository,
};
use crate::db::postgres::repository::watchlist_repository::{
    StructWatchlistRepository, TraitWatchlistRepository,
};
use crate::db::postgres::repository::zone_repository::{StructZoneRepository, TraitZoneRepository};
use crate::db::postgres::schema;
use crate::env_config::models::app_setting::AppSettings;
use std::sync::Arc;

/// Zone store, watchlists and decode lists, all on one pool.
pub struct PostgresService {
    pub repository_health_check: Arc<dyn TraitHealthCheckRepository + Send + Sync>,
    pub repository_zone: Arc<dyn TraitZoneRepository + Send + Sync>,
    pub repository_watchlist: Arc<dyn TraitWatchlistRepository + Send + Sync>,
    pub repository_decode_list: Arc<dyn TraitDecodeListRepository + Send + Sync>,
}

impl PostgresService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self, sqlx::Error> {
        let connection = Arc::new(PostgresConnection::new(settings.clone()).await?);

        schema::ensure_schema(connection.get_pool()).await?;

        Ok(Self {
            repository_health_check: Arc::new(StructHealthCheckRepository::new(connection.clone())),
            repository_zone: Arc::new(StructZoneRepository::new(connection.clone())),
            repository_watchlist: Arc::new(StructWatchlistRepository::new(connection.clone())),
            repository_decode_list: Arc::new(StructDecodeListRepository::new(connection)),
        })
    }
}
