use crate::env_config::models::app_setting::AppSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct PostgresConnection {
    pool: Pool<Postgres>,
}

impl PostgresConnection {
    pub async fn new(settings: Arc<AppSettings>) -> Result<Self, sqlx::Error> {
        info!("Initializing PostgreSQL connection...");

        let env = &settings.app_env;
        let pg = &settings.app_config.postgres;

        // POSTGRES_HOST may carry a port ("db:5433")
        let (host, port) = match env.postgres_host.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().unwrap_or(5432)),
            None => (env.postgres_host.as_str(), 5432),
        };

        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .username(&env.postgres_user)
            .password(&env.postgres_password)
            .database(&env.postgres_database)
            .application_name(env!("CARGO_PKG_NAME"));

        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .min_connections(pg.min_connections)
            .max_lifetime(Duration::from_secs(pg.max_lifetime))
            .idle_timeout(Duration::from_secs(pg.idle_timeout))
            .acquire_timeout(Duration::from_secs(pg.timeout))
            .connect_with(options)
            .await?;

        debug!("Executing test query on PostgreSQL");
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => info!("PostgreSQL connection successful"),
            Err(e) => {
                error!("Failed to connect to PostgreSQL: {}", e);
                return Err(e);
            }
        }

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
