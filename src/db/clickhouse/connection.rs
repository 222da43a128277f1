use crate::env_config::models::app_setting::AppSettings;
use clickhouse::Client;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct ClickhouseConnection {
    client: Client,
}

impl ClickhouseConnection {
    pub async fn new(settings: Arc<AppSettings>) -> Result<Self, clickhouse::error::Error> {
        info!("Initializing ClickHouse connection...");

        let env = &settings.app_env;
        let timeout = settings.app_config.clickhouse.timeout.to_string();
        let client = Client::default()
            .with_url(&env.clickhouse_url)
            .with_user(&env.clickhouse_user)
            .with_password(&env.clickhouse_password)
            .with_database(&env.clickhouse_database)
            .with_option("connect_timeout", timeout.clone())
            .with_option("receive_timeout", timeout.clone())
            .with_option("max_execution_time", timeout);

        let version = match client.query("SELECT version()").fetch_one::<String>().await {
            Ok(version) => version,
            Err(e) => {
                error!("Failed to connect to ClickHouse: {}", e);
                return Err(e);
            }
        };
        info!("ClickHouse connection successful, server {}", version);

        let table = &settings.app_config.market.candles_table;
        debug!("Checking candle table {}", table);
        let exists = client
            .query(&format!("EXISTS TABLE {}", table))
            .fetch_one::<u8>()
            .await?;
        if exists == 0 {
            warn!("Candle table {} does not exist, candle queries will fail", table);
        }

        Ok(Self { client })
    }

    pub fn get_client(&self) -> Client {
        self.client.clone()
    }
}
