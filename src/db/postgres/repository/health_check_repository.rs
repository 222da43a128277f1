use crate::db::postgres::connection::PostgresConnection;
use async_trait::async_trait;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::warn;

/// Tables the service cannot run without.
const REQUIRED_TABLES: [&str; 3] = ["zones", "watchlists", "decode_lists"];

#[async_trait]
pub trait TraitHealthCheckRepository {
    /// True when the database answers and every service table exists
    async fn check(&self) -> Result<bool, SqlxError>;
}

pub struct StructHealthCheckRepository {
    connection: Arc<PostgresConnection>,
}

impl StructHealthCheckRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitHealthCheckRepository for StructHealthCheckRepository {
    async fn check(&self) -> Result<bool, SqlxError> {
        let pool = self.connection.get_pool();

        let missing: Vec<String> = sqlx::query_scalar(
            "SELECT t FROM UNNEST($1::TEXT[]) AS t WHERE to_regclass(t) IS NULL",
        )
        .bind(&REQUIRED_TABLES[..])
        .fetch_all(pool)
        .await?;

        if !missing.is_empty() {
            warn!("PostgreSQL is missing tables: {}", missing.join(", "));
        }
        Ok(missing.is_empty())
    }
}
