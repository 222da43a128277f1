// src/db/postgres/repository/decode_list_repository.rs
use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::decode_list::PgDecodeListEntry;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait TraitDecodeListRepository {
    /// Queues symbols for an Execute Day; already queued symbols are left alone
    async fn add(
        &self,
        execute_day: NaiveDate,
        symbols: &[String],
        fetch_day: NaiveDate,
    ) -> Result<u64, SqlxError>;

    async fn get(&self, execute_day: NaiveDate) -> Result<Vec<PgDecodeListEntry>, SqlxError>;
}

pub struct StructDecodeListRepository {
    connection: Arc<PostgresConnection>,
}

impl StructDecodeListRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitDecodeListRepository for StructDecodeListRepository {
    async fn add(
        &self,
        execute_day: NaiveDate,
        symbols: &[String],
        fetch_day: NaiveDate,
    ) -> Result<u64, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query(
            "INSERT INTO decode_lists (execute_day, symbol, fetch_day)
             SELECT $1, s, $3 FROM UNNEST($2::TEXT[]) AS s
             ON CONFLICT (execute_day, symbol) DO NOTHING",
        )
        .bind(execute_day)
        .bind(symbols)
        .bind(fetch_day)
        .execute(pool)
        .await?;

        debug!(
            "Queued {} of {} symbols for {}",
            result.rows_affected(),
            symbols.len(),
            execute_day
        );
        Ok(result.rows_affected())
    }

    async fn get(&self, execute_day: NaiveDate) -> Result<Vec<PgDecodeListEntry>, SqlxError> {
        let pool = self.connection.get_pool();

        sqlx::query_as::<_, PgDecodeListEntry>(
            "SELECT symbol, fetch_day FROM decode_lists
             WHERE execute_day = $1
             ORDER BY added_at, symbol",
        )
        .bind(execute_day)
        .fetch_all(pool)
        .await
    }
}
