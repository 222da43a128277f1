// src/db/postgres/repository/watchlist_repository.rs
use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::watchlist::PgWatchlist;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[async_trait]
pub trait TraitWatchlistRepository {
    /// Saves a watchlist, replacing any existing one with the same name
    async fn save(
        &self,
        name: &str,
        description: &str,
        execute_day: NaiveDate,
        fetch_day: NaiveDate,
        symbols: &[String],
    ) -> Result<PgWatchlist, SqlxError>;

    /// All watchlists, most recently updated first
    async fn list(&self) -> Result<Vec<PgWatchlist>, SqlxError>;

    async fn get(&self, name: &str) -> Result<Option<PgWatchlist>, SqlxError>;

    async fn delete(&self, name: &str) -> Result<bool, SqlxError>;
}

pub struct StructWatchlistRepository {
    connection: Arc<PostgresConnection>,
}

impl StructWatchlistRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitWatchlistRepository for StructWatchlistRepository {
    async fn save(
        &self,
        name: &str,
        description: &str,
        execute_day: NaiveDate,
        fetch_day: NaiveDate,
        symbols: &[String],
    ) -> Result<PgWatchlist, SqlxError> {
        let pool = self.connection.get_pool();

        let watchlist = sqlx::query_as::<_, PgWatchlist>(
            "INSERT INTO watchlists
                 (id, name, description, execute_day, fetch_day, symbols, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (name)
             DO UPDATE SET description = $3, execute_day = $4, fetch_day = $5,
                           symbols = $6, updated_at = NOW()
             RETURNING id, name, description, execute_day, fetch_day, symbols, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(execute_day)
        .bind(fetch_day)
        .bind(symbols)
        .fetch_one(pool)
        .await?;

        info!("Saved watchlist '{}' with {} symbols", name, symbols.len());
        Ok(watchlist)
    }

    async fn list(&self) -> Result<Vec<PgWatchlist>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, PgWatchlist>(
            "SELECT id, name, description, execute_day, fetch_day, symbols, updated_at
             FROM watchlists
             ORDER BY updated_at DESC",
        )
        .fetch_all(pool)
        .await?;

        debug!("Fetched {} watchlists", result.len());
        Ok(result)
    }

    async fn get(&self, name: &str) -> Result<Option<PgWatchlist>, SqlxError> {
        let pool = self.connection.get_pool();

        sqlx::query_as::<_, PgWatchlist>(
            "SELECT id, name, description, execute_day, fetch_day, symbols, updated_at
             FROM watchlists
             WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    async fn delete(&self, name: &str) -> Result<bool, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query("DELETE FROM watchlists WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted watchlist '{}'", name);
        } else {
            debug!("No watchlist named '{}' to delete", name);
        }

        Ok(result.rows_affected() > 0)
    }
}
