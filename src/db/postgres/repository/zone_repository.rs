// src/db/postgres/repository/zone_repository.rs
use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::zone::PgZone;
use crate::domain::Zone;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Error as SqlxError, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, error, info};

#[async_trait]
pub trait TraitZoneRepository {
    /// Zones of one symbol on one Fetch Day, ordered by zone_type then zone_low
    async fn get_zones(&self, symbol: &str, fetch_date: NaiveDate) -> Result<Vec<Zone>, SqlxError>;

    /// Inserts unless the identity key already exists; returns whether a row was written
    async fn insert_zone(&self, zone: &Zone) -> Result<bool, SqlxError>;

    /// Manual override: drops every zone of (symbol, fetch_date) and stores `zone`
    async fn replace_zones(
        &self,
        symbol: &str,
        fetch_date: NaiveDate,
        zone: &Zone,
    ) -> Result<bool, SqlxError>;
}

pub struct StructZoneRepository {
    connection: Arc<PostgresConnection>,
}

impl StructZoneRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

const INSERT_ZONE: &str = "INSERT INTO zones
    (symbol, fetch_date, timeframe, zone_type, zone_low, zone_high,
     impulse_strength, impulse_start_time, impulse_end_time)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    zone: &Zone,
    on_conflict: &str,
) -> Result<u64, SqlxError> {
    let sql = format!("{} {}", INSERT_ZONE, on_conflict);
    let result = sqlx::query(&sql)
        .bind(&zone.symbol)
        .bind(zone.fetch_date)
        .bind(zone.timeframe.as_str())
        .bind(zone.zone_type.as_str())
        .bind(zone.zone_low)
        .bind(zone.zone_high)
        .bind(zone.impulse_strength.as_str())
        .bind(zone.impulse_start_time)
        .bind(zone.impulse_end_time)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl TraitZoneRepository for StructZoneRepository {
    async fn get_zones(&self, symbol: &str, fetch_date: NaiveDate) -> Result<Vec<Zone>, SqlxError> {
        let pool = self.connection.get_pool();

        let rows = sqlx::query_as::<_, PgZone>(
            "SELECT id, symbol, fetch_date, timeframe, zone_type, zone_low, zone_high,
                    impulse_strength, impulse_start_time, impulse_end_time
             FROM zones
             WHERE symbol = $1 AND fetch_date = $2
             ORDER BY zone_type, zone_low",
        )
        .bind(symbol)
        .bind(fetch_date)
        .fetch_all(pool)
        .await?;

        let zones = rows
            .into_iter()
            .map(|row| Zone::try_from(row).map_err(|e| SqlxError::Decode(Box::new(e))))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Found {} zones for {} on {}", zones.len(), symbol, fetch_date);
        Ok(zones)
    }

    async fn insert_zone(&self, zone: &Zone) -> Result<bool, SqlxError> {
        let pool = self.connection.get_pool();
        let mut tx = pool.begin().await?;

        let inserted = insert_in_tx(&mut tx, zone, "ON CONFLICT DO NOTHING").await?;
        tx.commit().await?;

        if inserted > 0 {
            info!(
                "Saved {} zone for {} on {}: {:.2} - {:.2}",
                zone.zone_type, zone.symbol, zone.fetch_date, zone.zone_low, zone.zone_high
            );
        } else {
            debug!(
                "Zone for {} on {} already stored, insert ignored",
                zone.symbol, zone.fetch_date
            );
        }

        Ok(inserted > 0)
    }

    async fn replace_zones(
        &self,
        symbol: &str,
        fetch_date: NaiveDate,
        zone: &Zone,
    ) -> Result<bool, SqlxError> {
        let pool = self.connection.get_pool();
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM zones WHERE symbol = $1 AND fetch_date = $2")
            .bind(symbol)
            .bind(fetch_date)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        match insert_in_tx(&mut tx, zone, "").await {
            Ok(_) => {
                tx.commit().await?;
                info!(
                    "Replaced {} zones for {} on {} with manual {} zone {:.2} - {:.2}",
                    deleted, symbol, fetch_date, zone.zone_type, zone.zone_low, zone.zone_high
                );
                Ok(true)
            }
            Err(e) => {
                error!("Error replacing zones for {} on {}: {}", symbol, fetch_date, e);
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}
