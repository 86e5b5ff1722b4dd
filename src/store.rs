use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::models::StoredAvailability;
use crate::utils::error::Result;

/// Result shape of a keyed lookup. `Ambiguous` means the store returned
/// more than one row for a natural key, which violates the uniqueness
/// invariant and is treated as corruption by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    NotFound,
    Found(StoredAvailability),
    Ambiguous,
}

/// Durable mapping from (name, size) to last-known availability, backed
/// by a single local SQLite file. Single writer, one pass per run; each
/// statement commits independently.
pub struct AvailabilityStore {
    pool: SqlitePool,
}

impl AvailabilityStore {
    /// Open the database file, creating it on first run.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Idempotent schema setup; re-running must never clear existing rows.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS product (
                name TEXT NOT NULL,
                size TEXT NOT NULL,
                available BOOLEAN NOT NULL,
                created_at TEXT NOT NULL,
                last_modified TEXT NOT NULL,
                PRIMARY KEY (name, size)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn lookup(&self, name: &str, size: &str) -> Result<Lookup> {
        let mut rows = sqlx::query_as::<_, StoredAvailability>(
            r#"
            SELECT name, size, available, created_at, last_modified
            FROM product
            WHERE name = ? AND size = ?
            "#,
        )
        .bind(name)
        .bind(size)
        .fetch_all(&self.pool)
        .await?;

        Ok(match rows.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(rows.remove(0)),
            _ => Lookup::Ambiguous,
        })
    }

    /// First observation of a (name, size) pair: both timestamps are set
    /// to the observation time.
    pub async fn insert(&self, record: &StoredAvailability) -> Result<()> {
        debug!(name = %record.name, size = %record.size, available = record.available, "inserting record");
        sqlx::query(
            r#"
            INSERT INTO product (name, size, available, created_at, last_modified)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.name)
        .bind(&record.size)
        .bind(record.available)
        .bind(record.created_at)
        .bind(record.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrite availability and last-modified for an existing row;
    /// created_at is left untouched.
    pub async fn update(
        &self,
        name: &str,
        size: &str,
        available: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        debug!(%name, %size, available, "updating record");
        sqlx::query(
            r#"
            UPDATE product
            SET available = ?, last_modified = ?
            WHERE name = ? AND size = ?
            "#,
        )
        .bind(available)
        .bind(now)
        .bind(name)
        .bind(size)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All stored records, ordered by natural key.
    pub async fn all(&self) -> Result<Vec<StoredAvailability>> {
        let rows = sqlx::query_as::<_, StoredAvailability>(
            r#"
            SELECT name, size, available, created_at, last_modified
            FROM product
            ORDER BY name, size
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
