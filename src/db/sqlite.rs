use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

/// Handle to the pre-loaded climate snapshot. The dataset is owned by an
/// external bootstrap process; this service only ever reads it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .with_context(|| format!("Invalid sqlite path: {path}"))?
            .read_only(true)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self { pool };
        db.verify_schema().await?;
        info!("SQLite climate dataset opened read-only at: {}", path);

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Confirm connectivity and that the snapshot carries the two expected
    /// tables with the measurement columns the queries rely on. Runs once at
    /// startup before the router accepts requests.
    async fn verify_schema(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        for table in ["measurement", "station"] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to inspect schema for table '{table}'"))?;

            if count == 0 {
                anyhow::bail!("Dataset is missing expected table '{table}'");
            }
        }

        sqlx::query("SELECT station, date, prcp, tobs FROM measurement LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("Measurement table does not match the expected shape")?;

        Ok(())
    }
}
