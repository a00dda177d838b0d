use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

/// Start of the reporting window: one year before the latest observation in
/// the snapshot. A property of the loaded dataset, not computed at runtime.
pub const OBSERVATION_WINDOW_START: &str = "2016-08-23";

/// Latest observation date in the snapshot; default upper bound for trip
/// statistics when the caller omits an end date.
pub const TRIP_END_DEFAULT: &str = "2017-08-23";

/// Station with the most complete temperature record in the dataset.
pub const MOST_ACTIVE_STATION: &str = "USC00519281";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
}

/// One date keyed aggregate from the measurement table. `value` is None when
/// every contributing row was NULL; that surfaces as JSON null rather than
/// being dropped or coerced to zero.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyReading {
    pub date: String,
    pub value: Option<f64>,
}

/// Min/average/max temperature over an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TripStats {
    pub min: f64,
    pub average: f64,
    pub max: f64,
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Daily precipitation totals summed across all stations, for dates on or
    /// after `start_date`, ascending by date.
    async fn daily_precipitation(&self, start_date: &str) -> Result<Vec<DailyReading>, Error>;
    /// Every station that appears in the measurement table, in whatever order
    /// the grouping produces.
    async fn active_stations(&self) -> Result<Vec<String>, Error>;
    /// Daily temperature observations for one station, for dates on or after
    /// `start_date`, ascending by date.
    async fn daily_temperatures(
        &self,
        start_date: &str,
        station_id: &str,
    ) -> Result<Vec<DailyReading>, Error>;
    /// Single min/avg/max aggregate over `[start_date, end_date]`. Returns
    /// None when no row falls in the range, which covers reversed ranges,
    /// out-of-range dates, and strings sqlite cannot compare meaningfully.
    async fn temperature_stats(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Option<TripStats>, Error>;
}

pub struct ClimateAccess {
    pool: SqlitePool,
}

impl ClimateAccess {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn daily_precipitation(&self, start_date: &str) -> Result<Vec<DailyReading>, Error> {
        // SUM skips NULL prcp values; a date where every station reported
        // NULL comes back as NULL, not 0.
        let readings = sqlx::query_as::<_, DailyReading>(
            "SELECT date, SUM(prcp) AS value
             FROM measurement
             WHERE date >= ?1
             GROUP BY date
             ORDER BY date",
        )
        .bind(start_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }

    async fn active_stations(&self) -> Result<Vec<String>, Error> {
        let stations = sqlx::query_scalar::<_, String>(
            "SELECT station FROM measurement GROUP BY station",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stations)
    }

    async fn daily_temperatures(
        &self,
        start_date: &str,
        station_id: &str,
    ) -> Result<Vec<DailyReading>, Error> {
        let readings = sqlx::query_as::<_, DailyReading>(
            "SELECT date, tobs AS value
             FROM measurement
             WHERE date >= ?1 AND station = ?2
             GROUP BY date
             ORDER BY date",
        )
        .bind(start_date)
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }

    async fn temperature_stats(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Option<TripStats>, Error> {
        // An ungrouped aggregate always yields one row; the aggregates are
        // NULL when no measurement falls inside the range.
        let (min, average, max): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
             FROM measurement
             WHERE date >= ?1 AND date <= ?2",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        match (min, average, max) {
            (Some(min), Some(average), Some(max)) => Ok(Some(TripStats { min, average, max })),
            _ => Ok(None),
        }
    }
}
