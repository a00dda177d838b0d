use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use utoipa::ToSchema;

use crate::{
    db, AppState, TripStats, MOST_ACTIVE_STATION, OBSERVATION_WINDOW_START, TRIP_END_DEFAULT,
};

/// Fixed body for the trip endpoints when the range matches no observations.
/// Reversed ranges, out-of-range dates, and unparseable date strings all
/// produce zero rows at the store and are deliberately indistinguishable here.
pub const INVALID_RANGE_MESSAGE: &str =
    "Invalid date range or dates not formatted as YYYY-MM-DD.";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

fn store_error(err: db::Error) -> (StatusCode, Json<ErrorBody>) {
    error!("error querying climate dataset: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: String::from("Failed to query the climate dataset."),
        }),
    )
}

/// Build a date keyed map from rows already sorted ascending by date. Insert
/// overwrites, so if the same date were ever emitted twice only the last
/// occurrence survives. Callers depend on that collapse; do not "fix" it by
/// rejecting duplicates.
fn into_date_map(readings: Vec<db::DailyReading>) -> BTreeMap<String, Option<f64>> {
    let mut map = BTreeMap::new();
    for reading in readings {
        map.insert(reading.date, reading.value);
    }
    map
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Daily precipitation totals for the last year of data, keyed by date; dates with only NULL readings map to null"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset", body = ErrorBody)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, (StatusCode, Json<ErrorBody>)> {
    let readings = state
        .climate_db
        .daily_precipitation(OBSERVATION_WINDOW_START)
        .await
        .map_err(store_error)?;

    Ok(Json(into_date_map(readings)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station with at least one observation", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset", body = ErrorBody)
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ErrorBody>)> {
    let stations = state
        .climate_db
        .active_stations()
        .await
        .map_err(store_error)?;

    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Daily temperature observations for station USC00519281 for the last year of data, keyed by date"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset", body = ErrorBody)
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, (StatusCode, Json<ErrorBody>)> {
    let readings = state
        .climate_db
        .daily_temperatures(OBSERVATION_WINDOW_START, MOST_ACTIVE_STATION)
        .await
        .map_err(store_error)?;

    Ok(Json(into_date_map(readings)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/trip/{start_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive start date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min/average/max temperature from start date through the end of the dataset", body = Vec<TripStats>),
        (status = NOT_FOUND, description = "No observations in range", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset", body = ErrorBody)
    ))]
pub async fn trip(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<Vec<TripStats>>, (StatusCode, Json<ErrorBody>)> {
    trip_stats(&state, &start_date, TRIP_END_DEFAULT).await
}

#[utoipa::path(
    get,
    path = "/api/v1.0/trip/{start_date}/{end_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive start date, YYYY-MM-DD"),
        ("end_date" = String, Path, description = "Inclusive end date, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min/average/max temperature over the date range", body = Vec<TripStats>),
        (status = NOT_FOUND, description = "No observations in range", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset", body = ErrorBody)
    ))]
pub async fn trip_with_end(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<TripStats>>, (StatusCode, Json<ErrorBody>)> {
    trip_stats(&state, &start_date, &end_date).await
}

async fn trip_stats(
    state: &AppState,
    start_date: &str,
    end_date: &str,
) -> Result<Json<Vec<TripStats>>, (StatusCode, Json<ErrorBody>)> {
    let stats = state
        .climate_db
        .temperature_stats(start_date, end_date)
        .await
        .map_err(store_error)?;

    match stats {
        // Wrapped in an array for symmetry with the other endpoints even
        // though exactly one record is ever produced.
        Some(stats) => Ok(Json(vec![stats])),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: String::from(INVALID_RANGE_MESSAGE),
            }),
        )),
    }
}
