use crate::helpers::{reading, spawn_app, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use climate_api::{Error, TripStats};
use hyper::{Method, StatusCode};
use serde_json::{from_slice, json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.expect("Failed to execute request.");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

#[tokio::test]
async fn precipitation_returns_daily_totals_keyed_by_date() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_daily_precipitation()
        .withf(|start_date| start_date == "2016-08-23")
        .times(1)
        .returning(|_| {
            Ok(vec![
                reading("2017-01-01", Some(0.8)),
                reading("2017-01-02", None),
            ])
        });
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"2017-01-01": 0.8, "2017-01-02": null}));
}

#[tokio::test]
async fn precipitation_keeps_last_value_for_duplicate_dates() {
    let mut climate_db = MockClimateAccess::new();
    climate_db.expect_daily_precipitation().returning(|_| {
        Ok(vec![
            reading("2017-01-01", Some(0.1)),
            reading("2017-01-01", Some(0.4)),
        ])
    });
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"2017-01-01": 0.4}));
}

#[tokio::test]
async fn precipitation_with_no_data_returns_empty_object() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_daily_precipitation()
        .returning(|_| Ok(vec![]));
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn stations_lists_every_station_in_store_order() {
    let mut climate_db = MockClimateAccess::new();
    climate_db.expect_active_stations().times(1).returning(|| {
        Ok(vec![
            String::from("USC00519397"),
            String::from("USC00519281"),
        ])
    });
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["USC00519397", "USC00519281"]));
}

#[tokio::test]
async fn tobs_queries_most_active_station_over_last_year() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_daily_temperatures()
        .withf(|start_date, station_id| {
            start_date == "2016-08-23" && station_id == "USC00519281"
        })
        .times(1)
        .returning(|_, _| Ok(vec![reading("2016-08-24", Some(79.0))]));
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"2016-08-24": 79.0}));
}

#[tokio::test]
async fn trip_defaults_end_date_to_dataset_end() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start_date, end_date| start_date == "2017-01-01" && end_date == "2017-08-23")
        .times(1)
        .returning(|_, _| {
            Ok(Some(TripStats {
                min: 62.0,
                average: 69.5,
                max: 80.0,
            }))
        });
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/trip/2017-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"Min": 62.0, "Average": 69.5, "Max": 80.0}]));
}

#[tokio::test]
async fn trip_honors_explicit_end_date() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start_date, end_date| start_date == "2017-01-01" && end_date == "2017-01-01")
        .times(1)
        .returning(|_, _| {
            Ok(Some(TripStats {
                min: 68.0,
                average: 69.0,
                max: 70.0,
            }))
        });
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/trip/2017-01-01/2017-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"Min": 68.0, "Average": 69.0, "Max": 70.0}]));
}

#[tokio::test]
async fn trip_answers_404_when_range_matches_nothing() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .returning(|_, _| Ok(None));
    let test_app = spawn_app(Arc::new(climate_db));

    // Reversed range: the store filter yields zero rows, same as dates
    // entirely outside the dataset or malformed date strings.
    let (status, body) = get(test_app.app, "/api/v1.0/trip/2017-08-23/2016-08-23").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": "Invalid date range or dates not formatted as YYYY-MM-DD."})
    );
}

#[tokio::test]
async fn store_failure_maps_to_500() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_daily_precipitation()
        .returning(|_| Err(Error::Query(sqlx::Error::PoolClosed)));
    let test_app = spawn_app(Arc::new(climate_db));

    let (status, body) = get(test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to query the climate dataset."}));
}

#[tokio::test]
async fn index_lists_available_routes() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = test_app
        .app
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/stations"));
    assert!(html.contains("/api/v1.0/tobs"));
    assert!(html.contains("/api/v1.0/trip/yyyy-mm-dd/yyyy-mm-dd"));
}
