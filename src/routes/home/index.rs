use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::AppState;

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let base = &state.remote_url;
    Html(format!(
        "Available Routes for Hawaii Weather Data:<br/><br>\
         -- Daily Precipitation Totals for Last Year: <a href=\"{base}/api/v1.0/precipitation\">/api/v1.0/precipitation</a><br/>\
         -- Active Weather Stations: <a href=\"{base}/api/v1.0/stations\">/api/v1.0/stations</a><br/>\
         -- Daily Temperature Observations for Station USC00519281 for Last Year: <a href=\"{base}/api/v1.0/tobs\">/api/v1.0/tobs</a><br/>\
         -- Min, Average & Max Temperatures for Date Range: /api/v1.0/trip/yyyy-mm-dd/yyyy-mm-dd<br>\
         NOTE: If no end-date is provided, the trip api calculates stats through 08/23/17<br>"
    ))
}
