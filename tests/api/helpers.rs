use async_trait::async_trait;
use axum::Router;
use climate_api::{app, AppState, ClimateData, DailyReading, Error, TripStats};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub ClimateAccess {}

    #[async_trait]
    impl ClimateData for ClimateAccess {
        async fn daily_precipitation(&self, start_date: &str) -> Result<Vec<DailyReading>, Error>;
        async fn active_stations(&self) -> Result<Vec<String>, Error>;
        async fn daily_temperatures(
            &self,
            start_date: &str,
            station_id: &str,
        ) -> Result<Vec<DailyReading>, Error>;
        async fn temperature_stats(
            &self,
            start_date: &str,
            end_date: &str,
        ) -> Result<Option<TripStats>, Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = AppState {
        remote_url: String::from("http://localhost:5000"),
        climate_db,
    };

    TestApp {
        app: app(app_state),
    }
}

pub fn reading(date: &str, value: Option<f64>) -> DailyReading {
    DailyReading {
        date: date.to_string(),
        value,
    }
}
