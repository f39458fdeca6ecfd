//! Test utilities for handler and application tests.

use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::time::Duration;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::config::{Config, RainfallConfig};

/// Build an application on the per-test pool with rainfall served by `mock_server`.
pub async fn create_test_app(pool: SqlitePool, mock_server: &MockServer) -> TestServer {
    let config = create_test_config(mock_server);

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config(mock_server: &MockServer) -> Config {
    Config {
        rainfall: RainfallConfig {
            base_url: Url::parse(&format!("{}/v1/archive", mock_server.uri())).expect("mock server uri"),
            timeout: Duration::from_secs(2),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Serve `precipitation_sum` for every archive request.
pub async fn mock_rainfall(mock_server: &MockServer, precipitation_sum: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 28.625,
            "longitude": 77.25,
            "timezone": "Asia/Kolkata",
            "daily_units": { "precipitation_sum": "mm" },
            "daily": { "precipitation_sum": precipitation_sum }
        })))
        .mount(mock_server)
        .await;
}
