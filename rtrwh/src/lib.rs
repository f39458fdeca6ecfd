//! # rtrwh: Rooftop Rainwater Harvesting Assessment API
//!
//! `rtrwh` estimates how much rainwater a roof can collect over a year and recommends a
//! groundwater recharge structure sized to the roof.
//!
//! ## Overview
//!
//! A client posts a roof area and, optionally, a location. The service looks up a year of daily
//! precipitation for that location from a historical weather archive, computes the harvestable
//! volume and picks a recharge structure from a fixed table. Every successful assessment is
//! appended to a local SQLite database so the service can report community totals.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); persistence is SQLite through
//! [sqlx]; rainfall comes from an Open-Meteo compatible archive over [reqwest].
//!
//! ### Request Flow
//!
//! `POST /assess` deserializes and validates the body, substitutes the configured default location
//! for missing coordinates, fetches the daily series through [`rainfall::RainfallClient`], runs the
//! pure computation in [`assessment`] and stores the row through [`db::Storage`]. Nothing is stored
//! when the rainfall lookup fails. `GET /stats` aggregates the stored rows.
//!
//! ## Modules
//!
//! - [`api`]: HTTP handlers and request/response models
//! - [`assessment`]: rainfall totals, captured volume and structure recommendation
//! - [`rainfall`]: client for the upstream precipitation archive
//! - [`db`]: SQLite storage and repositories
//! - [`config`]: YAML + environment configuration
//! - [`errors`]: error type and its HTTP rendering
//! - [`telemetry`]: tracing subscriber setup
//!
//! ## Getting Started
//!
//! ```bash
//! # Run with defaults (binds 0.0.0.0:8000, writes ./rtrwh.db)
//! cargo run
//!
//! # Point at a different config file
//! cargo run -- -f /etc/rtrwh/config.yaml
//! ```
//!
//! API documentation is served at `/docs` once the server is running.

pub mod api;
pub mod assessment;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod rainfall;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::handlers::{assessments, service},
    config::CorsOrigin,
    db::Storage,
    openapi::ApiDoc,
    rainfall::RainfallClient,
};
use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// - `storage`: SQLite-backed assessment store
/// - `rainfall`: client for the precipitation archive
/// - `config`: configuration loaded at startup
///
/// ```ignore
/// let state = AppState::builder()
///     .storage(storage)
///     .rainfall(Arc::new(rainfall))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub storage: Storage,
    pub rainfall: Arc<RainfallClient>,
    pub config: Config,
}

/// Get the rtrwh database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;

    // A literal "*" in an origin list is rejected by tower-http, so wildcard means Any
    let allow_origin = if cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::from(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new().allow_origin(allow_origin).allow_methods(Any).allow_headers(Any);

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/`, `/healthz`: service banner and liveness
/// - `/assess`, `/stats`: the assessment API
/// - `/api-docs/openapi.json`, `/docs`: OpenAPI document and its rendered view
/// - `/internal/metrics`: Prometheus metrics, when enabled
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route("/", get(service::root))
        .route("/healthz", get(service::healthz))
        .route("/assess", post(assessments::create_assessment))
        .route("/stats", get(assessments::get_stats))
        .with_state(state)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assessment service: storage, rainfall client and router, ready to serve.
///
/// ```no_run
/// # use rtrwh::{Application, Config};
/// # async fn example(config: Config) -> anyhow::Result<()> {
/// let app = Application::new(config).await?;
/// app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
/// # }
/// ```
pub struct Application {
    router: Router,
    config: Config,
    storage: Storage,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, reusing `pool` instead of opening `config.database.path` if given
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting assessment service with configuration: {:#?}", config);

        let storage = match pool {
            Some(pool) => Storage::from_pool(pool),
            None => Storage::connect(&config.database).await?,
        };
        storage.initialize().await?;

        let rainfall = RainfallClient::new(config.rainfall.clone())?;

        let app_state = AppState::builder()
            .storage(storage.clone())
            .rainfall(Arc::new(rainfall))
            .config(config.clone())
            .build();

        let router = build_router(app_state)?;

        Ok(Self { router, config, storage })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Assessment API listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.storage.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::StatusCode;
    use serde_json::Value;
    use wiremock::MockServer;

    #[sqlx::test]
    async fn test_cors_allows_any_origin_by_default(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let server = create_test_app(pool, &mock_server).await;

        let response = server.get("/stats").add_header("origin", "https://harvest.example.org").await;

        response.assert_status_ok();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[sqlx::test]
    async fn test_cors_preflight_for_assess(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let server = create_test_app(pool, &mock_server).await;

        let response = server
            .method(axum::http::Method::OPTIONS, "/assess")
            .add_header("origin", "http://localhost:5173")
            .add_header("access-control-request-method", "POST")
            .add_header("access-control-request-headers", "content-type")
            .await;

        response.assert_status_ok();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[sqlx::test]
    async fn test_cors_restricted_origins(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let mut config = create_test_config(&mock_server);
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://harvest.example.org".parse().unwrap())];
        config.cors.max_age = Some(600);
        let server = Application::new_with_pool(config, Some(pool)).await.unwrap().into_test_server();

        let allowed = server.get("/").add_header("origin", "https://harvest.example.org").await;
        assert_eq!(
            allowed.headers().get("access-control-allow-origin").unwrap(),
            "https://harvest.example.org"
        );

        let denied = server.get("/").add_header("origin", "https://elsewhere.example.com").await;
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }

    #[sqlx::test]
    async fn test_openapi_json_and_docs(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let server = create_test_app(pool, &mock_server).await;

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc: Value = response.json();
        assert!(doc["openapi"].is_string());
        assert!(doc["paths"]["/assess"]["post"].is_object());
        assert!(doc["paths"]["/stats"]["get"].is_object());

        let docs = server.get("/docs").await;
        docs.assert_status_ok();
        assert!(docs.text().contains("<html"));
    }

    #[sqlx::test]
    async fn test_metrics_endpoint_disabled_by_default(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let server = create_test_app(pool, &mock_server).await;

        server.get("/internal/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_build_router_with_metrics_enabled(pool: SqlitePool) {
        let mock_server = MockServer::start().await;
        let mut config = create_test_config(&mock_server);
        config.enable_metrics = true;
        let server = Application::new_with_pool(config, Some(pool)).await.unwrap().into_test_server();

        server.get("/healthz").await.assert_status_ok();

        let response = server.get("/internal/metrics").await;
        response.assert_status_ok();
        assert!(response.text().contains("axum_http_requests"));
    }

    #[tokio::test]
    async fn test_application_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        let mut config = create_test_config(&mock_server);
        config.database.path = dir.path().join("assessments.db");

        let server = Application::new(config).await.unwrap().into_test_server();

        assert!(dir.path().join("assessments.db").exists());
        server.get("/stats").await.assert_status_ok();
    }
}
