//! Client for the historical rainfall archive.
//!
//! One GET per lookup against an Open-Meteo compatible archive endpoint:
//!
//! ```text
//! GET {base_url}?latitude=..&longitude=..&start_date=2024-01-01&end_date=2024-12-31
//!               &daily=precipitation_sum&timezone=Asia/Kolkata
//! ```
//!
//! The body is expected to contain `daily.precipitation_sum`, an array of nullable daily totals
//! in millimetres. Nulls are kept as `None` so the caller decides how to treat missing days.
//!
//! Each attempt is bounded by `rainfall.timeout`. Whether a failed attempt is repeated is up to
//! the [`RetryPolicy`]; the default configuration makes exactly one attempt.

pub mod retry;

use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{config::RainfallConfig, types::Coordinates};
pub use retry::{FixedBackoff, RetryPolicy};

/// Daily precipitation totals (mm), one entry per day, `None` where the archive has no value.
pub type DailyPrecipitation = Vec<Option<f64>>;

#[derive(Error, Debug)]
pub enum RainfallError {
    /// The archive answered with a non-success status
    #[error("Rainfall archive returned HTTP {status}")]
    Status { status: StatusCode },

    /// No complete response within the configured timeout
    #[error("Rainfall archive did not respond within the timeout")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("Rainfall archive request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The body was not the expected JSON document
    #[error("Rainfall archive response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    /// The HTTP client itself could not be constructed
    #[error("Failed to build rainfall HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RainfallError {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RainfallError::Timeout
        } else {
            RainfallError::Transport(err)
        }
    }

    fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RainfallError::Timeout
        } else {
            RainfallError::Decode(err)
        }
    }

    /// Worth another attempt: timeouts, connection failures, 5xx, 408 and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            RainfallError::Timeout | RainfallError::Transport(_) => true,
            RainfallError::Status { status } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS || *status == StatusCode::REQUEST_TIMEOUT
            }
            RainfallError::Decode(_) | RainfallError::Client(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: Option<DailySection>,
}

#[derive(Debug, Deserialize)]
struct DailySection {
    #[serde(default)]
    precipitation_sum: DailyPrecipitation,
}

/// HTTP client for the rainfall archive. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct RainfallClient {
    http: reqwest::Client,
    config: RainfallConfig,
    retry: Arc<dyn RetryPolicy>,
}

impl RainfallClient {
    /// Client using the retry policy described by `config.retry`.
    pub fn new(config: RainfallConfig) -> Result<Self, RainfallError> {
        let retry = Arc::new(FixedBackoff::from(&config.retry));
        Self::with_retry_policy(config, retry)
    }

    pub fn with_retry_policy(config: RainfallConfig, retry: Arc<dyn RetryPolicy>) -> Result<Self, RainfallError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RainfallError::Client)?;

        Ok(Self { http, config, retry })
    }

    /// Full archive URL for a location, including the fixed query window.
    pub fn request_url(&self, coordinates: Coordinates) -> Url {
        let mut url = self.config.base_url.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &coordinates.lat.to_string())
            .append_pair("longitude", &coordinates.lng.to_string())
            .append_pair("start_date", &self.config.start_date.to_string())
            .append_pair("end_date", &self.config.end_date.to_string())
            .append_pair("daily", "precipitation_sum")
            .append_pair("timezone", &self.config.timezone);
        url
    }

    /// Fetch the daily precipitation series for `coordinates`.
    #[instrument(skip(self), fields(lat = coordinates.lat, lng = coordinates.lng), err)]
    pub async fn fetch_daily_precipitation(&self, coordinates: Coordinates) -> Result<DailyPrecipitation, RainfallError> {
        let url = self.request_url(coordinates);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let error = match self.fetch_once(&url).await {
                Ok(series) => {
                    debug!(days = series.len(), attempts, "Fetched daily precipitation");
                    return Ok(series);
                }
                Err(e) => e,
            };

            match self.retry.next_delay(attempts, &error) {
                Some(delay) => {
                    warn!(attempts, error = %error, "Rainfall fetch failed, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    metrics::counter!("rtrwh_rainfall_fetch_failures_total").increment(1);
                    return Err(error);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<DailyPrecipitation, RainfallError> {
        let response = self.http.get(url.clone()).send().await.map_err(RainfallError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RainfallError::Status { status });
        }

        let body: ArchiveResponse = response.json().await.map_err(RainfallError::from_body)?;
        Ok(body.daily.map(|daily| daily.precipitation_sum).unwrap_or_default())
    }
}
