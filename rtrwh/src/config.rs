//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `RTRWH_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`); every field has a
//!    default, so a missing file is valid
//! 2. **Environment variables** - Variables prefixed with `RTRWH_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `RTRWH_RAINFALL__TIMEOUT=5s` sets the `rainfall.timeout` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use rtrwh::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Database**: `database.path`, `database.max_connections`, `database.busy_timeout` - SQLite storage
//! - **Rainfall**: `rainfall.*` - archive endpoint, date range, timezone, timeout and retry policy
//! - **Assessment**: `assessment.default_location` - coordinate used when a request has none
//! - **CORS**: `cors.allowed_origins`, `cors.max_age`
//! - **Features**: `enable_metrics` - Prometheus endpoint at `/internal/metrics`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! RTRWH_PORT=8080
//! RTRWH_DATABASE__PATH=/var/lib/rtrwh/rtrwh.db
//! RTRWH_RAINFALL__RETRY__MAX_ATTEMPTS=3
//! RTRWH_ENABLE_METRICS=true
//! ```

use chrono::NaiveDate;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;
use crate::types::Coordinates;

/// Location assumed when an assessment request carries no coordinates (New Delhi).
pub const DEFAULT_LOCATION: Coordinates = Coordinates::new(28.6139, 77.2090);

/// Default rainfall archive endpoint (Open-Meteo historical weather API).
pub const DEFAULT_RAINFALL_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "RTRWH_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// SQLite storage settings
    pub database: DatabaseConfig,
    /// Upstream rainfall archive settings
    pub rainfall: RainfallConfig,
    /// Assessment defaults
    pub assessment: AssessmentConfig,
    /// Cross-origin policy for browser clients
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file. Created on startup if it does not exist.
    pub path: PathBuf,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rtrwh.db"),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Rainfall archive configuration.
///
/// The query window and timezone are sent verbatim as `start_date`, `end_date` and `timezone`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainfallConfig {
    /// Archive endpoint returning `daily.precipitation_sum`
    pub base_url: Url,
    /// First day of the summed window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the summed window (inclusive)
    pub end_date: NaiveDate,
    /// Timezone used by the archive to bucket daily sums
    pub timezone: String,
    /// Timeout applied to each attempt
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Retry behaviour for transient upstream failures
    pub retry: RetryConfig,
}

impl Default for RainfallConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_RAINFALL_URL).expect("default rainfall URL is valid"),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
            timezone: "Asia/Kolkata".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry settings for the rainfall client.
///
/// `max_attempts` counts the first request, so the default of 1 never retries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Pause between attempts
    #[serde(with = "humantime_serde")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentConfig {
    /// Coordinate substituted when `lat` or `lng` is missing from a request
    pub default_location: Coordinates,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION,
        }
    }
}

/// CORS configuration. Defaults to fully open (any origin, method and header).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<CorsOrigin>,
    /// Preflight cache duration in seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: None,
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database: DatabaseConfig::default(),
            rainfall: RainfallConfig::default(),
            assessment: AssessmentConfig::default(),
            cors: CorsConfig::default(),
            enable_metrics: false,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.rainfall.start_date > self.rainfall.end_date {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: rainfall.start_date ({}) is after rainfall.end_date ({})",
                    self.rainfall.start_date, self.rainfall.end_date
                ),
            });
        }

        if self.rainfall.timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: rainfall.timeout must be greater than zero".to_string(),
            });
        }

        if self.rainfall.retry.max_attempts == 0 {
            return Err(Error::Internal {
                operation: "Config validation: rainfall.retry.max_attempts must be at least 1".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.max_connections must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values. RTRWH_CONFIG names the file itself.
            .merge(Env::prefixed("RTRWH_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
