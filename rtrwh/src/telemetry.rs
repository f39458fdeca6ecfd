//! Tracing subscriber setup.
//!
//! Log output goes to stdout through the `tracing-subscriber` fmt layer. The filter is read from
//! `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=rtrwh=debug,tower_http=info rtrwh
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
