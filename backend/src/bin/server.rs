//! Rhythm HTTP Server Binary
//!
//! Main entry point for the rhythm REST API server. It loads configuration,
//! creates the in-memory repository and the rhythm service, starts the change
//! debouncer and serves the HTTP router.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin rhythm-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)
//! - `RHYTHM_*`: Overrides for `rhythm.toml` values (see `RhythmConfig`)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rhythm_engine::config::{ConfigError, RhythmConfig};
use rhythm_engine::db::{LocalRepository, SampleStore};
use rhythm_engine::http::{create_router, AppState};
use rhythm_engine::services::ChangeDebouncer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting rhythm HTTP server");

    let config = match RhythmConfig::from_default_location() {
        Ok(config) => config,
        Err(ConfigError::NotFound) => {
            info!("No rhythm.toml found, using defaults");
            RhythmConfig::default()
        }
        Err(e) => return Err(e.into()),
    }
    .apply_env_overrides()?;
    info!(
        "Period range {}..={} days (step {}), confidence floor {}, cadence {}",
        config.min_period,
        config.max_period,
        config.step,
        config.confidence_floor,
        config.recompute_cadence
    );

    let repository = Arc::new(LocalRepository::new());
    let state = AppState::from_repository(repository.clone(), &config);

    // Recompute in the background as samples arrive.
    let debouncer = ChangeDebouncer::new(state.service.clone(), config.debounce())
        .spawn(repository.subscribe_changes());

    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    if !debouncer.is_finished() {
        warn!("Server stopped with change debouncer still running");
        debouncer.abort();
    }

    Ok(())
}
