//! altpath shortest-path HTTP service.
//!
//! # Endpoints
//!
//! - `GET /api/v1/route?start=<id>&end=<id>[&weight=<w>]` - shortest path
//! - `GET /health/live` - liveness check
//! - `GET /health/ready` - readiness check
//!
//! # Configuration
//!
//! - `ALTPATH_MAP_PATH` - edge list CSV (or `map_path` in the config file)
//! - `ALTPATH_CONFIG` - TOML engine configuration (optional)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - json (default) or text

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{error, info};

use altpath_service::{init_logging, router, AppState, LoggingConfig, ServiceSettings};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());

    let settings = ServiceSettings::from_env().inspect_err(|e| {
        error!(error = %e, "invalid service configuration");
    })?;
    info!(
        map_path = %settings.map_path.display(),
        port = settings.port,
        "starting altpath service"
    );

    // Preprocessing is CPU-bound; keep it off the async workers.
    let map_path = settings.map_path.clone();
    let config = settings.config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&map_path, config))
        .await
        .context("graph loading task failed")?
        .inspect_err(|e| error!(error = %e, "failed to load application state"))?;
    info!(state = ?state, "application state loaded");

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
