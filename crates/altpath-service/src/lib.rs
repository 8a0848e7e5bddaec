//! HTTP query service for altpath.
//!
//! - [`AppState`]: the prepared graph, landmark table, and buffer pool
//! - [`route_handler`]: `GET /api/v1/route`, JSON or XML by `Accept` header
//! - [`health`]: liveness/readiness checks
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`logging`]: JSON or text structured logging
//!
//! All pathfinding lives in `altpath-lib`; this crate is HTTP glue only.

#![deny(warnings)]

pub mod health;
pub mod logging;
mod problem;
mod request;
mod route;
mod state;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_ACCEPT,
    PROBLEM_INVALID_PARAMS, PROBLEM_INVALID_WEIGHT, PROBLEM_NO_PATH,
};
pub use request::{negotiate, ResponseFormat, RouteParams, RouteQuery};
pub use route::{route_handler, RouteResponse};
pub use state::{AppState, AppStateError, ServiceSettings, DEFAULT_PORT};

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/route", get(route_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
