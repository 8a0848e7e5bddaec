//! Health check handlers for liveness and readiness checks.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,
    pub service: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<usize>,

    /// RFC 3339 time at which the graph finished loading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

impl HealthStatus {
    /// Liveness payload: process is up.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
            landmarks: None,
            loaded_at: None,
        }
    }

    /// Readiness payload with graph and landmark counts.
    pub fn ready(service: &str, version: &str, state: &AppState) -> Self {
        let finder = state.finder();
        Self {
            nodes_loaded: Some(finder.graph().node_count()),
            landmarks: Some(finder.landmarks().map_or(0, |t| t.landmark_count())),
            loaded_at: Some(state.loaded_at().to_rfc3339()),
            ..Self::alive(service, version)
        }
    }

    /// Readiness failure with a short reason.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`: 200 whenever the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: 200 once a non-empty graph is loaded, 503 otherwise.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    if state.finder().graph().is_empty() {
        let status = HealthStatus::not_ready(service, version, "no nodes loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, &state);
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alive_status_omits_graph_fields() {
        let status = HealthStatus::alive("altpath-service", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("nodes_loaded"));
    }

    #[test]
    fn not_ready_carries_reason() {
        let status = HealthStatus::not_ready("altpath-service", "0.1.0", "no nodes loaded");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no nodes loaded"));
    }
}
