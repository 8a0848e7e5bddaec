//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use altpath_lib::Error as LibError;

/// Problem type URI for missing or malformed query parameters.
pub const PROBLEM_INVALID_PARAMS: &str = "/problems/invalid-params";

/// Problem type URI for a rejected heuristic weight.
pub const PROBLEM_INVALID_WEIGHT: &str = "/problems/invalid-weight";

/// Problem type URI for an `Accept` header naming no supported media type.
pub const PROBLEM_INVALID_ACCEPT: &str = "/problems/invalid-accept-header";

/// Problem type URI for unreachable or unknown endpoints.
pub const PROBLEM_NO_PATH: &str = "/problems/no-path-found";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use altpath_service::ProblemDetails;
///
/// let problem = ProblemDetails::invalid_params("'start' must be a non-negative integer", "req-1");
/// assert_eq!(problem.status, 400);
/// assert_eq!(problem.title, "INVALID PARAMS");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short summary of the problem.
    pub title: String,

    pub status: u16,

    /// Explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// Problem with no detail or instance.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Attach a human-readable explanation.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set `instance` to the request identifier.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for missing or malformed `start`/`end`.
    pub fn invalid_params(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_INVALID_PARAMS, "INVALID PARAMS", StatusCode::BAD_REQUEST)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 400 for a weight rejected by the override policy.
    pub fn invalid_weight(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_INVALID_WEIGHT, "INVALID WEIGHT", StatusCode::BAD_REQUEST)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 400 for an unsupported `Accept` header.
    pub fn invalid_accept(accept: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_ACCEPT,
            "INVALID ACCEPT HEADER",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(format!(
            "cannot produce '{accept}'; supported types are application/json and application/xml"
        ))
        .with_request_id(request_id)
    }

    /// 404 when no path connects the two nodes.
    pub fn no_path(start: u32, end: u32, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NO_PATH, "NO PATH FOUND", StatusCode::NOT_FOUND)
            .with_detail(format!("No path exists from {start} to {end}"))
            .with_request_id(request_id)
    }

    /// 500 response for unexpected failures.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "INTERNAL ERROR",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Map a library error raised while serving a request.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::InvalidWeight { .. } => {
            ProblemDetails::invalid_weight(error.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
