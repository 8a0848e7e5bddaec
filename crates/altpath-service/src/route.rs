//! `GET /api/v1/route` handler.

use std::fmt::Write as _;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use altpath_lib::NodeId;

use crate::problem::ProblemDetails;
use crate::request::{negotiate, ResponseFormat, RouteParams};
use crate::AppState;

/// Successful route response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResponse {
    pub start: NodeId,
    pub end: NodeId,
    pub weight: f64,
    pub total_cost: i32,
    pub node_count: usize,
    pub path: Vec<NodeId>,
    pub response_time_ms: u64,
}

impl RouteResponse {
    /// Render as a small XML document; every value is numeric so no escaping
    /// is needed.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<route>\n");
        let _ = writeln!(xml, "  <start>{}</start>", self.start);
        let _ = writeln!(xml, "  <end>{}</end>", self.end);
        let _ = writeln!(xml, "  <weight>{}</weight>", self.weight);
        let _ = writeln!(xml, "  <total_cost>{}</total_cost>", self.total_cost);
        let _ = writeln!(xml, "  <node_count>{}</node_count>", self.node_count);
        xml.push_str("  <path>");
        for node in &self.path {
            let _ = write!(xml, "<node>{node}</node>");
        }
        xml.push_str("</path>\n");
        let _ = writeln!(
            xml,
            "  <response_time_ms>{}</response_time_ms>",
            self.response_time_ms
        );
        xml.push_str("</route>\n");
        xml
    }

    fn into_response_as(self, format: ResponseFormat) -> Response {
        match format {
            ResponseFormat::Json => (StatusCode::OK, Json(self)).into_response(),
            ResponseFormat::Xml => (
                StatusCode::OK,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(format.content_type()),
                )],
                self.to_xml(),
            )
                .into_response(),
        }
    }
}

/// Handle `GET /api/v1/route?start=<id>&end=<id>[&weight=<w>]`.
pub async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<RouteParams>, QueryRejection>,
) -> Response {
    let started = Instant::now();
    let request_id = request_id(&headers);

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return ProblemDetails::invalid_params(rejection.body_text(), request_id)
                .into_response();
        }
    };

    let query = match params.validate(state.finder(), &request_id) {
        Ok(query) => query,
        Err(problem) => {
            warn!(request_id = %request_id, problem = %problem, "rejected route request");
            return (*problem).into_response();
        }
    };

    let format = match negotiate(&headers) {
        Ok(format) => format,
        Err(accept) => {
            warn!(request_id = %request_id, accept = %accept, "unsupported accept header");
            return ProblemDetails::invalid_accept(&accept, request_id).into_response();
        }
    };

    info!(
        request_id = %request_id,
        start = query.start,
        end = query.end,
        weight = query.weight,
        "handling route request"
    );

    // The search is synchronous and may block while waiting for a free lane.
    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let finder = worker_state.finder();
        finder.query(
            query.start,
            query.end,
            query.weight,
            finder.config().search_engine,
        )
    })
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "route query task failed");
            return ProblemDetails::internal_error("route query failed", request_id)
                .into_response();
        }
    };

    if !result.is_found() {
        info!(request_id = %request_id, start = query.start, end = query.end, "no path found");
        return ProblemDetails::no_path(query.start, query.end, request_id).into_response();
    }

    let response = RouteResponse {
        start: query.start,
        end: query.end,
        weight: query.weight,
        total_cost: result.total_cost,
        node_count: result.node_count,
        path: result.path,
        response_time_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        request_id = %request_id,
        total_cost = response.total_cost,
        node_count = response.node_count,
        elapsed_ms = response.response_time_ms,
        "route computed"
    );
    response.into_response_as(format)
}

/// Extract the `X-Request-ID` header or generate a UUID v7.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}
