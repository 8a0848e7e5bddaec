//! Query parameter parsing and content negotiation for `/api/v1/route`.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use altpath_lib::{NodeId, PathFinder};

use crate::problem::{from_lib_error, ProblemDetails};

/// Raw query string of a route request.
///
/// Values stay strings so malformed input produces a problem response
/// instead of a framework rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub weight: Option<String>,
}

/// A validated route request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub start: NodeId,
    pub end: NodeId,
    pub weight: f64,
}

impl RouteParams {
    /// Parse node ids and apply the weight policy of `finder`.
    pub fn validate(
        &self,
        finder: &PathFinder,
        request_id: &str,
    ) -> Result<RouteQuery, Box<ProblemDetails>> {
        let start = parse_node(self.start.as_deref(), "start", request_id)?;
        let end = parse_node(self.end.as_deref(), "end", request_id)?;

        let requested = match self.weight.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                Box::new(ProblemDetails::invalid_weight(
                    format!("'weight' must be a number, got '{raw}'"),
                    request_id,
                ))
            })?),
        };
        let weight = finder
            .resolve_weight(requested)
            .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;

        Ok(RouteQuery { start, end, weight })
    }
}

fn parse_node(
    value: Option<&str>,
    name: &str,
    request_id: &str,
) -> Result<NodeId, Box<ProblemDetails>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(Box::new(ProblemDetails::invalid_params(
            format!("'{name}' is required"),
            request_id,
        )));
    };
    raw.parse().map_err(|_| {
        Box::new(ProblemDetails::invalid_params(
            format!("'{name}' must be a non-negative integer node id, got '{raw}'"),
            request_id,
        ))
    })
}

/// Media type of a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    /// MIME type written to `Content-Type`.
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Xml => "application/xml",
        }
    }
}

/// Pick the response format from the `Accept` header.
///
/// A missing header selects JSON. Otherwise the first listed media range
/// that is supported wins; parameters such as `q` are ignored. `Err` carries
/// the header value when nothing listed is supported.
pub fn negotiate(headers: &HeaderMap) -> Result<ResponseFormat, String> {
    let Some(value) = headers.get(header::ACCEPT) else {
        return Ok(ResponseFormat::Json);
    };
    let Ok(accept) = value.to_str() else {
        return Err("<non-ascii>".to_string());
    };
    if accept.trim().is_empty() {
        return Ok(ResponseFormat::Json);
    }

    accept
        .split(',')
        .filter_map(|range| range.split(';').next())
        .map(|media| media.trim().to_ascii_lowercase())
        .find_map(|media| match media.as_str() {
            "application/xml" => Some(ResponseFormat::Xml),
            "application/json" | "application/*" | "*/*" => Some(ResponseFormat::Json),
            _ => None,
        })
        .ok_or_else(|| accept.to_string())
}
