//! Endpoint handlers.
//!
//! This module provides response generators for the service's endpoints:
//! - `/remove` - Submit an image and wait for the watermark-free result
//! - `/download` - Relay a remote image same-origin
//! - `/health` - Health check endpoint
//!
//! # Design
//!
//! Handlers return `EndpointResponse` instead of writing directly to the
//! Pingora session. This keeps response generation testable without a live
//! connection; the proxy layer writes the response out.

use std::time::Instant;

use bytes::Bytes;
use http::Method;

pub mod download;
pub mod remove;

/// CORS headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Response from an endpoint handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value (absent for empty responses)
    pub content_type: Option<String>,
    /// Response body
    pub body: Bytes,
}

impl EndpointResponse {
    /// Create a JSON response with the given status and body.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: Bytes::from(body.to_string()),
        }
    }

    /// Create a 200 response carrying raw bytes.
    pub fn binary(content_type: String, body: Bytes) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type),
            body,
        }
    }

    /// Create a response with no body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// Parse the body back as JSON (used by tests and logging).
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Known request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Remove,
    Download,
    Health,
    NotFound,
}

impl Route {
    /// Resolve a request path. `/api/...` aliases keep old serverless URLs working.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/remove" | "/api/remove" => Route::Remove,
            "/download" | "/api/download" => Route::Download,
            "/health" => Route::Health,
            _ => Route::NotFound,
        }
    }
}

/// Answer requests that never reach a handler body: unknown paths, CORS
/// preflight, and disallowed methods. Returns `None` when the request should
/// be handed to the route's handler.
pub fn short_circuit(method: &Method, route: Route) -> Option<EndpointResponse> {
    match route {
        Route::NotFound => Some(not_found()),
        Route::Health if method == Method::GET || method == Method::HEAD => None,
        Route::Health => Some(method_not_allowed()),
        Route::Remove | Route::Download => {
            if method == Method::OPTIONS {
                Some(EndpointResponse::empty(200))
            } else if method != Method::POST {
                Some(method_not_allowed())
            } else {
                None
            }
        }
    }
}

pub fn not_found() -> EndpointResponse {
    EndpointResponse::json(404, serde_json::json!({"error": "Not found"}))
}

fn method_not_allowed() -> EndpointResponse {
    EndpointResponse::json(405, serde_json::json!({"error": "Method not allowed"}))
}

/// Generate response for /health endpoint.
///
/// Returns health status with uptime and version information.
pub fn handle_health(start_time: Instant) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION")
    });

    EndpointResponse::json(200, body)
}
