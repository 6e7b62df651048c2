// Request pipeline module - per-request context carried through the proxy hooks

use std::time::Instant;

use uuid::Uuid;

use crate::handlers::Route;

/// Request context that holds the information logged for every request
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    route: Route,
    started: Instant,
    status: Option<u16>,
}

impl RequestContext {
    /// Create a new RequestContext with a fresh UUID v4 request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: String::new(),
            path: String::new(),
            route: Route::NotFound,
            started: Instant::now(),
            status: None,
        }
    }

    /// Record what was asked for once the request header is available
    pub fn set_request(&mut self, method: &str, path: &str) {
        self.method = method.to_string();
        self.path = path.to_string();
        self.route = Route::from_path(path);
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Milliseconds since the context was created
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
