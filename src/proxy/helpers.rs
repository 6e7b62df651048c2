//! Proxy utility functions.
//!
//! Header lookups on Pingora requests and the status-to-log-level mapping
//! used when a request completes.

use pingora_http::RequestHeader;

/// Log level for request completion logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLogLevel {
    Info,
    Warn,
    Error,
}

/// Header value as UTF-8, `None` if absent or not valid UTF-8.
pub fn header_str(req: &RequestHeader, name: &str) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parse a `Content-Length` header value; garbage counts as absent.
pub fn parse_content_length(value: Option<&str>) -> Option<usize> {
    value.and_then(|s| s.trim().parse::<usize>().ok())
}

/// Determine appropriate log level based on status code.
pub fn determine_log_level(status_code: u16) -> RequestLogLevel {
    match status_code {
        500.. => RequestLogLevel::Error,
        400..=499 => RequestLogLevel::Warn,
        _ => RequestLogLevel::Info,
    }
}
