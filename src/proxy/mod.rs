// Proxy module - Pingora ProxyHttp implementation
// Every request is answered locally in request_filter; nothing is proxied.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::Config;
use crate::handlers::download::handle_download;
use crate::handlers::remove::RemoveHandler;
use crate::handlers::{handle_health, not_found, short_circuit, EndpointResponse, Route, CORS_HEADERS};
use crate::job_client::EzRemoveClient;
use crate::pipeline::RequestContext;
use crate::relay::ImageRelay;
use crate::security::{validate_body_size, BodyCollector, SecurityError};
use crate::staging::TempDirStore;

pub mod helpers;

use helpers::{determine_log_level, header_str, parse_content_length, RequestLogLevel};

/// ClearmarkProxy implements the Pingora ProxyHttp trait
/// Routes `/remove`, `/download` and `/health` to local handlers
pub struct ClearmarkProxy {
    remove: RemoveHandler,
    relay: ImageRelay,
    /// Ceiling on the buffered request body
    max_body_bytes: usize,
    /// Proxy start time (for uptime calculation in /health endpoint)
    start_time: Instant,
}

impl ClearmarkProxy {
    /// Create a new ClearmarkProxy instance from configuration
    ///
    /// # Errors
    ///
    /// Returns the builder error if either outbound HTTP client cannot be
    /// created.
    pub fn new(config: &Config) -> std::result::Result<Self, reqwest::Error> {
        let api = Arc::new(EzRemoveClient::new(&config.api)?);
        let store = Arc::new(TempDirStore::new(config.staging.dir.clone()));
        let remove = RemoveHandler::new(
            api,
            store,
            config.polling.to_poll_policy(),
            config.server.max_upload_bytes,
        );
        let relay = ImageRelay::new(&config.relay)?;

        Ok(Self::from_parts(remove, relay, config.server.max_body_bytes()))
    }

    /// Assemble a proxy from already-built handlers
    pub fn from_parts(remove: RemoveHandler, relay: ImageRelay, max_body_bytes: usize) -> Self {
        Self {
            remove,
            relay,
            max_body_bytes,
            start_time: Instant::now(),
        }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Produce the response for one request.
    async fn respond(
        &self,
        session: &mut Session,
        method: &Method,
        route: Route,
        content_type: Option<String>,
        content_length: Option<usize>,
    ) -> EndpointResponse {
        if let Some(response) = short_circuit(method, route) {
            return response;
        }

        match route {
            Route::Health => handle_health(self.start_time),
            Route::NotFound => not_found(),
            Route::Remove => {
                let body = match self.read_body(session, content_length).await {
                    Ok(body) => body,
                    Err(response) => return response,
                };
                self.remove.handle(content_type.as_deref(), body).await
            }
            Route::Download => {
                let body = match self.read_body(session, content_length).await {
                    Ok(body) => body,
                    Err(response) => return response,
                };
                handle_download(&self.relay, &body).await
            }
        }
    }

    /// Buffer the request body, enforcing the ceiling before and during the read.
    async fn read_body(
        &self,
        session: &mut Session,
        content_length: Option<usize>,
    ) -> std::result::Result<Bytes, EndpointResponse> {
        if let Err(e) = validate_body_size(content_length, self.max_body_bytes) {
            tracing::warn!(
                content_length = ?content_length,
                limit = self.max_body_bytes,
                error = %e,
                "Request payload too large"
            );
            session.set_keepalive(None);
            return Err(payload_too_large(&e));
        }

        let mut collector = BodyCollector::new(self.max_body_bytes);
        loop {
            match session.read_request_body().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = collector.push(&chunk) {
                        tracing::warn!(
                            read = collector.len(),
                            limit = self.max_body_bytes,
                            "Request body crossed size limit while streaming"
                        );
                        session.set_keepalive(None);
                        return Err(payload_too_large(&e));
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read request body");
                    return Err(EndpointResponse::json(
                        500,
                        serde_json::json!({"success": false, "error": e.to_string()}),
                    ));
                }
            }
        }

        Ok(collector.finish())
    }
}

fn payload_too_large(err: &SecurityError) -> EndpointResponse {
    EndpointResponse::json(
        err.status(),
        serde_json::json!({"success": false, "error": err.to_string()}),
    )
}

/// Build the response header: CORS on everything, then content headers
pub fn build_response_header(response: &EndpointResponse) -> Result<ResponseHeader> {
    let mut header = ResponseHeader::build(response.status, Some(CORS_HEADERS.len() + 2))?;
    for (name, value) in CORS_HEADERS {
        header.insert_header(name, value)?;
    }
    if let Some(content_type) = &response.content_type {
        header.insert_header("Content-Type", content_type.as_str())?;
    }
    header.insert_header("Content-Length", response.body.len().to_string())?;
    Ok(header)
}

async fn write_response(session: &mut Session, response: EndpointResponse) -> Result<()> {
    let header = build_response_header(&response)?;
    if response.body.is_empty() {
        session
            .write_response_header(Box::new(header), true)
            .await?;
        return Ok(());
    }

    session
        .write_response_header(Box::new(header), false)
        .await?;
    session
        .write_response_body(Some(response.body), true)
        .await?;
    Ok(())
}

#[async_trait]
impl ProxyHttp for ClearmarkProxy {
    type CTX = RequestContext;

    /// Create a new request context for each incoming request
    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new()
    }

    /// Never reached: request_filter answers every request
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        tracing::error!(
            request_id = %ctx.request_id(),
            path = %ctx.path(),
            "Request reached upstream selection"
        );
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "No upstream: all routes are served locally",
        ))
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let (method, path, content_type, content_length) = {
            let req = session.req_header();
            (
                req.method.clone(),
                req.uri.path().to_string(),
                header_str(req, "content-type"),
                parse_content_length(header_str(req, "content-length").as_deref()),
            )
        };
        ctx.set_request(method.as_str(), &path);

        let span = tracing::info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %method,
            path = %path
        );

        let response = self
            .respond(session, &method, ctx.route(), content_type, content_length)
            .instrument(span)
            .await;

        ctx.set_status(response.status);
        write_response(session, response).await?;

        // Short-circuit: response already sent
        Ok(true)
    }

    /// Log request completion
    async fn logging(
        &self,
        _session: &mut Session,
        e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status = ctx.status().unwrap_or(500);
        let error = e.map(|e| e.to_string());

        match determine_log_level(status) {
            RequestLogLevel::Error => tracing::error!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                status = status,
                duration_ms = ctx.elapsed_ms() as u64,
                error = ?error,
                "Request completed"
            ),
            RequestLogLevel::Warn => tracing::warn!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                status = status,
                duration_ms = ctx.elapsed_ms() as u64,
                error = ?error,
                "Request completed"
            ),
            RequestLogLevel::Info => tracing::info!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                status = status,
                duration_ms = ctx.elapsed_ms() as u64,
                "Request completed"
            ),
        }
    }
}
