//! Server-side image relay.
//!
//! The processed image lives on a third-party CDN that does not allow
//! cross-origin reads from the browser. The relay fetches it here and hands
//! the bytes back same-origin, mirroring the upstream content type.

use std::time::Duration;

use bytes::Bytes;

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Bytes fetched from the upstream, plus the headers worth mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedImage {
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct ImageRelay {
    http_client: reqwest::Client,
    user_agent: String,
    default_content_type: String,
}

impl ImageRelay {
    /// # Errors
    ///
    /// Returns the builder error if the HTTP client cannot be created.
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            user_agent: config.user_agent.clone(),
            default_content_type: config.default_content_type.clone(),
        })
    }

    /// Fetch `url` and return its body verbatim.
    ///
    /// # Errors
    ///
    /// Returns `RelayError` on invalid URL, network failure, or a non-2xx
    /// upstream status.
    pub async fn fetch(&self, url: &str) -> Result<RelayedImage, RelayError> {
        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_content_type.clone());

        let body = response.bytes().await?;

        tracing::debug!(
            url = %url,
            content_type = %content_type,
            bytes = body.len(),
            "Relayed upstream image"
        );

        Ok(RelayedImage { content_type, body })
    }
}
