//! `/download`: fetch a processed image server-side and return it same-origin.

use serde::Deserialize;

use super::EndpointResponse;
use crate::relay::ImageRelay;

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    #[serde(default)]
    url: Option<String>,
}

/// Pull a non-empty `url` out of the JSON body; anything else is `None`.
fn requested_url(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<DownloadRequest>(body)
        .ok()?
        .url
        .filter(|url| !url.trim().is_empty())
}

/// Generate response for `POST /download`.
pub async fn handle_download(relay: &ImageRelay, body: &[u8]) -> EndpointResponse {
    let Some(url) = requested_url(body) else {
        return EndpointResponse::json(400, serde_json::json!({"error": "URL is required"}));
    };

    match relay.fetch(&url).await {
        Ok(image) => EndpointResponse::binary(image.content_type, image.body),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Relay fetch failed");
            EndpointResponse::json(500, serde_json::json!({"error": e.to_string()}))
        }
    }
}
