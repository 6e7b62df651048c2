//! Outbound HTTP configuration.
//!
//! Two outbound clients exist: the watermark-removal job API (`api`) and the
//! image download relay (`relay`). Both present a browser-like identity since
//! the third party rejects bare library user agents.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_ORIGIN, DEFAULT_RELAY_CONTENT_TYPE, DEFAULT_USER_AGENT,
};

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_origin() -> String {
    DEFAULT_API_ORIGIN.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_content_type() -> String {
    DEFAULT_RELAY_CONTENT_TYPE.to_string()
}

/// Watermark-removal API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme and host of the job API, without trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `Origin` header
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-call timeout in seconds. Unset means the transport default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

/// Download relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Content type reported when the upstream sends none
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            default_content_type: default_content_type(),
            timeout_secs: None,
        }
    }
}
