//! Polling configuration for the job-completion poller.
//!
//! This module defines the YAML configuration format for the poll budget:
//! how many status checks to make, how long to wait before each one, and how
//! many consecutive transport failures to absorb before giving up.
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_POLL_TRANSPORT_RETRIES,
};

fn default_max_attempts() -> u32 {
    DEFAULT_POLL_MAX_ATTEMPTS
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_transport_retries() -> u32 {
    DEFAULT_POLL_TRANSPORT_RETRIES
}

/// Polling configuration (YAML format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfigYaml {
    /// Maximum number of status checks per job
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before each status check in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Consecutive transport failures tolerated before the job is failed
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,
}

impl Default for PollingConfigYaml {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
            transport_retries: default_transport_retries(),
        }
    }
}

impl PollingConfigYaml {
    /// Convert to PollPolicy from poller module
    pub fn to_poll_policy(&self) -> crate::poller::PollPolicy {
        crate::poller::PollPolicy::new(
            self.max_attempts,
            self.interval_ms,
            self.transport_retries,
        )
    }
}
