//! Job-completion polling with a fixed backoff and bounded budget.
//!
//! The external API only signals "keep waiting" through one code, so the
//! policy is asymmetric:
//!
//! - success code with an output URL ends polling with that URL
//! - in-progress code waits for the next attempt
//! - any other code, or a transport failure, ends polling as failed
//! - running out of attempts while still in progress is a timeout
//!
//! Each attempt sleeps `interval` before polling, so the total wait is capped
//! at `max_attempts × interval` (30s with the defaults).
//!
//! ## Configuration Example
//!
//! ```yaml
//! polling:
//!   max_attempts: 15
//!   interval_ms: 2000
//!   transport_retries: 0
//! ```

use std::time::Duration;

use crate::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_POLL_TRANSPORT_RETRIES,
};
use crate::error::JobFailure;
use crate::job_client::{JobApi, JobId, StatusCode};

/// Poll budget configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Delay before each status check
    pub interval: Duration,
    /// Consecutive transport failures absorbed before failing the job
    pub transport_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_POLL_MAX_ATTEMPTS,
            DEFAULT_POLL_INTERVAL_MS,
            DEFAULT_POLL_TRANSPORT_RETRIES,
        )
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval_ms: u64, transport_retries: u32) -> Self {
        Self {
            max_attempts,
            interval: Duration::from_millis(interval_ms),
            transport_retries,
        }
    }

    /// Upper bound on time spent waiting between polls
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Terminal outcome of polling one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Job finished; first output URL
    Succeeded(String),
    /// Budget exhausted while the job was still running
    StillProcessing,
    /// Job cannot complete
    Failed(JobFailure),
}

/// Poll `job_id` until it reaches a terminal state or the budget runs out.
pub async fn poll_until_done<A>(api: &A, job_id: &JobId, policy: &PollPolicy) -> JobStatus
where
    A: JobApi + ?Sized,
{
    let mut consecutive_transport_failures = 0u32;

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        let status = match api.poll(job_id).await {
            Ok(status) => {
                consecutive_transport_failures = 0;
                status
            }
            Err(e) => {
                consecutive_transport_failures += 1;
                if consecutive_transport_failures > policy.transport_retries {
                    tracing::warn!(
                        job_id = %job_id,
                        attempt = attempt,
                        error = %e,
                        "Status check failed, giving up on job"
                    );
                    return JobStatus::Failed(JobFailure::Transport(e.to_string()));
                }
                tracing::debug!(
                    job_id = %job_id,
                    attempt = attempt,
                    error = %e,
                    "Status check failed, will retry"
                );
                continue;
            }
        };

        match status.code {
            StatusCode::Succeeded => {
                return match status.first_output() {
                    Some(url) => {
                        tracing::info!(job_id = %job_id, attempt = attempt, "Job completed");
                        JobStatus::Succeeded(url.to_string())
                    }
                    None => {
                        tracing::warn!(job_id = %job_id, attempt = attempt, "Job completed without output");
                        JobStatus::Failed(JobFailure::EmptyResult)
                    }
                };
            }
            StatusCode::InProgress => {
                tracing::debug!(
                    job_id = %job_id,
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    "Job still processing"
                );
            }
            code @ (StatusCode::Unknown(_) | StatusCode::Missing) => {
                tracing::warn!(
                    job_id = %job_id,
                    attempt = attempt,
                    code = %code,
                    "Job reported unexpected status, stopping"
                );
                return JobStatus::Failed(JobFailure::UnexpectedCode(code));
            }
        }
    }

    tracing::info!(
        job_id = %job_id,
        attempts = policy.max_attempts,
        "Poll budget exhausted while job still processing"
    );
    JobStatus::StillProcessing
}
