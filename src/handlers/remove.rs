//! `/remove`: synchronous front for the asynchronous job API.
//!
//! Per request: parse upload -> stage -> submit -> poll -> release -> respond.
//! Once an upload is staged, every path goes through `release` before the
//! response is built; a failed release is logged and otherwise ignored. A
//! staged upload whose request is cancelled is released by its guard.

use std::sync::Arc;

use bytes::Bytes;

use super::EndpointResponse;
use crate::error::JobFailure;
use crate::job_client::{JobApi, JobId};
use crate::poller::{poll_until_done, JobStatus, PollPolicy};
use crate::staging::{StagedFile, StagedGuard, StagingStore};
use crate::upload::parse_image_upload;

/// What happened to a staged upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// The job API never accepted the image
    SubmissionFailed,
    /// Job finished with a result URL
    Completed { job_id: JobId, result_url: String },
    /// Budget ran out while the job was still running
    TimedOut { job_id: JobId },
    /// Job ended without a usable result
    JobFailed { job_id: JobId, failure: JobFailure },
}

impl ProxyOutcome {
    /// Job id, present whenever submission succeeded
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            ProxyOutcome::SubmissionFailed => None,
            ProxyOutcome::Completed { job_id, .. }
            | ProxyOutcome::TimedOut { job_id }
            | ProxyOutcome::JobFailed { job_id, .. } => Some(job_id),
        }
    }

    pub fn into_response(self) -> EndpointResponse {
        match self {
            ProxyOutcome::SubmissionFailed => EndpointResponse::json(
                500,
                serde_json::json!({"success": false, "error": "Failed to process image"}),
            ),
            ProxyOutcome::Completed { job_id, result_url } => EndpointResponse::json(
                200,
                serde_json::json!({
                    "success": true,
                    "jobId": job_id.as_str(),
                    "resultUrl": result_url
                }),
            ),
            ProxyOutcome::JobFailed {
                job_id,
                failure: JobFailure::EmptyResult,
            } => EndpointResponse::json(
                500,
                serde_json::json!({
                    "success": false,
                    "error": "No result from processing",
                    "jobId": job_id.as_str()
                }),
            ),
            // The job may still finish upstream; hand back the id like a timeout
            ProxyOutcome::TimedOut { job_id } | ProxyOutcome::JobFailed { job_id, .. } => {
                EndpointResponse::json(
                    202,
                    serde_json::json!({
                        "success": false,
                        "error": "Processing timeout",
                        "jobId": job_id.as_str()
                    }),
                )
            }
        }
    }
}

/// Handler for `POST /remove`.
#[derive(Clone)]
pub struct RemoveHandler {
    api: Arc<dyn JobApi>,
    store: Arc<dyn StagingStore>,
    policy: PollPolicy,
    max_upload_bytes: usize,
}

impl RemoveHandler {
    pub fn new(
        api: Arc<dyn JobApi>,
        store: Arc<dyn StagingStore>,
        policy: PollPolicy,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            api,
            store,
            policy,
            max_upload_bytes,
        }
    }

    pub async fn handle(&self, content_type: Option<&str>, body: Bytes) -> EndpointResponse {
        let image = match parse_image_upload(content_type, body, self.max_upload_bytes).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                tracing::info!("Rejected /remove request without image");
                return EndpointResponse::json(
                    400,
                    serde_json::json!({"error": "No image file provided"}),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected /remove upload");
                let body = if e.status() == 413 {
                    serde_json::json!({"success": false, "error": e.to_string()})
                } else {
                    serde_json::json!({"error": e.to_string()})
                };
                return EndpointResponse::json(e.status(), body);
            }
        };

        let staged = match self.store.stage(&image).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage upload");
                return EndpointResponse::json(
                    500,
                    serde_json::json!({"success": false, "error": e.to_string()}),
                );
            }
        };

        let guard = StagedGuard::new(Arc::clone(&self.store), staged.clone());

        let outcome = self.process(&staged).await;

        if let Err(e) = guard.release().await {
            tracing::warn!(
                path = %staged.path.display(),
                error = %e,
                "Failed to delete staged upload"
            );
        }

        tracing::info!(
            job_id = outcome.job_id().map(JobId::as_str).unwrap_or("-"),
            outcome = ?outcome,
            "Finished /remove request"
        );

        outcome.into_response()
    }

    /// Submit and poll; never returns early without an outcome.
    async fn process(&self, staged: &StagedFile) -> ProxyOutcome {
        let job_id = match self.api.submit(staged).await {
            Ok(job_id) => job_id,
            Err(e) => {
                tracing::error!(error = %e, size = staged.size, "Job submission failed");
                return ProxyOutcome::SubmissionFailed;
            }
        };

        tracing::info!(job_id = %job_id, "Job submitted, polling for completion");

        match poll_until_done(self.api.as_ref(), &job_id, &self.policy).await {
            JobStatus::Succeeded(result_url) => ProxyOutcome::Completed { job_id, result_url },
            JobStatus::StillProcessing => ProxyOutcome::TimedOut { job_id },
            JobStatus::Failed(failure) => ProxyOutcome::JobFailed { job_id, failure },
        }
    }
}
