//! Client for the third-party watermark-removal job API.
//!
//! The API is asynchronous: an image is submitted to `create-job`, which
//! answers with a job id, and the job is then checked with `get-job/{id}`
//! until it reports a terminal code. Status codes are undocumented; the two
//! meaningful ones were observed from the service:
//!
//! | code     | meaning                          |
//! |----------|----------------------------------|
//! | `300001` | still processing, keep polling   |
//! | `100000` | finished, `result.output` filled |
//!
//! Anything else (including no code at all) is treated as a failed job.
//!
//! Every request carries a browser-like identity and a fresh
//! `product-serial: sr-<unix millis>` correlation token.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::constants::{
    API_CODE_IN_PROGRESS, API_CODE_SUCCESS, API_IMAGE_FIELD, CREATE_JOB_PATH, GET_JOB_PATH,
    PRODUCT_SERIAL_PREFIX,
};
use crate::error::{PollError, SubmissionError};
use crate::staging::StagedFile;

mod wire;

use wire::{CreateJobResponse, GetJobResponse};

/// Opaque job identifier issued by the external API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Status code reported by the API, closed at the client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Job still running
    InProgress,
    /// Job finished; outputs should be present
    Succeeded,
    /// A code this client does not know
    Unknown(i64),
    /// The response carried no code at all
    Missing,
}

impl StatusCode {
    pub fn from_raw(code: Option<i64>) -> Self {
        match code {
            Some(API_CODE_IN_PROGRESS) => StatusCode::InProgress,
            Some(API_CODE_SUCCESS) => StatusCode::Succeeded,
            Some(other) => StatusCode::Unknown(other),
            None => StatusCode::Missing,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::InProgress => write!(f, "{}", API_CODE_IN_PROGRESS),
            StatusCode::Succeeded => write!(f, "{}", API_CODE_SUCCESS),
            StatusCode::Unknown(code) => write!(f, "{}", code),
            StatusCode::Missing => f.write_str("<missing>"),
        }
    }
}

/// One status check's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatus {
    pub code: StatusCode,
    /// Output URLs in the order the API listed them
    pub outputs: Vec<String>,
}

impl RawStatus {
    pub fn in_progress() -> Self {
        Self {
            code: StatusCode::InProgress,
            outputs: Vec::new(),
        }
    }

    pub fn succeeded(outputs: Vec<String>) -> Self {
        Self {
            code: StatusCode::Succeeded,
            outputs,
        }
    }

    pub fn with_code(code: StatusCode) -> Self {
        Self {
            code,
            outputs: Vec::new(),
        }
    }

    /// First non-empty output URL, if the API listed one
    pub fn first_output(&self) -> Option<&str> {
        self.outputs
            .first()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

/// Operations against the external job API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit a staged image and return the id of the created job.
    async fn submit(&self, image: &StagedFile) -> Result<JobId, SubmissionError>;

    /// Check a job's status once.
    async fn poll(&self, job_id: &JobId) -> Result<RawStatus, PollError>;
}

/// Fresh correlation token, `sr-<unix millis>`
pub fn product_serial() -> String {
    format!(
        "{}{}",
        PRODUCT_SERIAL_PREFIX,
        chrono::Utc::now().timestamp_millis()
    )
}

/// `reqwest`-backed implementation talking to ezremove.
#[derive(Clone)]
pub struct EzRemoveClient {
    http_client: reqwest::Client,
    base_url: String,
    origin: String,
    user_agent: String,
}

impl EzRemoveClient {
    /// Create a client from API settings.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the HTTP client cannot be created
    /// (e.g., TLS backend initialization failure).
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            origin: config.origin.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn create_job_url(&self) -> String {
        format!("{}{}", self.base_url, CREATE_JOB_PATH)
    }

    /// The id comes from the remote API, so it is encoded as one path segment.
    fn get_job_url(&self, job_id: &JobId) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            GET_JOB_PATH,
            urlencoding::encode(job_id.as_str())
        )
    }

    fn with_identity(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ORIGIN, &self.origin)
            .header("product-serial", product_serial())
    }
}

#[async_trait]
impl JobApi for EzRemoveClient {
    async fn submit(&self, image: &StagedFile) -> Result<JobId, SubmissionError> {
        let bytes = tokio::fs::read(&image.path).await?;

        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        }
        let form = reqwest::multipart::Form::new().part(API_IMAGE_FIELD, part);

        let response = self
            .with_identity(self.http_client.post(self.create_job_url()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let parsed: CreateJobResponse =
            serde_json::from_slice(&body).map_err(|e| SubmissionError::Parse(e.to_string()))?;

        let job_id = parsed.job_id().ok_or(SubmissionError::MissingJobId)?;

        tracing::debug!(job_id = %job_id, file = %image.file_name, "Watermark removal job created");
        Ok(job_id)
    }

    async fn poll(&self, job_id: &JobId) -> Result<RawStatus, PollError> {
        let response = self
            .with_identity(self.http_client.get(self.get_job_url(job_id)))
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        let parsed: GetJobResponse =
            serde_json::from_slice(&body).map_err(|e| PollError::Parse(e.to_string()))?;

        Ok(parsed.into_raw_status())
    }
}
