// Error types module
//
// One enum per concern. Everything below the handler boundary returns one of
// these; the handlers turn them into the fixed JSON response shapes.

use thiserror::Error;

use crate::job_client::StatusCode;

/// Failure to create a job on the external API.
///
/// All variants are treated identically by the caller: the request ends with
/// the "Failed to process image" shape and polling never starts.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to read staged image: {0}")]
    StagedRead(#[from] std::io::Error),

    #[error("create-job request failed: {0}")]
    Transport(String),

    #[error("create-job response could not be parsed: {0}")]
    Parse(String),

    #[error("create-job response did not contain a job id")]
    MissingJobId,
}

/// Failure of a single status check (network or body parse).
#[derive(Debug, Error)]
pub enum PollError {
    #[error("get-job request failed: {0}")]
    Transport(String),

    #[error("get-job response could not be parsed: {0}")]
    Parse(String),
}

/// Why a submitted job ended without a usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobFailure {
    /// The API answered with a code that is neither in-progress nor success
    #[error("job reported unexpected status {0}")]
    UnexpectedCode(StatusCode),

    /// The API reported success but listed no output URL
    #[error("job succeeded without an output URL")]
    EmptyResult,

    /// A status check failed at the transport level
    #[error("status check failed: {0}")]
    Transport(String),
}

/// Failure of the download relay's upstream fetch.
///
/// Displays as the underlying error so the message can be surfaced verbatim.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Rejected or unreadable upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Image exceeds maximum upload size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Malformed multipart body: {0}")]
    Malformed(String),
}

impl UploadError {
    /// HTTP status code this error maps to
    pub fn status(&self) -> u16 {
        match self {
            UploadError::TooLarge { .. } => 413,
            UploadError::Malformed(_) => 400,
        }
    }
}

/// Failure to stage or release an upload on the staging backend.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
