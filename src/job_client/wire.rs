//! JSON bodies returned by the job API.
//!
//! Parsing is deliberately lenient: every field is optional so that a
//! structurally odd but valid JSON answer becomes a status the poller can
//! classify, rather than a parse error.

use serde::Deserialize;
use serde_json::Value;

use super::{JobId, RawStatus, StatusCode};

#[derive(Debug, Deserialize)]
pub(super) struct CreateJobResponse {
    #[serde(default)]
    result: Option<CreateJobResult>,
}

#[derive(Debug, Deserialize)]
struct CreateJobResult {
    #[serde(default)]
    job_id: Option<Value>,
}

impl CreateJobResponse {
    /// Job id as a string; numeric ids are stringified, empty ones rejected.
    pub(super) fn job_id(&self) -> Option<JobId> {
        let raw = self.result.as_ref()?.job_id.as_ref()?;
        let id = match raw {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if id.is_empty() {
            None
        } else {
            Some(JobId::new(id))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GetJobResponse {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    result: Option<GetJobResult>,
}

#[derive(Debug, Deserialize)]
struct GetJobResult {
    #[serde(default)]
    output: Option<Vec<Value>>,
}

impl GetJobResponse {
    pub(super) fn into_raw_status(self) -> RawStatus {
        // Non-integer codes carry no meaning for the poller
        let code = StatusCode::from_raw(self.code.as_ref().and_then(Value::as_i64));

        let outputs = self
            .result
            .and_then(|r| r.output)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        RawStatus { code, outputs }
    }
}
