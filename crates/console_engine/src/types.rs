use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub type JobId = String;
/// Correlates a submission reply with the request that produced it.
pub type SubmissionId = u64;

/// One `{step, message}` entry of the backend step log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireStep {
    pub step: String,
    #[serde(default)]
    pub message: String,
}

/// Update shape shared by `/api/stream` messages and `/api/status` responses.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<WireStep>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub partial_research: Option<Value>,
    #[serde(default)]
    pub partial_evaluation: Option<Value>,
    #[serde(default)]
    pub partial_summary: Option<Value>,
    #[serde(default)]
    pub partial_documentation: Option<Value>,
    #[serde(default)]
    pub final_result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

/// Backends send `null` for fields they have nothing for yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Completed,
    Failed,
}

impl StatusPayload {
    pub fn terminal(&self) -> Option<Terminal> {
        let status = self.status.as_deref().map(str::to_ascii_lowercase);
        if self.error.is_some() || matches!(status.as_deref(), Some("error" | "failed")) {
            return Some(Terminal::Failed);
        }
        if self.done || status.as_deref() == Some("completed") {
            return Some(Terminal::Completed);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Pull,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultFetch {
    /// `202`: the run has not produced a result yet.
    Pending,
    Ready(Value),
}

/// Identifies a scheduled timer; `tag` is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub job_id: JobId,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        submission: SubmissionId,
        result: Result<JobId, ApiError>,
    },
    Update {
        job_id: JobId,
        channel: Channel,
        payload: StatusPayload,
    },
    FellBack {
        job_id: JobId,
        reason: String,
    },
    Result {
        job_id: JobId,
        result: Result<ResultFetch, ApiError>,
    },
    TimerFired {
        key: TimerKey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// Backend answered with an `{error}` body.
    #[error("{0}")]
    Rejected(String),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Push => write!(f, "push"),
            Channel::Pull => write!(f, "pull"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_steps_and_done_read_as_empty() {
        let payload: StatusPayload = serde_json::from_value(json!({
            "current_step": "research",
            "steps": null,
            "status": "running",
            "done": null
        }))
        .unwrap();
        assert!(payload.steps.is_empty());
        assert!(!payload.done);
        assert_eq!(payload.current_step.as_deref(), Some("research"));
        assert_eq!(payload.terminal(), None);
    }
}
