use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub type JobId = String;

/// Which enqueue endpoint a job goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Post,
    Blog,
}

impl JobType {
    pub fn path_segment(self) -> &'static str {
        match self {
            JobType::Post => "post",
            JobType::Blog => "blog",
        }
    }
}

/// A job as reported by the polling endpoint, after id and field
/// normalization. Status stays a raw string; classification is the core's
/// business.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteJob {
    pub id: JobId,
    pub alt_id: Option<JobId>,
    pub status: String,
    pub progress: Option<u8>,
    pub job_type: Option<String>,
    pub payload: Value,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Enqueued {
        temp_id: JobId,
        result: Result<JobId, BackendError>,
    },
    Deleted {
        id: JobId,
        result: Result<(), BackendError>,
    },
    Polled {
        cycle: u64,
        result: Result<Vec<RemoteJob>, BackendError>,
    },
    /// The poll timer armed with `generation` elapsed.
    PollDue { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    MissingId,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::MissingId => write!(f, "response carried no job id"),
        }
    }
}
