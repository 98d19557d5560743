use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JobStatus;

pub type JobId = String;

/// Prefix of ids the client assigns before the server has answered.
pub const TEMP_ID_PREFIX: &str = "tmp-";

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Created locally, not yet matched against the server.
    Optimistic,
    /// Snapshot reported by the polling endpoint.
    Confirmed,
}

/// Descriptive data shown for a job. Opaque apart from `title`, which is the
/// display key used to pair optimistic and confirmed records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobPayload {
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub details: Value,
}

impl JobPayload {
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            details: Value::Null,
        }
    }

    /// Builds a payload from an opaque JSON object, taking the first of
    /// `headline`, `title` or `topic` as the display title.
    pub fn from_json(kind: impl Into<String>, details: Value) -> Self {
        let title = ["headline", "title", "topic"]
            .iter()
            .find_map(|key| details.get(key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        Self {
            kind: kind.into(),
            title,
            details,
        }
    }

    /// Two payloads display the same when their non-empty titles match.
    pub fn same_display(&self, other: &JobPayload) -> bool {
        let title = self.title.trim();
        !title.is_empty() && title == other.title.trim()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    /// Id reported under the secondary key name, when the server sent both.
    pub alt_id: Option<JobId>,
    pub status: JobStatus,
    pub progress: u8,
    pub payload: JobPayload,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn optimistic(id: impl Into<JobId>, payload: JobPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            alt_id: None,
            status: JobStatus::Processing,
            progress: 0,
            payload,
            result: None,
            error: None,
            origin: Origin::Optimistic,
            created_at,
        }
    }

    /// A server snapshot; `result` and `error` are dropped when the status
    /// does not allow them.
    pub fn confirmed(
        id: impl Into<JobId>,
        status: JobStatus,
        progress: u8,
        payload: JobPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            alt_id: None,
            status,
            progress: progress.min(100),
            payload,
            result: None,
            error: None,
            origin: Origin::Confirmed,
            created_at,
        }
    }

    pub fn with_alt_id(mut self, alt_id: Option<JobId>) -> Self {
        self.alt_id = alt_id.filter(|alt| *alt != self.id);
        self
    }

    pub fn with_outcome(mut self, result: Option<Value>, error: Option<String>) -> Self {
        self.result = result.filter(|_| self.status == JobStatus::Ready);
        self.error = error.filter(|_| self.status == JobStatus::Failed);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether `id` names this record under either key.
    pub fn answers_to(&self, id: &str) -> bool {
        self.id == id || self.alt_id.as_deref() == Some(id)
    }
}
