//! JSON shapes of the job endpoints.
//!
//! The backend is not consistent: ids arrive under `id` or `job_id`, as
//! strings or numbers, and the list may or may not be wrapped in an
//! envelope. Everything is normalized into [`RemoteJob`] here.

use chrono::{DateTime, NaiveDateTime, Utc};
use ops_logging::ops_warn;
use serde::Deserialize;
use serde_json::Value;

use crate::{BackendError, FailureKind, JobId, RemoteJob};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    fn into_id(self) -> Option<JobId> {
        match self {
            WireId::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            WireId::Number(number) => Some(number.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireJob {
    id: Option<WireId>,
    job_id: Option<WireId>,
    status: Option<String>,
    progress: Option<f64>,
    #[serde(alias = "type")]
    job_type: Option<String>,
    #[serde(default)]
    payload: Value,
    result: Option<Value>,
    error: Option<Value>,
    #[serde(alias = "createdAt")]
    created_at: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireJobList {
    Bare(Vec<WireJob>),
    Envelope { jobs: Vec<WireJob> },
}

#[derive(Debug, Deserialize)]
struct WireEnqueued {
    id: Option<WireId>,
    job_id: Option<WireId>,
}

/// Decodes a poll response. Entries without any id are skipped.
pub fn decode_job_list(bytes: &[u8]) -> Result<Vec<RemoteJob>, BackendError> {
    let list: WireJobList = serde_json::from_slice(bytes)
        .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))?;
    let jobs = match list {
        WireJobList::Bare(jobs) | WireJobList::Envelope { jobs } => jobs,
    };
    Ok(jobs.into_iter().filter_map(normalize_job).collect())
}

/// Decodes an enqueue response into the new job id.
pub fn decode_enqueue_response(bytes: &[u8]) -> Result<JobId, BackendError> {
    let body: WireEnqueued = serde_json::from_slice(bytes)
        .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))?;
    body.id
        .and_then(WireId::into_id)
        .or_else(|| body.job_id.and_then(WireId::into_id))
        .ok_or_else(|| BackendError::new(FailureKind::MissingId, "no id or job_id field"))
}

fn normalize_job(wire: WireJob) -> Option<RemoteJob> {
    let primary = wire.id.and_then(WireId::into_id);
    let secondary = wire.job_id.and_then(WireId::into_id);
    let (id, alt_id) = match (primary, secondary) {
        (Some(id), alt) => {
            let alt = alt.filter(|alt| *alt != id);
            (id, alt)
        }
        (None, Some(id)) => (id, None),
        (None, None) => {
            ops_warn!("Skipping job without id (status {:?})", wire.status);
            return None;
        }
    };

    Some(RemoteJob {
        id,
        alt_id,
        status: wire.status.unwrap_or_else(|| "queued".to_string()),
        progress: wire.progress.map(clamp_progress),
        job_type: wire.job_type,
        payload: wire.payload,
        result: wire.result,
        error: wire.error.map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        }),
        created_at: wire.created_at.as_ref().and_then(parse_timestamp),
    })
}

fn clamp_progress(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// Accepts RFC 3339, naive ISO 8601 (taken as UTC) and epoch seconds or
/// milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(number) => {
            let raw = number.as_i64()?;
            if raw.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(raw)
            } else {
                DateTime::from_timestamp(raw, 0)
            }
        }
        _ => None,
    }
}
