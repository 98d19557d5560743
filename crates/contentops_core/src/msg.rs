use chrono::{DateTime, Utc};

use crate::{JobId, JobRecord, JobRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// View is up; start polling.
    Started,
    /// User asked for a new job.
    JobRequested {
        request: JobRequest,
        requested_at: DateTime<Utc>,
    },
    /// Enqueue call returned the server id for a temporary job.
    EnqueueSucceeded { temp_id: JobId, job_id: JobId },
    EnqueueFailed { temp_id: JobId, reason: String },
    /// Poll timer fired.
    PollDue { generation: u64 },
    /// Authoritative job list from the polling endpoint.
    PollCompleted { jobs: Vec<JobRecord> },
    PollFailed { reason: String },
    /// User asked for an immediate refresh.
    RefreshClicked,
    DeleteClicked { id: JobId },
    DeleteSucceeded { id: JobId },
    DeleteFailed { id: JobId, reason: String },
    /// View is being torn down.
    StopRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
