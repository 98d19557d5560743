use std::time::Duration;

use crate::{JobId, JobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit a new job; the answer comes back as `EnqueueSucceeded` or
    /// `EnqueueFailed` for `temp_id`.
    Enqueue { temp_id: JobId, request: JobRequest },
    DeleteJob { id: JobId },
    /// Fetch the authoritative job list now.
    FetchJobs { cycle: u64 },
    /// Arm the poll timer; it reports back with `PollDue { generation }`.
    SchedulePoll { delay: Duration, generation: u64 },
    CancelPoll,
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// User-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
