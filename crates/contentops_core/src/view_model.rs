use crate::{JobId, JobRecord, JobStatus, Origin, PollPhase, StatusClass};

/// Coarse indicator shown next to the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemStatus {
    #[default]
    Idle,
    Working,
}

impl SystemStatus {
    pub fn from_active_count(active_count: usize) -> Self {
        if active_count > 0 {
            Self::Working
        } else {
            Self::Idle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub jobs: Vec<JobRowView>,
    pub job_count: usize,
    pub active_count: usize,
    pub system_status: SystemStatus,
    pub poll_phase: PollPhase,
    pub dirty: bool,
}

/// Presentation record for one job row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: JobId,
    pub kind: String,
    pub title: String,
    pub status: JobStatus,
    pub status_label: String,
    pub class: StatusClass,
    pub progress: u8,
    pub active: bool,
    pub origin: Origin,
    pub error: Option<String>,
}

impl From<&JobRecord> for JobRowView {
    fn from(record: &JobRecord) -> Self {
        Self {
            id: record.id.clone(),
            kind: record.payload.kind.clone(),
            title: record.payload.title.clone(),
            status: record.status.clone(),
            status_label: record.status.label().into_owned(),
            class: record.status.class(),
            progress: record.progress,
            active: record.is_active(),
            origin: record.origin,
            error: record.error.clone(),
        }
    }
}
