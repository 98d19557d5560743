use std::collections::{BTreeSet, HashMap};

use ops_logging::ops_warn;

use crate::view_model::{AppViewModel, JobRowView, SystemStatus};
use crate::{
    JobId, JobRecord, JobStatus, JobStore, Notification, PollPolicy, PollScheduler, TEMP_ID_PREFIX,
};

/// Everything the job panel knows. Owned by the app loop and only changed
/// through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    store: JobStore,
    scheduler: PollScheduler,
    next_temp_id: u64,
    /// Status of every confirmed job as of the previous poll.
    last_seen: HashMap<JobId, JobStatus>,
    /// Server ids of jobs created in this session.
    session_jobs: BTreeSet<JobId>,
    /// Set once the first poll snapshot has been installed.
    has_snapshot: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            scheduler: PollScheduler::new(policy),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let jobs: Vec<JobRowView> = self
            .store
            .reconciled_view()
            .iter()
            .map(JobRowView::from)
            .collect();
        let active_count = jobs.iter().filter(|row| row.active).count();
        AppViewModel {
            job_count: jobs.len(),
            jobs,
            active_count,
            system_status: SystemStatus::from_active_count(active_count),
            poll_phase: self.scheduler.phase(),
            dirty: self.dirty,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Whether any poll has completed yet.
    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut JobStore {
        &mut self.store
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut PollScheduler {
        &mut self.scheduler
    }

    pub(crate) fn allocate_temp_id(&mut self) -> JobId {
        self.next_temp_id += 1;
        format!("{TEMP_ID_PREFIX}{}", self.next_temp_id)
    }

    pub(crate) fn remember_session_job(&mut self, id: JobId) {
        self.session_jobs.insert(id);
    }

    /// Installs a poll snapshot and reports jobs that just reached a
    /// terminal state.
    ///
    /// A job counts as "just finished" when the previous poll saw it active,
    /// or when this session created it and it is seen for the first time.
    pub(crate) fn apply_poll(&mut self, jobs: Vec<JobRecord>) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for job in &jobs {
            let previous = self.last_seen.get(&job.id);
            if let Some(previous) = previous {
                if !previous.can_transition(&job.status) {
                    ops_warn!(
                        "Job {} moved from {} to {}",
                        job.id,
                        previous,
                        job.status
                    );
                }
            }
            let newly_terminal = match previous {
                Some(previous) => previous.is_active() && job.status.is_terminal(),
                None => job.status.is_terminal() && self.session_jobs.contains(&job.id),
            };
            if newly_terminal {
                notifications.push(finished_notification(job));
            }
        }

        self.last_seen = jobs
            .iter()
            .map(|job| (job.id.clone(), job.status.clone()))
            .collect();
        self.store.replace_confirmed(jobs);
        self.store.prune_matched();
        self.has_snapshot = true;
        notifications
    }
}

fn finished_notification(job: &JobRecord) -> Notification {
    let title = if job.payload.title.is_empty() {
        job.id.as_str()
    } else {
        job.payload.title.as_str()
    };
    match job.status {
        JobStatus::Failed => Notification::error(format!(
            "Job \"{}\" failed: {}",
            title,
            job.error.as_deref().unwrap_or("unknown error")
        )),
        _ => Notification::info(format!("Job \"{}\" is ready", title)),
    }
}
