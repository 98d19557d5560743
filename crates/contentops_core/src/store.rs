use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::reconcile::{find_matches, reconcile, JobMatch};
use crate::{JobId, JobPayload, JobRecord};

/// In-memory holder of the optimistic and confirmed job collections.
///
/// All mutation of job records goes through these methods; nothing here
/// performs I/O.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStore {
    optimistic: Vec<JobRecord>,
    confirmed: Vec<JobRecord>,
    deleting: BTreeSet<JobId>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a locally created job at the front of the optimistic list.
    pub fn add_optimistic(
        &mut self,
        temp_id: impl Into<JobId>,
        payload: JobPayload,
        created_at: DateTime<Utc>,
    ) -> JobRecord {
        let record = JobRecord::optimistic(temp_id, payload, created_at);
        self.optimistic.insert(0, record.clone());
        record
    }

    /// Swaps a temporary id for the server id. Returns false when the record
    /// is already gone, which is expected if a poll reconciled it first.
    pub fn resolve_id(&mut self, temp_id: &str, real_id: impl Into<JobId>) -> bool {
        match self.optimistic.iter_mut().find(|record| record.id == temp_id) {
            Some(record) => {
                record.id = real_id.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_optimistic(&mut self, id: &str) -> Option<JobRecord> {
        let index = self.optimistic.iter().position(|record| record.id == id)?;
        Some(self.optimistic.remove(index))
    }

    /// Replaces the confirmed collection with a fresh server snapshot.
    /// Tombstones are released once neither the server nor the optimistic
    /// collection holds the id.
    pub fn replace_confirmed(&mut self, list: Vec<JobRecord>) {
        let optimistic = &self.optimistic;
        self.deleting.retain(|id| {
            list.iter().any(|record| record.answers_to(id))
                || optimistic.iter().any(|record| record.id == *id)
        });
        self.confirmed = list;
    }

    /// Drops optimistic records that now have a confirmed counterpart.
    pub fn prune_matched(&mut self) -> Vec<JobMatch> {
        let matches = find_matches(&self.optimistic, &self.confirmed);
        self.optimistic
            .retain(|record| !matches.iter().any(|m| m.optimistic_id == record.id));
        matches
    }

    /// Deduplicated, ordered list for display, minus pending deletions.
    pub fn reconciled_view(&self) -> Vec<JobRecord> {
        let mut view = reconcile(&self.optimistic, &self.confirmed);
        if !self.deleting.is_empty() {
            view.retain(|record| !self.deleting.contains(&record.id));
        }
        view
    }

    pub fn active_count(&self) -> usize {
        self.reconciled_view()
            .iter()
            .filter(|record| record.is_active())
            .count()
    }

    /// True when any optimistic or confirmed job, other than one pending
    /// deletion, still needs polling.
    pub fn has_active(&self) -> bool {
        self.optimistic
            .iter()
            .chain(self.confirmed.iter())
            .filter(|record| !self.deleting.contains(&record.id))
            .any(JobRecord::is_active)
    }

    /// Hides a job while its deletion is pending on the server.
    pub fn mark_deleting(&mut self, id: impl Into<JobId>) {
        self.deleting.insert(id.into());
    }

    /// Makes a job visible again after a failed deletion.
    pub fn restore_deleted(&mut self, id: &str) -> bool {
        self.deleting.remove(id)
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    pub fn find(&self, id: &str) -> Option<&JobRecord> {
        self.optimistic
            .iter()
            .chain(self.confirmed.iter())
            .find(|record| record.id == id)
    }

    pub fn optimistic(&self) -> &[JobRecord] {
        &self.optimistic
    }

    pub fn confirmed(&self) -> &[JobRecord] {
        &self.confirmed
    }
}
