//! Turns the reconciled view into a minimal patch for the rendering surface.
//!
//! `Renderer::render` is pure apart from remembering what it last produced;
//! the surface applying the patch is the only thing touching live UI.

use std::collections::{HashMap, HashSet};

use crate::{AppViewModel, JobId, JobRowView, JobStatus, SystemStatus};

/// Ordered (id, status, progress) of every row.
pub type Signature = Vec<(JobId, JobStatus, u8)>;

pub fn signature(rows: &[JobRowView]) -> Signature {
    rows.iter()
        .map(|row| (row.id.clone(), row.status.clone(), row.progress))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Row left the list; play the exit transition.
    Remove { id: JobId },
    /// Same row, new status or progress; update content in place.
    Update { row: JobRowView },
    /// New row at `index` of the final list; play the enter transition.
    Insert { index: usize, row: JobRowView },
    /// Order changed: replace the whole list in one batch.
    Rebuild {
        rows: Vec<JobRowView>,
        entering: Vec<JobId>,
    },
    SetActiveCount(usize),
    SetSystemStatus(SystemStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderPatch {
    pub ops: Vec<PatchOp>,
}

impl RenderPatch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    signature: Option<Signature>,
    rendered: Vec<JobRowView>,
    active_count: Option<usize>,
    system_status: Option<SystemStatus>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows as of the last emitted patch.
    pub fn rendered(&self) -> &[JobRowView] {
        &self.rendered
    }

    pub fn render(&mut self, view: &AppViewModel) -> RenderPatch {
        let next_signature = signature(&view.jobs);
        if self.signature.as_ref() == Some(&next_signature) {
            return RenderPatch::default();
        }

        let mut ops = diff_rows(&self.rendered, &view.jobs);
        if self.active_count != Some(view.active_count) {
            ops.push(PatchOp::SetActiveCount(view.active_count));
            self.active_count = Some(view.active_count);
        }
        let system_status = SystemStatus::from_active_count(view.active_count);
        if self.system_status != Some(system_status) {
            ops.push(PatchOp::SetSystemStatus(system_status));
            self.system_status = Some(system_status);
        }

        self.signature = Some(next_signature);
        self.rendered = view.jobs.clone();
        RenderPatch { ops }
    }
}

/// Diffs two row lists by id.
///
/// When the surviving rows keep their relative order only removals, inserts
/// and in-place updates are emitted; otherwise the list is rebuilt once.
pub fn diff_rows(previous: &[JobRowView], next: &[JobRowView]) -> Vec<PatchOp> {
    let previous_by_id: HashMap<&str, &JobRowView> =
        previous.iter().map(|row| (row.id.as_str(), row)).collect();
    let next_ids: HashSet<&str> = next.iter().map(|row| row.id.as_str()).collect();

    let mut ops: Vec<PatchOp> = previous
        .iter()
        .filter(|row| !next_ids.contains(row.id.as_str()))
        .map(|row| PatchOp::Remove { id: row.id.clone() })
        .collect();

    let kept_before = previous
        .iter()
        .map(|row| row.id.as_str())
        .filter(|id| next_ids.contains(id));
    let kept_after = next
        .iter()
        .map(|row| row.id.as_str())
        .filter(|id| previous_by_id.contains_key(id));

    if kept_before.eq(kept_after) {
        for (index, row) in next.iter().enumerate() {
            match previous_by_id.get(row.id.as_str()) {
                None => ops.push(PatchOp::Insert {
                    index,
                    row: row.clone(),
                }),
                Some(old) if old.status != row.status || old.progress != row.progress => {
                    ops.push(PatchOp::Update { row: row.clone() })
                }
                Some(_) => {}
            }
        }
    } else {
        ops.push(PatchOp::Rebuild {
            rows: next.to_vec(),
            entering: next
                .iter()
                .filter(|row| !previous_by_id.contains_key(row.id.as_str()))
                .map(|row| row.id.clone())
                .collect(),
        });
    }

    ops
}

/// Applies a row-level op to a mirror of the surface's list.
/// Badge and status ops leave the rows untouched.
pub fn apply_op(rows: &mut Vec<JobRowView>, op: &PatchOp) {
    match op {
        PatchOp::Remove { id } => rows.retain(|row| row.id != *id),
        PatchOp::Update { row } => {
            if let Some(existing) = rows.iter_mut().find(|existing| existing.id == row.id) {
                *existing = row.clone();
            }
        }
        PatchOp::Insert { index, row } => {
            let index = (*index).min(rows.len());
            rows.insert(index, row.clone());
        }
        PatchOp::Rebuild { rows: next, .. } => *rows = next.clone(),
        PatchOp::SetActiveCount(_) | PatchOp::SetSystemStatus(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{JobPayload, JobRecord};

    fn row(id: &str, status: JobStatus, progress: u8) -> JobRowView {
        let record = JobRecord::confirmed(id, status, progress, JobPayload::new("post", id), Utc::now());
        JobRowView::from(&record)
    }

    #[test]
    fn unchanged_order_yields_inserts_and_updates_only() {
        let before = vec![row("a", JobStatus::Queued, 0), row("b", JobStatus::Queued, 0)];
        let after = vec![
            row("new", JobStatus::Processing, 0),
            row("a", JobStatus::GeneratingImage, 40),
            row("b", JobStatus::Queued, 0),
        ];

        let ops = diff_rows(&before, &after);
        assert_eq!(
            ops,
            vec![
                PatchOp::Insert {
                    index: 0,
                    row: after[0].clone()
                },
                PatchOp::Update {
                    row: after[1].clone()
                },
            ]
        );
    }

    #[test]
    fn reorder_rebuilds_in_one_batch() {
        let before = vec![row("a", JobStatus::Queued, 0), row("b", JobStatus::Queued, 0)];
        let after = vec![row("b", JobStatus::Queued, 0), row("c", JobStatus::Queued, 0), row("a", JobStatus::Queued, 0)];

        let ops = diff_rows(&before, &after);
        assert_eq!(
            ops,
            vec![PatchOp::Rebuild {
                rows: after.clone(),
                entering: vec!["c".to_string()],
            }]
        );
    }

    #[test]
    fn removals_come_before_rebuild() {
        let before = vec![row("a", JobStatus::Queued, 0), row("x", JobStatus::Ready, 100), row("b", JobStatus::Queued, 0)];
        let after = vec![row("b", JobStatus::Queued, 0), row("a", JobStatus::Queued, 0)];

        let ops = diff_rows(&before, &after);
        assert_eq!(ops[0], PatchOp::Remove { id: "x".into() });
        assert!(matches!(ops[1], PatchOp::Rebuild { .. }));
    }

    #[test]
    fn apply_op_follows_diff() {
        let before = vec![row("a", JobStatus::Queued, 0), row("b", JobStatus::Queued, 0), row("c", JobStatus::Queued, 0)];
        let after = vec![
            row("n1", JobStatus::Processing, 0),
            row("a", JobStatus::Ready, 100),
            row("n2", JobStatus::Processing, 0),
            row("c", JobStatus::Queued, 0),
        ];

        let mut mirror = before.clone();
        for op in diff_rows(&before, &after) {
            apply_op(&mut mirror, &op);
        }
        assert_eq!(mirror, after);
    }
}
