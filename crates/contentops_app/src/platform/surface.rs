use std::io::Write;

use contentops_core::{
    apply_op, JobRowView, Notification, Origin, PatchOp, RenderPatch, Severity, SystemStatus,
};
use ops_logging::{ops_trace, ops_warn};

/// The live job list. Patches from the renderer are the only way it changes.
pub trait Surface {
    fn apply(&mut self, patch: &RenderPatch);
    fn notify(&mut self, notification: &Notification);
    fn show(&mut self, text: &str);
}

/// Prints row transitions as lines on a terminal (or any writer).
pub struct TerminalSurface<W: Write> {
    out: W,
    rows: Vec<JobRowView>,
    active_count: usize,
    system_status: SystemStatus,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
            active_count: 0,
            system_status: SystemStatus::Idle,
        }
    }

    pub fn rows(&self) -> &[JobRowView] {
        &self.rows
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn system_status(&self) -> SystemStatus {
        self.system_status
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            ops_warn!("Failed to write to terminal: {}", err);
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn apply(&mut self, patch: &RenderPatch) {
        for op in &patch.ops {
            ops_trace!("apply {:?}", op);
            apply_op(&mut self.rows, op);
            match op {
                PatchOp::Remove { id } => self.emit(&format!("  - [{id}] removed")),
                PatchOp::Update { row } => self.emit(&format!("  ~ {}", format_row(row))),
                PatchOp::Insert { row, .. } => self.emit(&format!("  + {}", format_row(row))),
                PatchOp::Rebuild { rows, entering } => {
                    self.emit(&format!("  = {} jobs", rows.len()));
                    for row in rows {
                        let marker = if entering.contains(&row.id) { '+' } else { ' ' };
                        self.emit(&format!("  {marker} {}", format_row(row)));
                    }
                }
                PatchOp::SetActiveCount(count) => self.active_count = *count,
                PatchOp::SetSystemStatus(status) => self.system_status = *status,
            }
        }
        let badge_changed = patch
            .ops
            .iter()
            .any(|op| matches!(op, PatchOp::SetActiveCount(_) | PatchOp::SetSystemStatus(_)));
        if badge_changed {
            let status = match self.system_status {
                SystemStatus::Idle => "idle",
                SystemStatus::Working => "working",
            };
            self.emit(&format!("[{} active | {}]", self.active_count, status));
        }
    }

    fn notify(&mut self, notification: &Notification) {
        let prefix = match notification.severity {
            Severity::Info => "info",
            Severity::Error => "error",
        };
        self.emit(&format!("{prefix}: {}", notification.message));
    }

    fn show(&mut self, text: &str) {
        self.emit(text);
    }
}

fn format_row(row: &JobRowView) -> String {
    let pending = match row.origin {
        Origin::Optimistic => " (sending)",
        Origin::Confirmed => "",
    };
    let mut line = format!(
        "[{id}] {status} {progress}% {kind}: {title}{pending}",
        id = row.id,
        status = row.status_label,
        progress = row.progress,
        kind = row.kind,
        title = row.title,
    );
    if let Some(error) = &row.error {
        line.push_str(&format!(" ({error})"));
    }
    line
}
