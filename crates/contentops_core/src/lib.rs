//! Content-ops core: job records, reconciliation, poll scheduling and the
//! render diff. Pure state machine; all I/O lives in the engine.
mod effect;
mod msg;
mod record;
mod reconcile;
mod render;
mod request;
mod schedule;
mod state;
mod status;
mod store;
mod update;
mod view_model;

pub use effect::{Effect, Notification, Severity};
pub use msg::Msg;
pub use reconcile::{find_matches, reconcile, JobMatch, MatchRule};
pub use record::{is_temporary_id, JobId, JobPayload, JobRecord, Origin, TEMP_ID_PREFIX};
pub use render::{apply_op, diff_rows, signature, PatchOp, RenderPatch, Renderer, Signature};
pub use request::JobRequest;
pub use schedule::{PollPhase, PollPolicy, PollScheduler};
pub use state::AppState;
pub use status::{JobStatus, StatusClass};
pub use store::JobStore;
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, SystemStatus};
