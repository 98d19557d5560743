//! Content-ops engine: HTTP calls against the job API and the poll timer.
mod backend;
mod engine;
mod timer;
mod types;
mod wire;

pub use backend::{ClientSettings, JobBackend, ReqwestBackend};
pub use engine::{EngineError, EngineEvents, EngineHandle};
pub use timer::{wait_or_cancel, PollTimer};
pub use types::{BackendError, EngineEvent, FailureKind, JobId, JobType, RemoteJob};
pub use wire::{decode_enqueue_response, decode_job_list};
