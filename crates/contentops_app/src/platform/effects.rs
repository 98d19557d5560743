use std::sync::mpsc;
use std::thread;

use chrono::{DateTime, Utc};
use contentops_core::{Effect, JobPayload, JobRecord, JobRequest, JobStatus, Msg};
use contentops_engine::{EngineEvent, EngineEvents, EngineHandle, JobType, RemoteJob};
use ops_logging::{ops_debug, ops_info, ops_warn};

use super::app::Input;

/// Forwards core effects to the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs engine-bound effects. Notifications are the surface's job and
    /// are skipped here.
    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Enqueue { temp_id, request } => {
                    ops_info!("Enqueue {} kind={}", temp_id, request.kind());
                    self.engine
                        .enqueue(temp_id, map_job_type(&request), request.params());
                }
                Effect::DeleteJob { id } => {
                    ops_info!("Delete {}", id);
                    self.engine.delete(id);
                }
                Effect::FetchJobs { cycle } => {
                    ops_debug!("Fetch jobs (cycle {})", cycle);
                    self.engine.fetch(cycle);
                }
                Effect::SchedulePoll { delay, generation } => {
                    self.engine.schedule_poll(delay, generation);
                }
                Effect::CancelPoll => self.engine.cancel_poll(),
                Effect::Notify(_) => {}
            }
        }
    }
}

/// Pumps engine events into the app's input channel until either side
/// goes away.
pub fn spawn_event_loop(events: EngineEvents, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if let EngineEvent::Polled { cycle, .. } = &event {
                ops_logging::set_poll_cycle(*cycle);
            }
            let msg = map_event(event, Utc::now());
            if input_tx.send(Input::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

pub fn map_event(event: EngineEvent, received_at: DateTime<Utc>) -> Msg {
    match event {
        EngineEvent::Enqueued { temp_id, result } => match result {
            Ok(job_id) => Msg::EnqueueSucceeded { temp_id, job_id },
            Err(err) => Msg::EnqueueFailed {
                temp_id,
                reason: err.to_string(),
            },
        },
        EngineEvent::Deleted { id, result } => match result {
            Ok(()) => Msg::DeleteSucceeded { id },
            Err(err) => Msg::DeleteFailed {
                id,
                reason: err.to_string(),
            },
        },
        EngineEvent::Polled { cycle, result } => match result {
            Ok(jobs) => Msg::PollCompleted {
                jobs: jobs
                    .into_iter()
                    .map(|job| map_remote_job(job, received_at))
                    .collect(),
            },
            Err(err) => {
                ops_warn!("Poll cycle {} failed: {}", cycle, err);
                Msg::PollFailed {
                    reason: err.to_string(),
                }
            }
        },
        EngineEvent::PollDue { generation } => Msg::PollDue { generation },
    }
}

/// Jobs without a creation time are stamped with the time the poll landed.
pub fn map_remote_job(job: RemoteJob, received_at: DateTime<Utc>) -> JobRecord {
    let kind = job
        .job_type
        .or_else(|| {
            job.payload
                .get("type")
                .and_then(|value| value.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "job".to_string());
    JobRecord::confirmed(
        job.id,
        JobStatus::classify(&job.status),
        job.progress.unwrap_or(0),
        JobPayload::from_json(kind, job.payload),
        job.created_at.unwrap_or(received_at),
    )
    .with_alt_id(job.alt_id)
    .with_outcome(job.result, job.error)
}

fn map_job_type(request: &JobRequest) -> JobType {
    match request {
        JobRequest::GeneratePost { .. } => JobType::Post,
        JobRequest::GenerateBlog { .. } => JobType::Blog,
    }
}
