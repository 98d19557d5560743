use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ops_logging::{ops_debug, ops_info};
use serde_json::Value;

use crate::backend::{ClientSettings, JobBackend, ReqwestBackend};
use crate::timer::PollTimer;
use crate::{BackendError, EngineEvent, JobId, JobType};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

enum EngineCommand {
    Enqueue {
        temp_id: JobId,
        job_type: JobType,
        params: Value,
    },
    Delete {
        id: JobId,
    },
    Fetch {
        cycle: u64,
    },
    SchedulePoll {
        delay: Duration,
        generation: u64,
    },
    CancelPoll,
    Shutdown,
}

/// Sends work to the engine thread. Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Results coming back from the engine thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<(Self, EngineEvents), EngineError> {
        let backend = Arc::new(ReqwestBackend::new(settings)?);
        Self::with_backend(backend)
    }

    /// Starts the engine thread over any backend.
    pub fn with_backend(
        backend: Arc<dyn JobBackend>,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            let mut timer = PollTimer::default();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::SchedulePoll { delay, generation } => {
                        ops_debug!("Next poll in {:?} (timer {})", delay, generation);
                        timer.arm(runtime.handle(), delay, generation, event_tx.clone());
                    }
                    EngineCommand::CancelPoll => timer.cancel(),
                    EngineCommand::Shutdown => {
                        timer.cancel();
                        break;
                    }
                    command => {
                        if let EngineCommand::Fetch { cycle } = &command {
                            ops_logging::set_poll_cycle(*cycle);
                        }
                        let backend = backend.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(backend.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
            ops_info!("Engine thread stopped");
        });

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn enqueue(&self, temp_id: impl Into<JobId>, job_type: JobType, params: Value) {
        self.send(EngineCommand::Enqueue {
            temp_id: temp_id.into(),
            job_type,
            params,
        });
    }

    pub fn delete(&self, id: impl Into<JobId>) {
        self.send(EngineCommand::Delete { id: id.into() });
    }

    pub fn fetch(&self, cycle: u64) {
        self.send(EngineCommand::Fetch { cycle });
    }

    pub fn schedule_poll(&self, delay: Duration, generation: u64) {
        self.send(EngineCommand::SchedulePoll { delay, generation });
    }

    pub fn cancel_poll(&self) {
        self.send(EngineCommand::CancelPoll);
    }

    /// Cancels the timer and stops accepting work. Requests already in
    /// flight are abandoned with the runtime.
    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    backend: &dyn JobBackend,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Enqueue {
            temp_id,
            job_type,
            params,
        } => EngineEvent::Enqueued {
            result: backend.enqueue(job_type, &params).await,
            temp_id,
        },
        EngineCommand::Delete { id } => EngineEvent::Deleted {
            result: backend.delete(&id).await,
            id,
        },
        EngineCommand::Fetch { cycle } => {
            let result = backend.list_jobs().await;
            // The task may resume on any worker thread.
            ops_logging::set_poll_cycle(cycle);
            match &result {
                Ok(jobs) => ops_debug!("Polled {} jobs", jobs.len()),
                Err(err) => ops_debug!("Poll failed: {}", err),
            }
            EngineEvent::Polled { cycle, result }
        }
        EngineCommand::SchedulePoll { .. } | EngineCommand::CancelPoll | EngineCommand::Shutdown => {
            return;
        }
    };
    let _ = event_tx.send(event);
}
