use std::sync::mpsc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

/// The single cancellable poll timer. Arming it cancels whatever was pending.
#[derive(Debug, Default)]
pub struct PollTimer {
    pending: Option<CancellationToken>,
}

impl PollTimer {
    pub fn arm(
        &mut self,
        runtime: &Handle,
        delay: Duration,
        generation: u64,
        events: mpsc::Sender<EngineEvent>,
    ) {
        self.cancel();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        runtime.spawn(async move {
            if wait_or_cancel(delay, &token).await {
                let _ = events.send(EngineEvent::PollDue { generation });
            }
        });
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

/// Sleeps for `delay`; returns false if `token` was cancelled first.
pub async fn wait_or_cancel(delay: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
