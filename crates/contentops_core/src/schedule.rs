use std::time::Duration;

use ops_logging::ops_debug;

use crate::Effect;

/// Delay policy for the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Used while any job is active.
    pub active_interval: Duration,
    /// Used when every job is terminal or after a failed poll.
    pub idle_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            active_interval: Duration::from_secs(2),
            idle_interval: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    pub fn next_delay(&self, active: bool) -> Duration {
        if active {
            self.active_interval
        } else {
            self.idle_interval
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No timer pending and no request outstanding.
    #[default]
    Idle,
    /// Timer pending; `generation` identifies it so stale firings are ignored.
    Scheduled { generation: u64 },
    /// Request outstanding.
    InFlight,
    /// Torn down; nothing is rescheduled.
    Stopped,
}

/// Single-flight poll state machine.
///
/// The next timer is only armed once the outstanding fetch settles, so slow
/// responses never stack requests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollScheduler {
    policy: PollPolicy,
    phase: PollPhase,
    generation: u64,
    cycle: u64,
    last_delay: Option<Duration>,
}

impl PollScheduler {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Number of fetches issued so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Delay chosen after the most recent settled fetch.
    pub fn last_delay(&self) -> Option<Duration> {
        self.last_delay
    }

    /// Kicks off the first fetch.
    pub fn start(&mut self) -> Vec<Effect> {
        match self.phase {
            PollPhase::Idle => self.fetch(),
            _ => Vec::new(),
        }
    }

    /// A timer fired.
    pub fn on_due(&mut self, generation: u64) -> Vec<Effect> {
        match self.phase {
            PollPhase::Scheduled { generation: armed } if armed == generation => self.fetch(),
            phase => {
                ops_debug!("Ignoring poll timer {} in phase {:?}", generation, phase);
                Vec::new()
            }
        }
    }

    /// Fetch immediately unless a request is already outstanding.
    pub fn refresh_now(&mut self) -> Vec<Effect> {
        match self.phase {
            PollPhase::Idle => self.fetch(),
            PollPhase::Scheduled { .. } => {
                let mut effects = vec![Effect::CancelPoll];
                effects.extend(self.fetch());
                effects
            }
            PollPhase::InFlight | PollPhase::Stopped => Vec::new(),
        }
    }

    /// The outstanding fetch finished. `active` is `None` when it failed,
    /// which falls back to the idle cadence.
    pub fn on_settled(&mut self, active: Option<bool>) -> Vec<Effect> {
        if self.phase != PollPhase::InFlight {
            return Vec::new();
        }
        let delay = self.policy.next_delay(active.unwrap_or(false));
        self.generation += 1;
        self.phase = PollPhase::Scheduled {
            generation: self.generation,
        };
        self.last_delay = Some(delay);
        vec![Effect::SchedulePoll {
            delay,
            generation: self.generation,
        }]
    }

    /// Cancels any pending timer and suppresses further rescheduling.
    pub fn stop(&mut self) -> Vec<Effect> {
        let effects = match self.phase {
            PollPhase::Scheduled { .. } => vec![Effect::CancelPoll],
            _ => Vec::new(),
        };
        self.phase = PollPhase::Stopped;
        effects
    }

    fn fetch(&mut self) -> Vec<Effect> {
        self.cycle += 1;
        self.phase = PollPhase::InFlight;
        vec![Effect::FetchJobs { cycle: self.cycle }]
    }
}
