use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::Utc;
use contentops_core::{update, AppState, Effect, Msg, PollPolicy, Renderer};
use contentops_engine::EngineHandle;
use ops_logging::{ops_info, ops_warn};

use super::commands::{parse_command, Command, HELP};
use super::config::{AppConfig, BASE_URL_ENV, CONFIG_FILE};
use super::effects::{spawn_event_loop, EffectRunner};
use super::logging;
use super::surface::{Surface, TerminalSurface};

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Input {
    Msg(Msg),
    Help,
    Invalid(String),
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {CONFIG_FILE}"))?
        .with_base_url_override(std::env::var(BASE_URL_ENV).ok());
    config.validate().context("invalid configuration")?;
    logging::initialize(config.log_destination, config.level_filter()?);

    let (engine, events) =
        EngineHandle::new(config.client_settings()).context("starting job engine")?;
    let runner = EffectRunner::new(engine.clone());
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_event_loop(events, input_tx.clone());
    spawn_stdin_reader(input_tx);

    let mut app = AppLoop::new(config.poll_policy(), TerminalSurface::new(io::stdout()));
    app.surface.show(&format!("Job panel for {}. Type help for commands.", config.base_url));
    runner.run(app.dispatch(Msg::Started));

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => runner.run(app.dispatch(msg)),
            Input::Help => app.surface.show(HELP),
            Input::Invalid(reason) => app.surface.show(&reason),
            Input::Quit => break,
        }
    }

    runner.run(app.dispatch(Msg::StopRequested));
    engine.shutdown();
    ops_info!("Job panel closed");
    Ok(())
}

/// Owns the state and the surface. The only place `update` is called.
pub struct AppLoop<S: Surface> {
    state: AppState,
    renderer: Renderer,
    surface: S,
}

impl<S: Surface> AppLoop<S> {
    pub fn new(policy: PollPolicy, surface: S) -> Self {
        Self {
            state: AppState::with_policy(policy),
            renderer: Renderer::new(),
            surface,
        }
    }

    /// Applies `msg`, repaints if needed and returns the effects meant for
    /// the engine.
    pub fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let is_poll_result = matches!(msg, Msg::PollCompleted { .. } | Msg::PollFailed { .. });
        if is_poll_result {
            ops_logging::set_poll_cycle(self.state.scheduler().cycle());
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        let view = dirty.then(|| state.view());
        self.state = state;

        if let Some(view) = view {
            let patch = self.renderer.render(&view);
            if !patch.is_empty() {
                self.surface.apply(&patch);
            }
        }

        let mut engine_effects = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.surface.notify(&notification),
                other => engine_effects.push(other),
            }
        }
        engine_effects
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    ops_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            let input = match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => Input::Quit,
                Ok(Some(Command::Help)) => Input::Help,
                Ok(Some(command)) => match command.into_msg(Utc::now()) {
                    Some(msg) => Input::Msg(msg),
                    None => continue,
                },
                Err(reason) => Input::Invalid(reason),
            };
            let quit = matches!(input, Input::Quit);
            if input_tx.send(input).is_err() || quit {
                return;
            }
        }
        // EOF closes the panel like `quit`.
        let _ = input_tx.send(Input::Quit);
    });
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use contentops_core::{JobPayload, JobRecord, JobRequest, JobStatus, Notification, RenderPatch};

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        patches: Vec<RenderPatch>,
        notices: Vec<Notification>,
    }

    impl Surface for RecordingSurface {
        fn apply(&mut self, patch: &RenderPatch) {
            self.patches.push(patch.clone());
        }

        fn notify(&mut self, notification: &Notification) {
            self.notices.push(notification.clone());
        }

        fn show(&mut self, _text: &str) {}
    }

    fn confirmed(id: &str, status: &str) -> JobRecord {
        JobRecord::confirmed(id, JobStatus::classify(status), 50, JobPayload::new("post", "Launch day"), Utc::now())
    }

    #[test]
    fn dispatch_paints_once_per_visible_change() {
        let mut app = AppLoop::new(PollPolicy::default(), RecordingSurface::default());
        let effects = app.dispatch(Msg::Started);
        assert_eq!(effects, vec![Effect::FetchJobs { cycle: 1 }]);

        let effects = app.dispatch(Msg::JobRequested {
            request: JobRequest::GeneratePost {
                headline: "Launch day".into(),
                source_url: None,
            },
            requested_at: Utc::now(),
        });
        assert!(matches!(&effects[..], [Effect::Enqueue { temp_id, .. }] if temp_id == "tmp-1"));
        assert_eq!(app.surface().patches.len(), 1);

        app.dispatch(Msg::PollCompleted {
            jobs: vec![confirmed("42", "generating_image")],
        });
        assert_eq!(app.surface().patches.len(), 2);

        app.dispatch(Msg::PollDue { generation: 1 });
        app.dispatch(Msg::PollCompleted {
            jobs: vec![confirmed("42", "generating_image")],
        });
        assert_eq!(app.surface().patches.len(), 2);
    }

    #[test]
    fn empty_first_poll_paints_the_idle_badge() {
        let mut app = AppLoop::new(PollPolicy::default(), TerminalSurface::new(Vec::new()));
        app.dispatch(Msg::Started);
        app.dispatch(Msg::PollCompleted { jobs: Vec::new() });
        app.dispatch(Msg::PollDue { generation: 1 });
        app.dispatch(Msg::PollCompleted { jobs: Vec::new() });

        let text = String::from_utf8(app.surface.into_inner()).unwrap();
        assert_eq!(text, "[0 active | idle]\n");
    }

    #[test]
    fn notifications_go_to_the_surface_not_the_engine() {
        let mut app = AppLoop::new(PollPolicy::default(), RecordingSurface::default());
        app.dispatch(Msg::JobRequested {
            request: JobRequest::GenerateBlog {
                topic: "Rust".into(),
                keywords: Vec::new(),
            },
            requested_at: Utc::now(),
        });
        let effects = app.dispatch(Msg::EnqueueFailed {
            temp_id: "tmp-1".into(),
            reason: "http status 502".into(),
        });
        assert!(effects.is_empty());
        assert_eq!(app.surface().notices.len(), 1);
        assert_eq!(app.surface().patches.len(), 2);
    }
}
