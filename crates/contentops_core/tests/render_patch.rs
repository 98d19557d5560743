use chrono::Utc;
use contentops_core::{
    apply_op, update, AppState, JobPayload, JobRecord, JobRequest, JobStatus, Msg, PatchOp,
    Renderer, SystemStatus,
};

fn job(id: &str, status: &str, progress: u8) -> JobRecord {
    JobRecord::confirmed(
        id,
        JobStatus::classify(status),
        progress,
        JobPayload::new("blog", format!("Topic {id}")),
        Utc::now(),
    )
}

fn polled(state: AppState, jobs: Vec<JobRecord>) -> AppState {
    update(state, Msg::PollCompleted { jobs }).0
}

#[test]
fn rendering_an_unchanged_view_twice_is_a_noop() {
    let state = polled(AppState::new(), vec![job("1", "processing", 10), job("2", "ready", 100)]);
    let mut renderer = Renderer::new();

    let first = renderer.render(&state.view());
    assert!(!first.is_empty());
    let second = renderer.render(&state.view());
    assert!(second.is_empty());

    // A poll with identical content does not produce work either.
    let state = polled(state, vec![job("1", "processing", 10), job("2", "ready", 100)]);
    assert!(renderer.render(&state.view()).is_empty());
}

#[test]
fn badge_and_system_status_follow_active_count() {
    let mut renderer = Renderer::new();
    let state = polled(AppState::new(), vec![job("1", "generating_image", 20)]);
    let patch = renderer.render(&state.view());
    assert!(patch.ops.contains(&PatchOp::SetActiveCount(1)));
    assert!(patch.ops.contains(&PatchOp::SetSystemStatus(SystemStatus::Working)));

    let state = polled(state, vec![job("1", "ready", 100)]);
    let patch = renderer.render(&state.view());
    assert!(patch.ops.contains(&PatchOp::SetActiveCount(0)));
    assert!(patch.ops.contains(&PatchOp::SetSystemStatus(SystemStatus::Idle)));
    assert!(patch
        .ops
        .iter()
        .any(|op| matches!(op, PatchOp::Update { row } if row.id == "1")));
}

#[test]
fn progress_change_updates_in_place() {
    let mut renderer = Renderer::new();
    let state = polled(AppState::new(), vec![job("1", "generating_image", 20), job("2", "queued", 0)]);
    renderer.render(&state.view());

    let state = polled(state, vec![job("1", "generating_image", 60), job("2", "queued", 0)]);
    let patch = renderer.render(&state.view());
    assert_eq!(patch.ops.len(), 1);
    assert!(matches!(&patch.ops[0], PatchOp::Update { row } if row.id == "1" && row.progress == 60));
}

#[test]
fn patches_keep_a_mirror_in_sync_with_the_view() {
    let mut renderer = Renderer::new();
    let mut mirror = Vec::new();
    let mut state = AppState::new();

    let steps: Vec<Msg> = vec![
        Msg::PollCompleted {
            jobs: vec![job("1", "queued", 0), job("2", "processing", 5)],
        },
        Msg::JobRequested {
            request: JobRequest::GenerateBlog {
                topic: "Rust".into(),
                keywords: Vec::new(),
            },
            requested_at: Utc::now(),
        },
        Msg::PollCompleted {
            jobs: vec![job("2", "generating_content", 50), job("1", "queued", 0), job("3", "ready", 100)],
        },
        Msg::EnqueueFailed {
            temp_id: "tmp-1".into(),
            reason: "boom".into(),
        },
        Msg::PollCompleted {
            jobs: vec![job("3", "ready", 100)],
        },
    ];

    for msg in steps {
        state = update(state, msg).0;
        let view = state.view();
        for op in renderer.render(&view).ops {
            apply_op(&mut mirror, &op);
        }
        assert_eq!(mirror, view.jobs);
        assert_eq!(renderer.rendered(), view.jobs.as_slice());
    }
}
