use ops_logging::{ops_debug, ops_info, ops_warn};

use crate::{is_temporary_id, AppState, Effect, Msg, Notification};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => state.scheduler_mut().start(),
        Msg::JobRequested {
            request,
            requested_at,
        } => {
            let temp_id = state.allocate_temp_id();
            state
                .store_mut()
                .add_optimistic(temp_id.clone(), request.display_payload(), requested_at);
            state.mark_dirty();
            ops_info!("Job {} requested ({})", temp_id, request.kind());
            vec![Effect::Enqueue { temp_id, request }]
        }
        Msg::EnqueueSucceeded { temp_id, job_id } => {
            state.remember_session_job(job_id.clone());
            if state.store_mut().resolve_id(&temp_id, job_id.clone()) {
                state.store_mut().prune_matched();
                state.mark_dirty();
            } else {
                ops_debug!("Job {} was reconciled before its id {} arrived", temp_id, job_id);
            }
            state.scheduler_mut().refresh_now()
        }
        Msg::EnqueueFailed { temp_id, reason } => {
            let removed = state.store_mut().remove_optimistic(&temp_id);
            ops_warn!("Enqueue of {} failed: {}", temp_id, reason);
            let mut effects = Vec::new();
            if let Some(record) = removed {
                state.mark_dirty();
                effects.push(Effect::Notify(Notification::error(format!(
                    "Could not start \"{}\": {}",
                    record.payload.title, reason
                ))));
            }
            effects
        }
        Msg::PollDue { generation } => state.scheduler_mut().on_due(generation),
        Msg::PollCompleted { jobs } => {
            let before = state.view().jobs;
            let first_snapshot = !state.has_snapshot();
            let notifications = state.apply_poll(jobs);
            // The first snapshot always paints, even when empty.
            if first_snapshot || state.view().jobs != before {
                state.mark_dirty();
            }
            let active = state.store().has_active();
            let mut effects: Vec<Effect> =
                notifications.into_iter().map(Effect::Notify).collect();
            effects.extend(state.scheduler_mut().on_settled(Some(active)));
            effects
        }
        Msg::PollFailed { reason } => {
            ops_warn!("Poll failed, keeping last snapshot: {}", reason);
            state.scheduler_mut().on_settled(None)
        }
        Msg::RefreshClicked => state.scheduler_mut().refresh_now(),
        Msg::DeleteClicked { id } => {
            if is_temporary_id(&id) {
                vec![Effect::Notify(Notification::info(
                    "That job is still being created; try again in a moment",
                ))]
            } else if state.store().find(&id).is_none() || state.store().is_deleting(&id) {
                Vec::new()
            } else {
                state.store_mut().mark_deleting(id.clone());
                state.mark_dirty();
                vec![Effect::DeleteJob { id }]
            }
        }
        Msg::DeleteSucceeded { id } => {
            // The tombstone is released once a poll stops reporting the job.
            ops_info!("Job {} deleted", id);
            if state.store_mut().remove_optimistic(&id).is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DeleteFailed { id, reason } => {
            ops_warn!("Delete of {} failed: {}", id, reason);
            if state.store_mut().restore_deleted(&id) {
                state.mark_dirty();
            }
            vec![Effect::Notify(Notification::error(format!(
                "Could not delete job {}: {}",
                id, reason
            )))]
        }
        Msg::StopRequested => state.scheduler_mut().stop(),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
