use std::sync::{Arc, Mutex};
use std::time::Duration;

use contentops_engine::{
    BackendError, EngineEvent, EngineHandle, JobBackend, JobId, JobType, RemoteJob,
};
use serde_json::{json, Value};

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobBackend for FakeBackend {
    async fn list_jobs(&self) -> Result<Vec<RemoteJob>, BackendError> {
        self.calls.lock().unwrap().push("list".into());
        Ok(vec![RemoteJob {
            id: "42".into(),
            alt_id: None,
            status: "processing".into(),
            progress: Some(10),
            job_type: Some("post".into()),
            payload: json!({"headline": "Launch day"}),
            result: None,
            error: None,
            created_at: None,
        }])
    }

    async fn enqueue(&self, job_type: JobType, params: &Value) -> Result<JobId, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("enqueue {} {}", job_type.path_segment(), params["headline"]));
        Ok("42".into())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(format!("delete {id}"));
        Ok(())
    }
}

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn commands_come_back_as_events() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, events) = EngineHandle::with_backend(backend.clone()).expect("engine");

    engine.enqueue("tmp-1", JobType::Post, json!({"headline": "Launch day"}));
    match events.recv_timeout(WAIT) {
        Some(EngineEvent::Enqueued { temp_id, result }) => {
            assert_eq!(temp_id, "tmp-1");
            assert_eq!(result, Ok("42".to_string()));
        }
        other => panic!("unexpected {other:?}"),
    }

    engine.fetch(3);
    match events.recv_timeout(WAIT) {
        Some(EngineEvent::Polled { cycle, result }) => {
            assert_eq!(cycle, 3);
            assert_eq!(result.unwrap()[0].id, "42");
        }
        other => panic!("unexpected {other:?}"),
    }

    engine.delete("42");
    assert!(matches!(
        events.recv_timeout(WAIT),
        Some(EngineEvent::Deleted { result: Ok(()), .. })
    ));
    assert_eq!(
        backend.calls(),
        vec!["enqueue post \"Launch day\"", "list", "delete 42"]
    );
    engine.shutdown();
}

#[test]
fn armed_timer_reports_its_generation() {
    let (engine, events) = EngineHandle::with_backend(Arc::new(FakeBackend::default())).expect("engine");
    engine.schedule_poll(Duration::from_millis(10), 5);
    assert_eq!(
        events.recv_timeout(WAIT),
        Some(EngineEvent::PollDue { generation: 5 })
    );
    engine.shutdown();
}

#[test]
fn rearming_replaces_the_pending_timer() {
    let (engine, events) = EngineHandle::with_backend(Arc::new(FakeBackend::default())).expect("engine");
    engine.schedule_poll(Duration::from_millis(200), 1);
    engine.schedule_poll(Duration::from_millis(20), 2);

    assert_eq!(
        events.recv_timeout(WAIT),
        Some(EngineEvent::PollDue { generation: 2 })
    );
    assert_eq!(events.recv_timeout(Duration::from_millis(400)), None);
    engine.shutdown();
}

#[test]
fn cancelled_timer_never_fires() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, events) = EngineHandle::with_backend(backend.clone()).expect("engine");
    engine.schedule_poll(Duration::from_millis(50), 1);
    engine.cancel_poll();

    assert_eq!(events.recv_timeout(Duration::from_millis(300)), None);
    assert!(backend.calls().is_empty());
    engine.shutdown();
}
