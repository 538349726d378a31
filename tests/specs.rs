//! Behavioral specifications for the gatekit durability layer.
//!
//! These drive the public engine API against fake collaborators and a real
//! on-disk queue file, including restarts simulated by rebuilding every
//! component on top of the same path.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{DateTime, Duration, Utc};
use gatekit_adapters::{FakeAuth, FakeGateway};
use gatekit_core::{ConsumptionSession, ConsumptionStatus, EventKind, FakeClock};
use gatekit_engine::{Processor, Reconciler};
use gatekit_storage::QueueStore;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn base_time() -> DateTime<Utc> {
    "2026-03-01T10:00:00Z".parse().unwrap()
}

struct Host {
    reconciler: Reconciler<FakeGateway, FakeAuth, FakeClock>,
    processor: Processor<FakeGateway, FakeAuth, FakeClock>,
    queue: Arc<Mutex<QueueStore>>,
}

/// Wire up the durability layer the way a host application would,
/// against an existing queue file and remote state
fn boot(path: &Path, gateway: &FakeGateway, clock: &FakeClock) -> Host {
    let queue = Arc::new(Mutex::new(QueueStore::open(path)));
    let auth = FakeAuth::signed_in("user-1");
    let reconciler = Reconciler::new(gateway.clone(), auth, clock.clone(), queue.clone());
    let processor = Processor::new(reconciler.clone(), queue.clone(), clock.clone());
    Host {
        reconciler,
        processor,
        queue,
    }
}

#[tokio::test]
async fn a_failed_start_survives_a_restart_and_converges() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    let gateway = FakeGateway::new();
    gateway.add_profile("user-1");
    let clock = FakeClock::at(base_time());

    // Offline: the direct call fails but the intent is captured
    {
        let host = boot(&path, &gateway, &clock);
        gateway.set_offline(true);
        assert!(host.reconciler.start_session("prod-1").await.is_err());
        assert_eq!(host.queue.lock().unwrap().len(), 1);
    }

    // "Restart": every in-memory component is rebuilt from the file
    gateway.set_offline(false);
    clock.advance(Duration::seconds(5));
    let host = boot(&path, &gateway, &clock);
    assert_eq!(host.queue.lock().unwrap().len(), 1);

    assert_eq!(host.processor.process_due_events().await, 1);
    assert!(host.queue.lock().unwrap().is_empty());

    // The remote converged: one active consumption row exists
    let row = gateway.consumption_row("consumption-2").unwrap();
    assert_eq!(row.status, ConsumptionStatus::Active);
    assert_eq!(row.user_id, "user-1");

    // And the file is back to an empty array
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn a_silently_dropped_stop_retries_until_verified() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    let gateway = FakeGateway::new();
    let clock = FakeClock::at(base_time());
    gateway.seed_consumption(ConsumptionSession {
        id: "cons-1".to_string(),
        product_id: "prod-1".to_string(),
        user_id: "user-1".to_string(),
        booking_id: None,
        start_time: Some(base_time()),
        end_time: None,
        duration_seconds: None,
        status: ConsumptionStatus::Active,
    });

    let host = boot(&path, &gateway, &clock);

    // The update reports success but never lands; verification catches it
    gateway.set_silent_updates(true);
    clock.advance(Duration::seconds(125));
    assert!(host.reconciler.stop_session("cons-1").await.is_err());

    let queued = host.queue.lock().unwrap().events().to_vec();
    assert_eq!(queued.len(), 1);
    assert_eq!(
        queued[0].kind,
        EventKind::StopSession {
            session_id: "cons-1".to_string(),
        }
    );

    // Writes land again: the next driver tick completes the session
    gateway.set_silent_updates(false);
    clock.advance(Duration::seconds(10));
    assert_eq!(host.processor.process_due_events().await, 1);

    let row = gateway.consumption_row("cons-1").unwrap();
    assert_eq!(row.status, ConsumptionStatus::Completed);
    assert_eq!(row.duration_seconds, Some(135));
    assert!(host.queue.lock().unwrap().is_empty());
}

#[tokio::test]
async fn retries_are_paced_by_exponential_backoff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    let gateway = FakeGateway::new();
    gateway.add_profile("user-1");
    let clock = FakeClock::at(base_time());
    let host = boot(&path, &gateway, &clock);

    gateway.set_offline(true);
    assert!(host.reconciler.start_session("prod-1").await.is_err());

    // The first attempt runs immediately and fails; each later window doubles
    assert_eq!(host.processor.process_due_events().await, 0);
    for expected_wait in [2, 4, 8] {
        // Just inside the window: nothing is due
        clock.advance(Duration::seconds(expected_wait - 1));
        let calls = gateway.calls().len();
        assert_eq!(host.processor.process_due_events().await, 0);
        assert_eq!(gateway.calls().len(), calls);

        // At the boundary the retry runs (and fails again, offline)
        clock.advance(Duration::seconds(1));
        let calls = gateway.calls().len();
        assert_eq!(host.processor.process_due_events().await, 0);
        assert!(gateway.calls().len() > calls);
    }
}

#[tokio::test]
async fn a_corrupt_queue_file_resets_to_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    std::fs::write(&path, "{ this is not a queue").unwrap();

    let gateway = FakeGateway::new();
    let clock = FakeClock::at(base_time());
    let host = boot(&path, &gateway, &clock);

    assert!(host.queue.lock().unwrap().is_empty());
    assert_eq!(host.processor.process_due_events().await, 0);
}

#[tokio::test]
async fn a_legacy_event_kind_does_not_take_the_queue_down() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    std::fs::write(
        &path,
        r#"[
            {"type": "refresh_catalog", "data": {}, "created_at": "2026-03-01T09:00:00Z", "attempts": 2, "last_attempt": "2026-03-01T09:05:00Z"},
            {"type": "start_session", "data": {"product_id": "prod-1", "user_id": "user-1"}, "created_at": "2026-03-01T09:00:00Z", "attempts": 0, "last_attempt": null}
        ]"#,
    )
    .unwrap();

    let gateway = FakeGateway::new();
    gateway.add_profile("user-1");
    let clock = FakeClock::at(base_time());
    let host = boot(&path, &gateway, &clock);

    // The legacy element was dropped at load; the real intent still runs
    assert_eq!(host.queue.lock().unwrap().len(), 1);
    assert_eq!(host.processor.process_due_events().await, 1);
    assert!(host.queue.lock().unwrap().is_empty());
}

#[tokio::test]
async fn direct_calls_and_retries_do_not_double_book() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.json");
    let gateway = FakeGateway::new();
    gateway.add_profile("user-1");
    let clock = FakeClock::at(base_time());
    let host = boot(&path, &gateway, &clock);

    // Offline start queues one intent
    gateway.set_offline(true);
    assert!(host.reconciler.start_session("prod-1").await.is_err());

    // Still offline: the retry fails but the queue must not grow
    clock.advance(Duration::seconds(2));
    assert_eq!(host.processor.process_due_events().await, 0);
    assert_eq!(host.queue.lock().unwrap().len(), 1);

    gateway.set_offline(false);
    clock.advance(Duration::seconds(4));
    assert_eq!(host.processor.process_due_events().await, 1);
    assert!(host.queue.lock().unwrap().is_empty());
}
