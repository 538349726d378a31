// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::reconciler::Reconciler;
use chrono::{DateTime, Utc};
use gatekit_adapters::{FakeAuth, FakeGateway};
use gatekit_core::{ConsumptionSession, ConsumptionStatus, FakeClock};
use gatekit_storage::QueueStore;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn base_time() -> DateTime<Utc> {
    "2026-03-01T10:00:00Z".parse().unwrap()
}

fn setup() -> (
    Reconciler<FakeGateway, FakeAuth, FakeClock>,
    FakeGateway,
    FakeAuth,
    Arc<Mutex<QueueStore>>,
    TempDir,
) {
    let dir = TempDir::new().unwrap();
    let queue = Arc::new(Mutex::new(QueueStore::open(dir.path().join("queue.json"))));
    let gateway = FakeGateway::new();
    let auth = FakeAuth::signed_in("user-1");
    let clock = FakeClock::at(base_time());
    let reconciler = Reconciler::new(gateway.clone(), auth.clone(), clock, queue.clone());
    (reconciler, gateway, auth, queue, dir)
}

fn start_event(product_id: &str) -> QueuedEvent {
    QueuedEvent::new(
        EventKind::StartSession {
            product_id: product_id.to_string(),
            user_id: Some("user-1".to_string()),
        },
        base_time(),
    )
}

#[tokio::test]
async fn start_event_dispatches_to_the_reconciler() {
    let (reconciler, gateway, _auth, _queue, _dir) = setup();
    gateway.add_profile("user-1");

    assert!(dispatch(&reconciler, &start_event("prod-1")).await);
    // A consumption row now exists
    assert!(gateway.consumption_row("consumption-2").is_some());
}

#[tokio::test]
async fn stop_event_dispatches_to_the_reconciler() {
    let (reconciler, gateway, _auth, _queue, _dir) = setup();
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

    let event = QueuedEvent::new(
        EventKind::StopSession {
            session_id: "cons-1".to_string(),
        },
        base_time(),
    );
    assert!(dispatch(&reconciler, &event).await);

    let row = gateway.consumption_row("cons-1").unwrap();
    assert_eq!(row.status, ConsumptionStatus::Completed);
}

#[tokio::test]
async fn failed_handling_reports_false_without_duplicating_the_event() {
    let (reconciler, gateway, _auth, queue, _dir) = setup();
    gateway.add_profile("user-1");
    gateway.set_offline(true);

    let event = start_event("prod-1");
    assert!(!dispatch(&reconciler, &event).await);

    // The handler never touches the queue; the resident copy is the
    // driver's to update
    assert!(queue.lock().unwrap().is_empty());
}

#[tokio::test]
async fn start_event_while_signed_out_fails() {
    let (reconciler, gateway, auth, queue, _dir) = setup();
    gateway.add_profile("user-1");
    auth.clear();

    assert!(!dispatch(&reconciler, &start_event("prod-1")).await);
    assert!(queue.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stop_event_for_a_missing_session_fails() {
    let (reconciler, _gateway, _auth, _queue, _dir) = setup();

    let event = QueuedEvent::new(
        EventKind::StopSession {
            session_id: "cons-404".to_string(),
        },
        base_time(),
    );
    assert!(!dispatch(&reconciler, &event).await);
}
