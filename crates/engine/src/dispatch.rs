// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes queued events to their reconciler handler

use crate::error::ReconcileError;
use crate::reconciler::Reconciler;
use gatekit_core::{AuthContext, Clock, EventKind, QueuedEvent, StoreGateway};
use tracing::warn;

/// Dispatch one queued event, reporting whether handling succeeded.
///
/// Routing is an exhaustive match on the event kind. Handlers never touch
/// the queue themselves: the caller records the outcome afterwards, so a
/// failure counts toward the resident event's attempt ceiling instead of
/// enqueueing a duplicate. Handler errors are caught and logged here; no
/// fault escapes to the driver.
pub async fn dispatch<G, A, C>(reconciler: &Reconciler<G, A, C>, event: &QueuedEvent) -> bool
where
    G: StoreGateway,
    A: AuthContext,
    C: Clock,
{
    let outcome = match &event.kind {
        EventKind::StartSession { product_id, .. } => {
            // Replays resolve the user at dispatch time, like a fresh start
            match reconciler.current_user() {
                Some(user_id) => reconciler
                    .try_start(&user_id, product_id)
                    .await
                    .map(|_session_id| ()),
                None => Err(ReconcileError::NotAuthenticated),
            }
        }
        EventKind::StopSession { session_id } => reconciler.try_stop(session_id).await,
    };

    match outcome {
        Ok(()) => true,
        Err(err) => {
            warn!(
                event_type = event.kind.name(),
                error = %err,
                "queued event handling failed"
            );
            false
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
