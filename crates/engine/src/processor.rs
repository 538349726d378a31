// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic retry processing
//!
//! The host owns the timer: it calls `process_due_events` on a fixed
//! interval while a user is signed in. Each call drains the events whose
//! backoff has elapsed and reports how many succeeded.

use crate::dispatch;
use crate::reconciler::Reconciler;
use gatekit_core::{AuthContext, Clock, StoreGateway};
use gatekit_storage::QueueStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Reference interval between driver ticks
pub const DEFAULT_PROCESS_INTERVAL: Duration = Duration::from_secs(30);

/// Drains due retry events against the remote store
#[derive(Clone)]
pub struct Processor<G, A, C> {
    reconciler: Reconciler<G, A, C>,
    queue: Arc<Mutex<QueueStore>>,
    clock: C,
}

impl<G, A, C> Processor<G, A, C>
where
    G: StoreGateway,
    A: AuthContext,
    C: Clock,
{
    pub fn new(reconciler: Reconciler<G, A, C>, queue: Arc<Mutex<QueueStore>>, clock: C) -> Self {
        Self {
            reconciler,
            queue,
            clock,
        }
    }

    /// Process every currently due event, in insertion order.
    ///
    /// Returns the number of events that succeeded and were removed. The
    /// queue lock is released while a handler runs against the gateway.
    pub async fn process_due_events(&self) -> usize {
        let due = {
            let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.pending(self.clock.now())
        };

        let mut processed = 0;
        for event in due {
            let succeeded = dispatch::dispatch(&self.reconciler, &event).await;
            let now = self.clock.now();
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.record_attempt(&event, succeeded, now);
            if succeeded {
                processed += 1;
            }
        }
        processed
    }

    /// Drop events that exceeded the attempt ceiling; returns the count removed
    pub fn purge_exhausted(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .purge_exhausted()
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
