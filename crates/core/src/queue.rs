//! Retry queue value type
//!
//! An ordered collection of retryable events: insertion order is FIFO among
//! equally eligible events. Operations are pure and return a new queue.
//! Durability is the store's job (`gatekit-storage`), which rewrites the
//! whole collection on every mutation. Membership and removal are by value
//! identity; there is no secondary index.

use crate::event::QueuedEvent;
use crate::retry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered queue of retryable events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryQueue {
    events: Vec<QueuedEvent>,
}

impl RetryQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Rebuild a queue from already-parsed events, preserving their order
    pub fn from_events(events: Vec<QueuedEvent>) -> Self {
        Self { events }
    }

    /// Append an event at the back
    pub fn push(&self, event: QueuedEvent) -> RetryQueue {
        let mut events = self.events.clone();
        events.push(event);
        RetryQueue { events }
    }

    /// Events eligible to run at `now`, in insertion order
    pub fn pending(&self, now: DateTime<Utc>) -> Vec<QueuedEvent> {
        self.events
            .iter()
            .filter(|e| retry::is_due(e, now))
            .cloned()
            .collect()
    }

    /// Record the outcome of a delivery attempt.
    ///
    /// Success removes the first value-equal event; failure increments its
    /// attempt counter and stamps `last_attempt`. An event not present in
    /// the queue leaves it unchanged.
    pub fn record_attempt(
        &self,
        event: &QueuedEvent,
        succeeded: bool,
        now: DateTime<Utc>,
    ) -> RetryQueue {
        let mut events = self.events.clone();
        let Some(pos) = events.iter().position(|e| e == event) else {
            return self.clone();
        };

        if succeeded {
            events.remove(pos);
        } else {
            events[pos].attempts += 1;
            events[pos].last_attempt = Some(now);
        }
        RetryQueue { events }
    }

    /// Drop events that have used up their attempt budget
    pub fn purge_exhausted(&self) -> (RetryQueue, usize) {
        let events: Vec<QueuedEvent> = self
            .events
            .iter()
            .filter(|e| !retry::is_exhausted(e))
            .cloned()
            .collect();
        let removed = self.events.len() - events.len();
        (RetryQueue { events }, removed)
    }

    /// All resident events, in insertion order
    pub fn events(&self) -> &[QueuedEvent] {
        &self.events
    }

    /// Number of resident events, eligible or not
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
