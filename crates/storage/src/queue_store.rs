// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store for the retry queue
//!
//! One JSON file holds the whole collection, rewritten wholesale on every
//! mutation. A single running instance owns the file exclusively; nothing
//! here locks against other processes sharing the path, and doing so is
//! unsupported.

use chrono::{DateTime, Utc};
use gatekit_core::{EventKind, QueuedEvent, RetryQueue};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from queue persistence. These are logged at the mutation site,
/// never propagated to the operation that triggered the write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable, file-backed retry queue.
///
/// The in-memory queue is authoritative for the process lifetime: a failed
/// disk write degrades durability but never fails the caller, and the next
/// mutation rewrites the whole file anyway.
pub struct QueueStore {
    path: PathBuf,
    queue: RetryQueue,
}

impl QueueStore {
    /// Open a store, loading any persisted events.
    ///
    /// Never fails: a missing file is an empty queue, and an unparseable
    /// file is reset to empty rather than refusing to start.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let queue = match Self::load(&path) {
            Ok(queue) => queue,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load queue, starting empty");
                RetryQueue::new()
            }
        };
        Self { path, queue }
    }

    /// Open a store backed by a fresh temp-directory file, for tests
    pub fn open_temp() -> Self {
        let dir = std::env::temp_dir().join(format!("gatekit-test-{}", uuid::Uuid::new_v4()));
        Self::open(dir.join("queue.json"))
    }

    fn load(path: &Path) -> Result<RetryQueue, StoreError> {
        if !path.exists() {
            return Ok(RetryQueue::new());
        }
        let json = fs::read_to_string(path)?;
        // Per-element parse: a legacy or garbled element is dropped without
        // discarding its parseable neighbors.
        let raw: Vec<serde_json::Value> = serde_json::from_str(&json)?;
        let mut events = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<QueuedEvent>(value) {
                Ok(event) => events.push(event),
                Err(err) => warn!(error = %err, "dropping unparseable queued event"),
            }
        }
        Ok(RetryQueue::from_events(events))
    }

    /// Append a new event and persist. Returns the event as queued.
    pub fn add_event(&mut self, kind: EventKind, now: DateTime<Utc>) -> QueuedEvent {
        let event = QueuedEvent::new(kind, now);
        info!(event_type = event.kind.name(), "queued event");
        self.queue = self.queue.push(event.clone());
        self.persist();
        event
    }

    /// Events eligible to run at `now`, in insertion order
    pub fn pending(&self, now: DateTime<Utc>) -> Vec<QueuedEvent> {
        self.queue.pending(now)
    }

    /// Record the outcome of a delivery attempt and persist
    pub fn record_attempt(&mut self, event: &QueuedEvent, succeeded: bool, now: DateTime<Utc>) {
        if succeeded {
            info!(event_type = event.kind.name(), "processed queued event");
        } else {
            warn!(
                event_type = event.kind.name(),
                attempts = event.attempts + 1,
                "queued event attempt failed"
            );
        }
        self.queue = self.queue.record_attempt(event, succeeded, now);
        self.persist();
    }

    /// Remove events that exceeded the attempt ceiling; returns the count removed
    pub fn purge_exhausted(&mut self) -> usize {
        let (queue, removed) = self.queue.purge_exhausted();
        if removed > 0 {
            self.queue = queue;
            self.persist();
            info!(removed, "cleared failed events");
        }
        removed
    }

    /// All resident events, in insertion order
    pub fn events(&self) -> &[QueuedEvent] {
        self.queue.events()
    }

    /// Number of resident events, eligible or not
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(err) = self.try_persist() {
            error!(path = %self.path.display(), error = %err, "failed to persist queue");
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.queue)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_store_tests.rs"]
mod tests;
