// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retryable event model
//!
//! An event is a state-changing intent that failed against the remote store
//! and was captured for later delivery. The persisted wire format is fixed:
//! `{"type": ..., "data": {...}, "created_at": ..., "attempts": ...,
//! "last_attempt": ...}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The intents that can be queued for retry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
    /// Start a consumption session for a product
    StartSession {
        product_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },

    /// Stop a consumption session
    StopSession { session_id: String },
}

impl EventKind {
    /// Wire name of the kind, for logging
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StartSession { .. } => "start_session",
            EventKind::StopSession { .. } => "stop_session",
        }
    }
}

/// A queued intent awaiting delivery to the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    /// Set at enqueue time, immutable afterwards
    pub created_at: DateTime<Utc>,
    /// Failed delivery attempts so far
    pub attempts: u32,
    /// Stamp of the most recent attempt; `None` before the first
    #[serde(default)]
    pub last_attempt: Option<DateTime<Utc>>,
}

impl QueuedEvent {
    /// Create a fresh event with no attempts recorded
    pub fn new(kind: EventKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            created_at: now,
            attempts: 0,
            last_attempt: None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
