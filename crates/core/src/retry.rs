// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy: exponential backoff under a bounded attempt ceiling

use crate::event::QueuedEvent;
use chrono::{DateTime, Duration, Utc};

/// Delivery attempts an event gets before it becomes permanently ineligible
pub const MAX_RETRY_ATTEMPTS: u32 = 5;

/// Base of the exponential backoff curve
pub const RETRY_BACKOFF_BASE: u32 = 2;

/// Minimum wait after `attempts` failed deliveries: base^attempts seconds
pub fn backoff(attempts: u32) -> Duration {
    // Saturates on corrupt attempt counts instead of overflowing
    Duration::seconds(i64::from(RETRY_BACKOFF_BASE.saturating_pow(attempts)))
}

/// Whether an event has used up its attempt budget
pub fn is_exhausted(event: &QueuedEvent) -> bool {
    event.attempts >= MAX_RETRY_ATTEMPTS
}

/// Whether an event is eligible to run at `now`
pub fn is_due(event: &QueuedEvent, now: DateTime<Utc>) -> bool {
    if is_exhausted(event) {
        return false;
    }
    match event.last_attempt {
        None => true,
        Some(last) => now.signed_duration_since(last) >= backoff(event.attempts),
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
