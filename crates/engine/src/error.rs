// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for session reconciliation

use gatekit_core::GatewayError;
use thiserror::Error;

/// Errors surfaced by session start/stop operations
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("profile not found for user: {0}")]
    ProfileNotFound(String),
    #[error("consumption session not found: {0}")]
    SessionNotFound(String),
    #[error("consumption session already completed: {0}")]
    AlreadyCompleted(String),
    #[error("consumption session has no start time: {0}")]
    MissingStartTime(String),
    #[error("update verification failed for session: {0}")]
    UpdateVerificationFailed(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ReconcileError {
    /// Whether a queued retry could plausibly succeed.
    ///
    /// This is the single enqueue-on-failure decision: transient gateway
    /// failures and silently-dropped updates are worth retrying; missing
    /// credentials, profiles, or sessions are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReconcileError::Gateway(_) | ReconcileError::UpdateVerificationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_and_verification_failures_are_retryable() {
        assert!(ReconcileError::Gateway(GatewayError::Unavailable("down".to_string()))
            .is_retryable());
        assert!(ReconcileError::Gateway(GatewayError::Malformed("shape".to_string()))
            .is_retryable());
        assert!(ReconcileError::UpdateVerificationFailed("cons-1".to_string()).is_retryable());
    }

    #[test]
    fn terminal_failures_are_not_retryable() {
        assert!(!ReconcileError::NotAuthenticated.is_retryable());
        assert!(!ReconcileError::ProfileNotFound("user-1".to_string()).is_retryable());
        assert!(!ReconcileError::SessionNotFound("cons-1".to_string()).is_retryable());
        assert!(!ReconcileError::AlreadyCompleted("cons-1".to_string()).is_retryable());
        assert!(!ReconcileError::MissingStartTime("cons-1".to_string()).is_retryable());
    }
}
