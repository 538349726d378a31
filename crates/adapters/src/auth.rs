// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory authentication context shared with the host
//!
//! The host's login flow owns tokens end to end (sign-in, refresh, secret
//! storage). It publishes the signed-in identity here; the reconciler and
//! the REST gateway only ever read it.

use gatekit_core::AuthContext;
use std::sync::{Arc, RwLock};

/// A signed-in identity as supplied by the host's login flow
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub access_token: String,
}

/// Shared, swappable auth state
#[derive(Clone, Default)]
pub struct SharedAuth {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SharedAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a signed-in session
    pub fn set_session(&self, session: AuthSession) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    /// Drop the current session (sign-out)
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Bearer token for remote requests, while signed in
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

impl AuthContext for SharedAuth {
    fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.user_id.clone())
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
