// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session reconciliation against the remote store
//!
//! Starting a session resolves or fabricates a booking, then inserts an
//! active consumption row. Stopping one computes the duration client-side,
//! updates the row, and re-reads it to confirm the write landed. Failures
//! a retry could fix are queued before the error surfaces, so the intent
//! survives a crash or restart; the caller still gets a definitive result
//! for the immediate call.

use crate::error::ReconcileError;
use gatekit_core::{
    AuthContext, Clock, ConsumptionStatus, ConsumptionUpdate, EventKind, NewBooking,
    NewConsumption, Product, StoreGateway,
};
use gatekit_storage::QueueStore;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Reconciles consumption session state against the remote store
#[derive(Clone)]
pub struct Reconciler<G, A, C> {
    gateway: G,
    auth: A,
    clock: C,
    queue: Arc<Mutex<QueueStore>>,
}

impl<G, A, C> Reconciler<G, A, C>
where
    G: StoreGateway,
    A: AuthContext,
    C: Clock,
{
    pub fn new(gateway: G, auth: A, clock: C, queue: Arc<Mutex<QueueStore>>) -> Self {
        Self {
            gateway,
            auth,
            clock,
            queue,
        }
    }

    /// Start a consumption session for a product, returning its id.
    ///
    /// Retryable failures enqueue a `StartSession` event before the error
    /// surfaces. Auth and profile failures do not: retrying without a
    /// signed-in user cannot succeed.
    pub async fn start_session(&self, product_id: &str) -> Result<String, ReconcileError> {
        let user_id = self
            .auth
            .user_id()
            .ok_or(ReconcileError::NotAuthenticated)?;

        match self.try_start(&user_id, product_id).await {
            Ok(id) => Ok(id),
            Err(err) => {
                if err.is_retryable() {
                    self.enqueue(EventKind::StartSession {
                        product_id: product_id.to_string(),
                        user_id: Some(user_id),
                    });
                }
                Err(err)
            }
        }
    }

    /// Stop a consumption session.
    ///
    /// Retryable failures enqueue a `StopSession` event before the error
    /// surfaces. Stopping an already-completed session is rejected rather
    /// than recomputing a new duration.
    pub async fn stop_session(&self, session_id: &str) -> Result<(), ReconcileError> {
        match self.try_stop(session_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.is_retryable() {
                    self.enqueue(EventKind::StopSession {
                        session_id: session_id.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Active products from the remote catalog
    pub async fn list_products(&self) -> Result<Vec<Product>, ReconcileError> {
        Ok(self.gateway.active_products().await?)
    }

    /// Start without touching the queue. Retry dispatch uses this so a
    /// failed replay bumps the resident event instead of duplicating it.
    pub(crate) async fn try_start(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<String, ReconcileError> {
        if !self.gateway.profile_exists(user_id).await? {
            return Err(ReconcileError::ProfileNotFound(user_id.to_string()));
        }

        let now = self.clock.now();
        let mut bookings = self
            .gateway
            .confirmed_bookings_at(user_id, product_id, now)
            .await?;
        // Deterministic pick among overlapping bookings: earliest start, then id
        bookings.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

        let booking_id = match bookings.into_iter().next() {
            Some(booking) => {
                info!(booking_id = %booking.id, "using existing confirmed booking");
                booking.id
            }
            None => {
                let placeholder = NewBooking::placeholder(user_id, product_id, now);
                let created = self.gateway.insert_booking(placeholder).await?;
                info!(booking_id = %created.id, "created placeholder booking");
                created.id
            }
        };

        let session = self
            .gateway
            .insert_consumption(NewConsumption {
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                booking_id: Some(booking_id),
                start_time: now,
                status: ConsumptionStatus::Active,
            })
            .await?;

        info!(session_id = %session.id, "consumption session started");
        Ok(session.id)
    }

    /// Stop without touching the queue; see `try_start`
    pub(crate) async fn try_stop(&self, session_id: &str) -> Result<(), ReconcileError> {
        let session = self
            .gateway
            .consumption(session_id)
            .await?
            .ok_or_else(|| ReconcileError::SessionNotFound(session_id.to_string()))?;

        if session.status == ConsumptionStatus::Completed {
            return Err(ReconcileError::AlreadyCompleted(session_id.to_string()));
        }
        let start_time = session
            .start_time
            .ok_or_else(|| ReconcileError::MissingStartTime(session_id.to_string()))?;

        let end_time = self.clock.now();
        let duration_seconds = end_time.signed_duration_since(start_time).num_seconds();

        self.gateway
            .update_consumption(
                session_id,
                ConsumptionUpdate {
                    end_time,
                    duration_seconds,
                    status: ConsumptionStatus::Completed,
                },
            )
            .await?;

        // The store can report success while a row policy silently drops
        // the write; re-read and require end_time to have moved.
        let updated = self
            .gateway
            .consumption(session_id)
            .await?
            .ok_or_else(|| ReconcileError::UpdateVerificationFailed(session_id.to_string()))?;
        match updated.end_time {
            Some(_) if updated.end_time != session.end_time => {
                info!(session_id, duration_seconds, "consumption session stopped");
                Ok(())
            }
            _ => Err(ReconcileError::UpdateVerificationFailed(
                session_id.to_string(),
            )),
        }
    }

    /// The signed-in user, if any
    pub(crate) fn current_user(&self) -> Option<String> {
        self.auth.user_id()
    }

    fn enqueue(&self, kind: EventKind) {
        let now = self.clock.now();
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.add_event(kind, now);
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
