// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trait seams for the remote store and the host's authentication context

use crate::model::{
    Booking, ConsumptionSession, ConsumptionUpdate, NewBooking, NewConsumption, Product,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from remote store operations.
///
/// Both variants are handleable: callers treat them as transient and queue
/// a retry rather than giving up on the intent.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure or a non-success status from the remote store
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    /// A response that arrived but did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Table-oriented facade over the remote relational store
#[async_trait]
pub trait StoreGateway: Clone + Send + Sync + 'static {
    /// Whether a profile row exists for the user
    async fn profile_exists(&self, user_id: &str) -> Result<bool, GatewayError>;

    /// Confirmed bookings for `(user, product)` whose `[start_time, end_time]`
    /// range contains `at`
    async fn confirmed_bookings_at(
        &self,
        user_id: &str,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, GatewayError>;

    /// Insert a booking, returning the created row
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, GatewayError>;

    /// Insert a consumption session, returning the created row
    async fn insert_consumption(
        &self,
        consumption: NewConsumption,
    ) -> Result<ConsumptionSession, GatewayError>;

    /// Fetch a consumption session by id
    async fn consumption(&self, id: &str) -> Result<Option<ConsumptionSession>, GatewayError>;

    /// Apply a partial update to a consumption session
    async fn update_consumption(
        &self,
        id: &str,
        update: ConsumptionUpdate,
    ) -> Result<(), GatewayError>;

    /// Products currently marked active in the remote catalog
    async fn active_products(&self) -> Result<Vec<Product>, GatewayError>;
}

/// Read-only view of the host's authentication state.
///
/// Token lifecycle (login, refresh, secret storage) lives outside this
/// crate; the reconciler only asks who is signed in right now.
pub trait AuthContext: Clone + Send + Sync + 'static {
    fn is_authenticated(&self) -> bool;
    fn user_id(&self) -> Option<String>;
}
