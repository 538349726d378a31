// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake gateway and auth context for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatekit_core::{
    AuthContext, Booking, BookingStatus, ConsumptionSession, ConsumptionUpdate, GatewayError,
    NewBooking, NewConsumption, Product, StoreGateway,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ProfileExists {
        user_id: String,
    },
    ConfirmedBookingsAt {
        user_id: String,
        product_id: String,
        at: DateTime<Utc>,
    },
    InsertBooking {
        user_id: String,
        product_id: String,
    },
    InsertConsumption {
        user_id: String,
        product_id: String,
    },
    Consumption {
        id: String,
    },
    UpdateConsumption {
        id: String,
    },
    ActiveProducts,
}

#[derive(Default)]
struct FakeStore {
    profiles: Vec<String>,
    bookings: Vec<Booking>,
    consumptions: HashMap<String, ConsumptionSession>,
    products: Vec<Product>,
    calls: Vec<GatewayCall>,
    offline: bool,
    silent_updates: bool,
    next_id: u64,
}

impl FakeStore {
    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline {
            Err(GatewayError::Unavailable("offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// Fake store gateway for testing
#[derive(Clone, Default)]
pub struct FakeGateway {
    store: Arc<Mutex<FakeStore>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// While offline every call fails with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Updates report success but leave the row untouched
    pub fn set_silent_updates(&self, silent: bool) {
        self.lock().silent_updates = silent;
    }

    pub fn add_profile(&self, user_id: impl Into<String>) {
        self.lock().profiles.push(user_id.into());
    }

    pub fn add_booking(&self, booking: Booking) {
        self.lock().bookings.push(booking);
    }

    pub fn add_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    /// Seed a consumption row directly, bypassing insert
    pub fn seed_consumption(&self, session: ConsumptionSession) {
        self.lock()
            .consumptions
            .insert(session.id.clone(), session);
    }

    /// Current state of a consumption row
    pub fn consumption_row(&self, id: &str) -> Option<ConsumptionSession> {
        self.lock().consumptions.get(id).cloned()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.lock().bookings.clone()
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl StoreGateway for FakeGateway {
    async fn profile_exists(&self, user_id: &str) -> Result<bool, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::ProfileExists {
            user_id: user_id.to_string(),
        });
        store.check_online()?;
        Ok(store.profiles.iter().any(|p| p == user_id))
    }

    async fn confirmed_bookings_at(
        &self,
        user_id: &str,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::ConfirmedBookingsAt {
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            at,
        });
        store.check_online()?;
        Ok(store
            .bookings
            .iter()
            .filter(|b| {
                b.user_id == user_id
                    && b.product_id == product_id
                    && b.status == BookingStatus::Confirmed
                    && b.start_time <= at
                    && b.end_time >= at
            })
            .cloned()
            .collect())
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::InsertBooking {
            user_id: booking.user_id.clone(),
            product_id: booking.product_id.clone(),
        });
        store.check_online()?;
        let row = Booking {
            id: store.next_id("booking"),
            user_id: booking.user_id,
            product_id: booking.product_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
            notes: Some(booking.notes),
        };
        store.bookings.push(row.clone());
        Ok(row)
    }

    async fn insert_consumption(
        &self,
        consumption: NewConsumption,
    ) -> Result<ConsumptionSession, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::InsertConsumption {
            user_id: consumption.user_id.clone(),
            product_id: consumption.product_id.clone(),
        });
        store.check_online()?;
        let row = ConsumptionSession {
            id: store.next_id("consumption"),
            product_id: consumption.product_id,
            user_id: consumption.user_id,
            booking_id: consumption.booking_id,
            start_time: Some(consumption.start_time),
            end_time: None,
            duration_seconds: None,
            status: consumption.status,
        };
        store.consumptions.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn consumption(&self, id: &str) -> Result<Option<ConsumptionSession>, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::Consumption { id: id.to_string() });
        store.check_online()?;
        Ok(store.consumptions.get(id).cloned())
    }

    async fn update_consumption(
        &self,
        id: &str,
        update: ConsumptionUpdate,
    ) -> Result<(), GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::UpdateConsumption { id: id.to_string() });
        store.check_online()?;
        if store.silent_updates {
            return Ok(());
        }
        if let Some(row) = store.consumptions.get_mut(id) {
            row.end_time = Some(update.end_time);
            row.duration_seconds = Some(update.duration_seconds);
            row.status = update.status;
        }
        // An update matching no rows still reports success, like the
        // real store's zero-affected-rows response
        Ok(())
    }

    async fn active_products(&self) -> Result<Vec<Product>, GatewayError> {
        let mut store = self.lock();
        store.calls.push(GatewayCall::ActiveProducts);
        store.check_online()?;
        Ok(store
            .products
            .iter()
            .filter(|p| p.status == "active")
            .cloned()
            .collect())
    }
}

/// Fake auth context with a settable current user
#[derive(Clone, Default)]
pub struct FakeAuth {
    user: Arc<Mutex<Option<String>>>,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// An auth context already signed in as `user_id`
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let auth = Self::new();
        auth.set_user(user_id);
        auth
    }

    pub fn set_user(&self, user_id: impl Into<String>) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = Some(user_id.into());
    }

    pub fn clear(&self) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl AuthContext for FakeAuth {
    fn is_authenticated(&self) -> bool {
        self.user
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.user.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
