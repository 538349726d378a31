// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row models for the remote relational store
//!
//! These mirror the remote tables this client touches: `bookings`,
//! `product_consumption`, and `products`. All timestamps are UTC-aware;
//! naive timestamps are rejected at the gateway boundary rather than
//! patched up by string inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker written into the notes of automatically created bookings
pub const PLACEHOLDER_NOTES: &str = "Gateway session - automatic booking placeholder";

/// Booking status as stored remotely.
///
/// Confirmed bookings occupy an exclusion-constrained time range per
/// `(user_id, product_id)`; cancelled bookings do not, which is what makes
/// a cancelled placeholder safe to insert at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A booking row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Insert payload for a booking row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    pub user_id: String,
    pub product_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub legal_agreement_accepted: bool,
    pub notes: String,
}

impl NewBooking {
    /// Placeholder booking for a session that has no real reservation.
    ///
    /// Cancelled status keeps it clear of the remote exclusion constraint
    /// while still providing a `booking_id` foreign key. The range runs
    /// from `now` to the end of the current UTC calendar day.
    pub fn placeholder(
        user_id: impl Into<String>,
        product_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
            start_time: now,
            end_time: end_of_day(now),
            status: BookingStatus::Cancelled,
            legal_agreement_accepted: true,
            notes: PLACEHOLDER_NOTES.to_string(),
        }
    }
}

/// 23:59:59 on the same UTC calendar day
fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(23, 59, 59)
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or(now)
}

/// Consumption session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionStatus {
    Active,
    Completed,
}

/// A consumption session row: the timed record of a user occupying a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionSession {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    pub status: ConsumptionStatus,
}

/// Insert payload for a consumption session row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConsumption {
    pub product_id: String,
    pub user_id: String,
    pub booking_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub status: ConsumptionStatus,
}

/// Update payload applied when a consumption session is stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumptionUpdate {
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub status: ConsumptionStatus,
}

/// A product row from the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
