// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PostgREST-style HTTP gateway
//!
//! Table endpoints live under `/rest/v1/{table}` with `eq`/`lte`/`gte`
//! filters passed as query parameters. Every request carries the project
//! api key; row access runs under the caller's bearer token so remote
//! row-level policies apply. Without a signed-in token the api key itself
//! is sent as the bearer, matching the anonymous-role convention.

use crate::auth::SharedAuth;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use gatekit_core::{
    Booking, ConsumptionSession, ConsumptionUpdate, GatewayError, NewBooking, NewConsumption,
    Product, StoreGateway,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// HTTP implementation of the remote store gateway
#[derive(Clone)]
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    auth: SharedAuth,
}

impl RestGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, auth: SharedAuth) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            auth,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("apikey", &self.api_key);
        match self.auth.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request.bearer_auth(&self.api_key),
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unavailable(format!(
                "remote returned status {status}"
            )));
        }
        Ok(response)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, GatewayError> {
        debug!(table, ?filters, "select");
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", columns)])
            .query(filters);
        let response = self.send(self.authorize(request)).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, GatewayError> {
        debug!(table, "insert");
        let request = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.send(self.authorize(request)).await?;
        let mut rows: Vec<R> = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        if rows.is_empty() {
            return Err(GatewayError::Malformed(format!(
                "insert into {table} returned no rows"
            )));
        }
        Ok(rows.remove(0))
    }

    async fn update<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        patch: &T,
    ) -> Result<(), GatewayError> {
        debug!(table, id, "update");
        let request = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .json(patch);
        self.send(self.authorize(request)).await?;
        Ok(())
    }
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl StoreGateway for RestGateway {
    async fn profile_exists(&self, user_id: &str) -> Result<bool, GatewayError> {
        let rows: Vec<serde_json::Value> = self
            .select("profiles", "id", &[("id", format!("eq.{user_id}"))])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn confirmed_bookings_at(
        &self,
        user_id: &str,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, GatewayError> {
        self.select(
            "bookings",
            "*",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("product_id", format!("eq.{product_id}")),
                ("status", "eq.confirmed".to_string()),
                ("start_time", format!("lte.{}", iso(at))),
                ("end_time", format!("gte.{}", iso(at))),
            ],
        )
        .await
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, GatewayError> {
        self.insert("bookings", &booking).await
    }

    async fn insert_consumption(
        &self,
        consumption: NewConsumption,
    ) -> Result<ConsumptionSession, GatewayError> {
        self.insert("product_consumption", &consumption).await
    }

    async fn consumption(&self, id: &str) -> Result<Option<ConsumptionSession>, GatewayError> {
        let rows: Vec<ConsumptionSession> = self
            .select("product_consumption", "*", &[("id", format!("eq.{id}"))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_consumption(
        &self,
        id: &str,
        update: ConsumptionUpdate,
    ) -> Result<(), GatewayError> {
        self.update("product_consumption", id, &update).await
    }

    async fn active_products(&self) -> Result<Vec<Product>, GatewayError> {
        self.select("products", "*", &[("status", "eq.active".to_string())])
            .await
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
