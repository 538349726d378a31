// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Session reconciliation engine and retry processor

mod config;
mod dispatch;
mod error;
mod processor;
mod reconciler;

pub use config::{Config, ConfigError};
pub use dispatch::dispatch;
pub use error::ReconcileError;
pub use processor::{Processor, DEFAULT_PROCESS_INTERVAL};
pub use reconciler::Reconciler;
