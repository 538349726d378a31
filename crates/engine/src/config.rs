// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-driven configuration

use crate::processor::DEFAULT_PROCESS_INTERVAL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const STORE_URL_VAR: &str = "GATEKIT_STORE_URL";
const STORE_KEY_VAR: &str = "GATEKIT_STORE_KEY";
const QUEUE_FILE_VAR: &str = "GATEKIT_QUEUE_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Host configuration for the engine and its gateway
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_key: String,
    pub queue_path: PathBuf,
    pub process_interval: Duration,
}

impl Config {
    /// Build from environment variables.
    ///
    /// `GATEKIT_STORE_URL` and `GATEKIT_STORE_KEY` are required;
    /// `GATEKIT_QUEUE_FILE` overrides the default queue location.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url =
            env::var(STORE_URL_VAR).map_err(|_| ConfigError::MissingVar(STORE_URL_VAR))?;
        let store_key =
            env::var(STORE_KEY_VAR).map_err(|_| ConfigError::MissingVar(STORE_KEY_VAR))?;
        let queue_path = env::var(QUEUE_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_queue_path());

        Ok(Self {
            store_url,
            store_key,
            queue_path,
            process_interval: DEFAULT_PROCESS_INTERVAL,
        })
    }

    /// Default queue file under the per-user data directory
    pub fn default_queue_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gatekit")
            .join("queue.json")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
