//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_EVENT_LOG_LIMIT, DEFAULT_MAX_REQUEST_SIZE, DEFAULT_PORT};
use serde::Deserialize;
use std::env;

/// Runtime configuration for the TreeGrid server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub max_request_size: usize,
    pub event_log_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            event_log_limit: DEFAULT_EVENT_LOG_LIMIT,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}='{}'", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parsed("PORT").unwrap_or(defaults.port),
            max_request_size: env_parsed("MAX_REQUEST_SIZE").unwrap_or(defaults.max_request_size),
            event_log_limit: env_parsed("EVENT_LOG_LIMIT").unwrap_or(defaults.event_log_limit),
        }
    }
}
