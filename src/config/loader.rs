// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_EVENT_CAPACITY, DEFAULT_FAILURE_THRESHOLD,
    DEFAULT_MAX_BACKOFF_SECONDS, DEFAULT_SHUTDOWN_GRACE_SECONDS, DEFAULT_TICK_MS,
};
use crate::errors::ConfigError;
use crate::observability::messages::config::{CatalogLoaded, CatalogValidationFailed};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Complete workload catalog: scheduler options, retry policy and profile entries.
///
/// Typically loaded from a YAML file; TOML is accepted for files ending in `.toml`.
///
/// # Example
/// ```yaml
/// scheduler:
///   tick_ms: 1000
///   max_concurrency: 16
/// retry:
///   failure_threshold: 3
///   backoff_multiplier: 2.0
///   max_backoff_seconds: 3600
/// profiles:
///   - name: PM_38
///     flow: sleep
///     interval_seconds: 900
///     options:
///       duration_ms: 250
/// ```
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub scheduler: SchedulerOptions,
    #[serde(default)]
    pub retry: RetryOptions,
    pub profiles: Vec<ProfileConfig>,
}

/// Scheduler loop options.
///
/// # Fields
/// * `tick_ms` - Period of the dispatch pass (defaults to 1000)
/// * `max_concurrency` - Cap on simultaneously running flows (defaults to host parallelism)
/// * `shutdown_grace_seconds` - Wait for in-flight runs on shutdown (defaults to 30)
/// * `event_capacity` - Broadcast buffer for profile events (defaults to 1024)
#[derive(Debug, Deserialize)]
pub struct SchedulerOptions {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    pub max_concurrency: Option<usize>,
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            max_concurrency: None,
            shutdown_grace_seconds: DEFAULT_SHUTDOWN_GRACE_SECONDS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Failure and backoff options shared by all profiles.
#[derive(Debug, Deserialize)]
pub struct RetryOptions {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_backoff_seconds")]
    pub max_backoff_seconds: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff_seconds: DEFAULT_MAX_BACKOFF_SECONDS,
        }
    }
}

/// One workload profile in the catalog.
///
/// # Fields
/// * `name` - Unique profile identifier, e.g. `PM_38`
/// * `flow` - Built-in flow selector (`noop`, `sleep`, `shell`, `fail`)
/// * `interval_seconds` - Repeat interval, measured from the end of the previous run
/// * `scheduled_times` - Times of day (`HH:MM` or `HH:MM:SS`, local time) to run
///   at instead of an interval
/// * `scheduled_days` - Weekdays (`MONDAY`, ...) the times apply to; every day when empty
/// * `enabled` - Disabled profiles are registered but start stopped (defaults to true)
/// * `start_delay_seconds` - Offset before the first run (defaults to 0)
/// * `max_iterations` - Finite run count, unbounded when absent
/// * `timeout_seconds` - Per-run deadline, none when absent
/// * `options` - Flow-specific options
#[derive(Debug, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub flow: String,
    pub interval_seconds: Option<u64>,
    #[serde(default)]
    pub scheduled_times: Vec<String>,
    #[serde(default)]
    pub scheduled_days: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub start_delay_seconds: u64,
    pub max_iterations: Option<u32>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_shutdown_grace_seconds() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_SECONDS
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

fn default_max_backoff_seconds() -> u64 {
    DEFAULT_MAX_BACKOFF_SECONDS
}

fn default_enabled() -> bool {
    true
}

/// Load a catalog from a YAML or TOML file, chosen by extension
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let cfg: CatalogConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    Ok(cfg)
}

/// Load and validate a catalog
///
/// Every validation problem is reported at once rather than stopping at the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_catalog(&cfg) {
        CatalogValidationFailed {
            errors: &validation_errors,
        }
        .log();
        return Err(ConfigError::Validation(validation_errors));
    }

    CatalogLoaded {
        path: &path.display().to_string(),
        profile_count: cfg.profiles.len(),
        enabled_count: cfg.profiles.iter().filter(|p| p.enabled).count(),
    }
    .log();

    Ok(cfg)
}
