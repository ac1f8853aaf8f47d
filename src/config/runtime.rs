// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CatalogConfig, ProfileConfig, RetryOptions, SchedulerOptions};
use crate::engine::{default_max_concurrency, RetryPolicy, Scheduler, SchedulerConfig};
use crate::errors::{ConfigError, ValidationError};
use crate::flows::LocalFlowFactory;
use crate::registry::{ProfileDescriptor, ProfileRegistry, ProfileSchedule, TimeOfDay};

/// Scheduler runtime builder - turns a catalog into a populated registry and
/// scheduler settings.
///
/// # Examples
///
/// ```
/// use workload_scheduler::config::{CatalogConfig, RuntimeBuilder};
///
/// let cfg: CatalogConfig = serde_yaml::from_str(r#"
/// scheduler:
///   max_concurrency: 8
/// profiles:
///   - name: PM_38
///     flow: noop
///     interval_seconds: 900
/// "#).unwrap();
///
/// let (registry, settings) = RuntimeBuilder::from_config(&cfg).unwrap();
/// assert_eq!(registry.len(), 1);
/// assert_eq!(settings.max_concurrency, 8);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the registry and scheduler settings from a catalog.
    ///
    /// Every entry's flow selector is resolved up front, so an unknown flow or
    /// malformed option fails here rather than on the entry's first run.
    pub fn from_config(
        cfg: &CatalogConfig,
    ) -> Result<(Arc<ProfileRegistry>, SchedulerConfig), ConfigError> {
        let registry = Arc::new(ProfileRegistry::new());
        for profile in &cfg.profiles {
            registry.register_descriptor(Self::descriptor(profile)?)?;
        }
        Ok((registry, Self::scheduler_config(&cfg.scheduler, &cfg.retry)))
    }

    /// Build a ready-to-spawn scheduler from a catalog.
    pub fn build_scheduler(cfg: &CatalogConfig) -> Result<Scheduler, ConfigError> {
        let (registry, settings) = Self::from_config(cfg)?;
        Ok(Scheduler::new(registry, settings))
    }

    pub fn descriptor(profile: &ProfileConfig) -> Result<ProfileDescriptor, ConfigError> {
        let factory = LocalFlowFactory::create_factory(profile)?;
        Ok(ProfileDescriptor::scheduled(
            profile.name.as_str(),
            factory,
            Self::schedule(profile)?,
        )
        .with_enabled(profile.enabled)
        .with_start_delay(Duration::from_secs(profile.start_delay_seconds))
        .with_max_iterations(profile.max_iterations)
        .with_execution_timeout(profile.timeout_seconds.map(Duration::from_secs))
        .with_flow_selector(profile.flow.as_str()))
    }

    /// Interval or time-of-day cadence of a catalog entry.
    pub fn schedule(profile: &ProfileConfig) -> Result<ProfileSchedule, ConfigError> {
        match (profile.interval_seconds, profile.scheduled_times.is_empty()) {
            (Some(interval), true) => Ok(ProfileSchedule::Every(Duration::from_secs(interval))),
            (None, false) => TimeOfDay::parse(&profile.scheduled_times, &profile.scheduled_days)
                .map(ProfileSchedule::At)
                .map_err(|source| ConfigError::Schedule {
                    profile_name: profile.name.clone(),
                    source,
                }),
            _ => Err(ConfigError::Validation(vec![ValidationError::ScheduleConflict {
                name: profile.name.clone(),
            }])),
        }
    }

    pub fn scheduler_config(scheduler: &SchedulerOptions, retry: &RetryOptions) -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_millis(scheduler.tick_ms),
            max_concurrency: scheduler
                .max_concurrency
                .unwrap_or_else(default_max_concurrency),
            shutdown_grace: Duration::from_secs(scheduler.shutdown_grace_seconds),
            event_capacity: scheduler.event_capacity,
            retry: RetryPolicy::new(
                retry.failure_threshold,
                retry.backoff_multiplier,
                Duration::from_secs(retry.max_backoff_seconds),
            ),
        }
    }
}
