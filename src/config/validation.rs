// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Catalog validation.
//!
//! Checks run in a single pass and collect every problem, so an operator fixing a
//! catalog of hundreds of profiles sees all mistakes at once:
//!
//! 1. **Scheduler and retry options** are within range
//! 2. **Profile names** are non-empty and unique
//! 3. **Cadence** is either a non-zero interval or a valid set of times of day,
//!    and iteration limits can be reached
//!
//! Durations are also bounded above, so no deadline computed from them can
//! leave the range of the monotonic clock.
//!
//! Flow selectors and their options are checked later, when
//! [`RuntimeBuilder`](crate::config::RuntimeBuilder) resolves each entry to a
//! flow factory.
//!
//! # Examples
//!
//! ```rust
//! use workload_scheduler::config::{validate_catalog, CatalogConfig};
//! use workload_scheduler::errors::ValidationError;
//!
//! let cfg: CatalogConfig = serde_yaml::from_str(r#"
//! profiles:
//!   - name: PM_38
//!     flow: noop
//!     interval_seconds: 0
//! "#).unwrap();
//!
//! let errors = validate_catalog(&cfg).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::ZeroInterval { name: "PM_38".to_string() }]);
//! ```

use std::collections::HashSet;

use crate::config::consts::{MAX_SCHEDULE_SECONDS, MAX_TICK_MS};
use crate::config::{CatalogConfig, ProfileConfig};
use crate::errors::ValidationError;
use crate::registry::TimeOfDay;

/// Validate a catalog, returning every error found.
pub fn validate_catalog(cfg: &CatalogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_options(cfg, &mut errors);
    validate_profiles(cfg, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_options(cfg: &CatalogConfig, errors: &mut Vec<ValidationError>) {
    if cfg.scheduler.tick_ms == 0 {
        errors.push(invalid("scheduler.tick_ms", "must be greater than 0"));
    }
    check_upper_bound("scheduler.tick_ms", cfg.scheduler.tick_ms, MAX_TICK_MS, errors);
    check_upper_bound(
        "scheduler.shutdown_grace_seconds",
        cfg.scheduler.shutdown_grace_seconds,
        MAX_SCHEDULE_SECONDS,
        errors,
    );
    if cfg.scheduler.max_concurrency == Some(0) {
        errors.push(invalid("scheduler.max_concurrency", "must be greater than 0"));
    }
    if cfg.scheduler.event_capacity == 0 {
        errors.push(invalid("scheduler.event_capacity", "must be greater than 0"));
    }
    if cfg.retry.failure_threshold == 0 {
        errors.push(invalid("retry.failure_threshold", "must be at least 1"));
    }
    if !cfg.retry.backoff_multiplier.is_finite() || cfg.retry.backoff_multiplier < 1.0 {
        errors.push(invalid(
            "retry.backoff_multiplier",
            "must be a finite number of at least 1.0",
        ));
    }
    check_upper_bound(
        "retry.max_backoff_seconds",
        cfg.retry.max_backoff_seconds,
        MAX_SCHEDULE_SECONDS,
        errors,
    );
}

fn validate_profiles(cfg: &CatalogConfig, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for (index, profile) in cfg.profiles.iter().enumerate() {
        if profile.name.trim().is_empty() {
            errors.push(ValidationError::EmptyProfileName { index });
            continue;
        }

        // Report each duplicated name once, however many times it repeats.
        if !seen.insert(profile.name.as_str()) && reported.insert(profile.name.as_str()) {
            errors.push(ValidationError::DuplicateProfileName {
                name: profile.name.clone(),
            });
        }

        validate_cadence(profile, errors);

        if profile.max_iterations == Some(0) {
            errors.push(ValidationError::ZeroIterations {
                name: profile.name.clone(),
            });
        }

        if profile.timeout_seconds == Some(0) {
            errors.push(invalid(
                &format!("profiles.{}.timeout_seconds", profile.name),
                "must be greater than 0",
            ));
        }

        let field = |name: &str| format!("profiles.{}.{}", profile.name, name);
        check_upper_bound(
            &field("start_delay_seconds"),
            profile.start_delay_seconds,
            MAX_SCHEDULE_SECONDS,
            errors,
        );
        if let Some(timeout) = profile.timeout_seconds {
            check_upper_bound(&field("timeout_seconds"), timeout, MAX_SCHEDULE_SECONDS, errors);
        }
    }
}

fn validate_cadence(profile: &ProfileConfig, errors: &mut Vec<ValidationError>) {
    let has_times = !profile.scheduled_times.is_empty();
    match profile.interval_seconds {
        Some(_) if has_times => errors.push(ValidationError::ScheduleConflict {
            name: profile.name.clone(),
        }),
        None if !has_times => errors.push(ValidationError::ScheduleConflict {
            name: profile.name.clone(),
        }),
        Some(0) => errors.push(ValidationError::ZeroInterval {
            name: profile.name.clone(),
        }),
        Some(interval) => {
            check_upper_bound(
                &format!("profiles.{}.interval_seconds", profile.name),
                interval,
                MAX_SCHEDULE_SECONDS,
                errors,
            );
            if !profile.scheduled_days.is_empty() {
                errors.push(invalid(
                    &format!("profiles.{}.scheduled_days", profile.name),
                    "requires scheduled_times",
                ));
            }
        }
        None => {
            if let Err(e) = TimeOfDay::parse(&profile.scheduled_times, &profile.scheduled_days) {
                errors.push(invalid(
                    &format!("profiles.{}.scheduled_times", profile.name),
                    &e.to_string(),
                ));
            }
        }
    }
}

fn check_upper_bound(field: &str, value: u64, max: u64, errors: &mut Vec<ValidationError>) {
    if value > max {
        errors.push(invalid(field, &format!("must be at most {}", max)));
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidOption {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
