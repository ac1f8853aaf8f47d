// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the scheduler loop lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Scheduler start-up and configuration
//! * Dispatch passes and queueing under the concurrency cap
//! * Graceful shutdown and fatal internal errors

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::errors::SchedulerError;
use crate::observability::messages::StructuredLog;

/// Scheduler loop started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workload_scheduler::observability::messages::scheduler::SchedulerStarted;
/// use std::time::Duration;
///
/// let msg = SchedulerStarted {
///     profile_count: 250,
///     max_concurrency: 64,
///     tick: Duration::from_secs(1),
/// };
///
/// assert_eq!(msg.to_string(), "Scheduler started: 250 profiles, max_concurrency=64, tick=1s");
/// ```
pub struct SchedulerStarted {
    pub profile_count: usize,
    pub max_concurrency: usize,
    pub tick: Duration,
}

impl Display for SchedulerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduler started: {} profiles, max_concurrency={}, tick={:?}",
            self.profile_count, self.max_concurrency, self.tick
        )
    }
}

impl StructuredLog for SchedulerStarted {
    fn log(&self) {
        tracing::info!(
            profile_count = self.profile_count,
            max_concurrency = self.max_concurrency,
            tick_ms = self.tick.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "scheduler",
            span_name = name,
            profile_count = self.profile_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// One dispatch pass finished.
///
/// # Log Level
/// `debug!` - Emitted every tick
pub struct DispatchPassCompleted {
    pub due: usize,
    pub dispatched: usize,
    pub queued: usize,
}

impl Display for DispatchPassCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatch pass: {} due, {} dispatched, {} queued at concurrency cap",
            self.due, self.dispatched, self.queued
        )
    }
}

impl StructuredLog for DispatchPassCompleted {
    fn log(&self) {
        tracing::debug!(
            due = self.due,
            dispatched = self.dispatched,
            queued = self.queued,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dispatch_pass",
            span_name = name,
            due = self.due,
            dispatched = self.dispatched,
        )
    }
}

/// Graceful shutdown requested.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SchedulerShutdownStarted {
    pub in_flight: usize,
    pub grace: Duration,
}

impl Display for SchedulerShutdownStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduler shutting down: waiting up to {:?} for {} in-flight execution(s)",
            self.grace, self.in_flight
        )
    }
}

impl StructuredLog for SchedulerShutdownStarted {
    fn log(&self) {
        tracing::info!(
            in_flight = self.in_flight,
            grace_ms = self.grace.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scheduler_shutdown", span_name = name, in_flight = self.in_flight)
    }
}

/// Graceful shutdown finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SchedulerShutdownCompleted {
    pub duration: Duration,
    pub abandoned: usize,
}

impl Display for SchedulerShutdownCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduler stopped in {:?}, {} execution(s) abandoned",
            self.duration, self.abandoned
        )
    }
}

impl StructuredLog for SchedulerShutdownCompleted {
    fn log(&self) {
        if self.abandoned > 0 {
            tracing::warn!(
                duration_ms = self.duration.as_millis() as u64,
                abandoned = self.abandoned,
                "{}", self
            );
        } else {
            tracing::info!(
                duration_ms = self.duration.as_millis() as u64,
                abandoned = self.abandoned,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "scheduler_stopped",
            span_name = name,
            abandoned = self.abandoned,
        )
    }
}

/// Shutdown after a fatal error did not drain cleanly.
///
/// # Log Level
/// `warn!` - The original fatal error is still what the process reports
///
/// # Example
/// ```
/// use workload_scheduler::errors::SchedulerError;
/// use workload_scheduler::observability::messages::scheduler::SchedulerShutdownFailed;
/// use std::time::Duration;
///
/// let error = SchedulerError::ShutdownTimedOut { in_flight: 2, grace: Duration::from_secs(30) };
/// let msg = SchedulerShutdownFailed { error: &error };
///
/// assert!(msg.to_string().starts_with("Scheduler shutdown after fatal error failed: "));
/// ```
pub struct SchedulerShutdownFailed<'a> {
    pub error: &'a SchedulerError,
}

impl Display for SchedulerShutdownFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduler shutdown after fatal error failed: {}", self.error)
    }
}

impl StructuredLog for SchedulerShutdownFailed<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "scheduler_shutdown_failed",
            span_name = name,
            error = %self.error,
        )
    }
}

/// Scheduler hit unrecoverable internal state corruption.
///
/// # Log Level
/// `error!` - The process is about to terminate
pub struct SchedulerFatal<'a> {
    pub reason: &'a str,
}

impl Display for SchedulerFatal<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduler fatal error, shutting down: {}", self.reason)
    }
}

impl StructuredLog for SchedulerFatal<'_> {
    fn log(&self) {
        tracing::error!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("scheduler_fatal", span_name = name, reason = self.reason)
    }
}
