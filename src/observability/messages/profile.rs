// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-profile events.
//!
//! This module contains message types for logging events related to:
//! * Profile registration and removal
//! * Execution lifecycle (dispatch, success, failure, overlap)
//! * Retry policy decisions (degraded cadence)
//! * Operator lifecycle control (start, stop, restart, pause)

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::engine::SlotState;
use crate::errors::FlowExecutionError;
use crate::observability::messages::StructuredLog;
use crate::registry::format_interval;

/// Profile added to the registry.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workload_scheduler::observability::messages::profile::ProfileRegistered;
///
/// let msg = ProfileRegistered {
///     profile_name: "PM_38",
///     schedule: "Every 0:05:00",
///     enabled: true,
/// };
///
/// assert_eq!(msg.to_string(), "Profile 'PM_38' registered: Every 0:05:00, enabled=true");
/// ```
pub struct ProfileRegistered<'a> {
    pub profile_name: &'a str,
    pub schedule: &'a str,
    pub enabled: bool,
}

impl Display for ProfileRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' registered: {}, enabled={}",
            self.profile_name,
            self.schedule,
            self.enabled
        )
    }
}

impl StructuredLog for ProfileRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            schedule = self.schedule,
            enabled = self.enabled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_registered",
            span_name = name,
            profile_name = self.profile_name,
        )
    }
}

/// Profile removed from the registry.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProfileUnregistered<'a> {
    pub profile_name: &'a str,
}

impl Display for ProfileUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Profile '{}' unregistered", self.profile_name)
    }
}

impl StructuredLog for ProfileUnregistered<'_> {
    fn log(&self) {
        tracing::info!(profile_name = self.profile_name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_unregistered",
            span_name = name,
            profile_name = self.profile_name,
        )
    }
}

/// Profile dispatched onto its own task.
///
/// The span built from this message wraps the whole execution unit, so every
/// event a flow logs carries the profile name and iteration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workload_scheduler::observability::messages::profile::ProfileDispatched;
/// use std::time::Duration;
///
/// let msg = ProfileDispatched {
///     profile_name: "FM_01",
///     iteration: 3,
///     waited: Duration::from_millis(1500),
/// };
///
/// assert_eq!(msg.to_string(), "Profile 'FM_01' dispatched: iteration=3, waited=1.5s past due time");
/// ```
pub struct ProfileDispatched<'a> {
    pub profile_name: &'a str,
    pub iteration: u64,
    pub waited: Duration,
}

impl Display for ProfileDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' dispatched: iteration={}, waited={:?} past due time",
            self.profile_name, self.iteration, self.waited
        )
    }
}

impl StructuredLog for ProfileDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            iteration = self.iteration,
            waited_ms = self.waited.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_execution",
            span_name = name,
            profile_name = self.profile_name,
            iteration = self.iteration,
        )
    }
}

/// Profile execution finished successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProfileSucceeded<'a> {
    pub profile_name: &'a str,
    pub duration: Duration,
    pub next_run_in: Duration,
}

impl Display for ProfileSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' iteration succeeded in {:?}, next run in {:?}",
            self.profile_name, self.duration, self.next_run_in
        )
    }
}

impl StructuredLog for ProfileSucceeded<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            duration_ms = self.duration.as_millis() as u64,
            next_run_in_ms = self.next_run_in.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_succeeded",
            span_name = name,
            profile_name = self.profile_name,
            duration = ?self.duration,
        )
    }
}

/// Profile execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use workload_scheduler::errors::FlowExecutionError;
/// use workload_scheduler::observability::messages::profile::ProfileFailed;
/// use std::time::Duration;
///
/// let error = FlowExecutionError::Failed { message: "HTTP 503".to_string() };
/// let msg = ProfileFailed {
///     profile_name: "NHM_03",
///     consecutive_failures: 2,
///     error: &error,
///     retry_in: Duration::from_secs(60),
/// };
///
/// assert!(msg.to_string().contains("2 consecutive failure(s)"));
/// ```
pub struct ProfileFailed<'a> {
    pub profile_name: &'a str,
    pub consecutive_failures: u32,
    pub error: &'a FlowExecutionError,
    pub retry_in: Duration,
}

impl Display for ProfileFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' iteration failed ({} consecutive failure(s)), retry in {:?}: {}",
            self.profile_name, self.consecutive_failures, self.retry_in, self.error
        )
    }
}

impl StructuredLog for ProfileFailed<'_> {
    fn log(&self) {
        tracing::error!(
            profile_name = self.profile_name,
            consecutive_failures = self.consecutive_failures,
            retry_in_ms = self.retry_in.as_millis() as u64,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "profile_failed",
            span_name = name,
            profile_name = self.profile_name,
            error = %self.error,
        )
    }
}

/// Profile crossed the failure threshold and now runs on a backed-off cadence.
///
/// # Log Level
/// `warn!` - Degraded operation, operator alerting
pub struct ProfileDegraded<'a> {
    pub profile_name: &'a str,
    pub consecutive_failures: u32,
    pub nominal_interval: Duration,
    pub backoff_interval: Duration,
}

impl Display for ProfileDegraded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' degraded after {} consecutive failures: interval {} backed off to {}",
            self.profile_name,
            self.consecutive_failures,
            format_interval(self.nominal_interval),
            format_interval(self.backoff_interval)
        )
    }
}

impl StructuredLog for ProfileDegraded<'_> {
    fn log(&self) {
        tracing::warn!(
            profile_name = self.profile_name,
            consecutive_failures = self.consecutive_failures,
            nominal_interval_ms = self.nominal_interval.as_millis() as u64,
            backoff_interval_ms = self.backoff_interval.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "profile_degraded",
            span_name = name,
            profile_name = self.profile_name,
            consecutive_failures = self.consecutive_failures,
        )
    }
}

/// Profile was due but its previous execution is still running.
///
/// # Log Level
/// `warn!` - Skipped work
pub struct ProfileOverlapSkipped<'a> {
    pub profile_name: &'a str,
}

impl Display for ProfileOverlapSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' is due but its previous execution is still running, skipping",
            self.profile_name
        )
    }
}

impl StructuredLog for ProfileOverlapSkipped<'_> {
    fn log(&self) {
        tracing::warn!(profile_name = self.profile_name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "profile_overlap_skipped",
            span_name = name,
            profile_name = self.profile_name,
        )
    }
}

/// Profile reached its iteration limit.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProfileCompleted<'a> {
    pub profile_name: &'a str,
    pub iterations: u64,
}

impl Display for ProfileCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' completed after {} iteration(s)",
            self.profile_name, self.iterations
        )
    }
}

impl StructuredLog for ProfileCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            iterations = self.iterations,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_completed",
            span_name = name,
            profile_name = self.profile_name,
        )
    }
}

/// Operator changed a profile's lifecycle state.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workload_scheduler::engine::SlotState;
/// use workload_scheduler::observability::messages::profile::ProfileStateChanged;
///
/// let msg = ProfileStateChanged {
///     profile_name: "SHM_07",
///     from: SlotState::Sleeping,
///     to: SlotState::Stopped,
///     operation: "stop",
/// };
///
/// assert_eq!(msg.to_string(), "Profile 'SHM_07' state SLEEPING -> STOPPED (stop)");
/// ```
pub struct ProfileStateChanged<'a> {
    pub profile_name: &'a str,
    pub from: SlotState,
    pub to: SlotState,
    pub operation: &'a str,
}

impl Display for ProfileStateChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' state {} -> {} ({})",
            self.profile_name, self.from, self.to, self.operation
        )
    }
}

impl StructuredLog for ProfileStateChanged<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            from = %self.from,
            to = %self.to,
            operation = self.operation,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_state_changed",
            span_name = name,
            profile_name = self.profile_name,
            operation = self.operation,
        )
    }
}

/// Operator delayed a profile's next run.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProfilePaused<'a> {
    pub profile_name: &'a str,
    pub resume_in: Duration,
}

impl Display for ProfilePaused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' paused, next run no earlier than {:?} from now",
            self.profile_name, self.resume_in
        )
    }
}

impl StructuredLog for ProfilePaused<'_> {
    fn log(&self) {
        tracing::info!(
            profile_name = self.profile_name,
            resume_in_ms = self.resume_in.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "profile_paused",
            span_name = name,
            profile_name = self.profile_name,
        )
    }
}
