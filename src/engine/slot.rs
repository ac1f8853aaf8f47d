// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-profile execution state.
//!
//! An [`ExecutionSlot`] is the scheduler's mutable record for one registered
//! profile. All transitions live here as plain methods so the state machine can
//! be tested without a running scheduler:
//!
//! ```text
//! IDLE -> RUNNING -> SLEEPING | FAILED | COMPLETED
//! SLEEPING | FAILED -> RUNNING
//! any -> STOPPED -> IDLE (start / restart)
//! COMPLETED -> IDLE (start / restart)
//! ```
//!
//! SLEEPING and FAILED are only ever reached through a finished execution.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::consts::{FAR_FUTURE_SECONDS, MAX_DUPLICATE_TIMESTAMPS, MAX_ERROR_HISTORY};
use crate::engine::RetryPolicy;
use crate::errors::FlowExecutionError;
use crate::registry::ProfileDescriptor;

/// Lifecycle state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotState {
    Idle,
    Running,
    Sleeping,
    Failed,
    Stopped,
    Completed,
}

impl SlotState {
    /// States from which a profile is dispatched once its due time passes.
    pub fn is_schedulable(self) -> bool {
        matches!(self, SlotState::Idle | SlotState::Sleeping | SlotState::Failed)
    }
}

impl Display for SlotState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SlotState::Idle => "IDLE",
            SlotState::Running => "RUNNING",
            SlotState::Sleeping => "SLEEPING",
            SlotState::Failed => "FAILED",
            SlotState::Stopped => "STOPPED",
            SlotState::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

/// One distinct error seen by a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    /// Text of the most recent occurrence.
    pub message: String,
    pub last_seen: Instant,
    pub occurrences: u32,
    /// Earlier occurrence times, oldest first.
    pub duplicates: Vec<Instant>,
    key: String,
}

/// Bounded history of distinct errors.
///
/// Errors that differ only in their numbers (ports, counters, ids) are folded
/// into one record, so a flapping dependency does not push every other error
/// out of the history.
#[derive(Debug, Clone, Default)]
pub struct ErrorHistory {
    records: VecDeque<ErrorRecord>,
}

impl ErrorHistory {
    pub fn record(&mut self, message: &str, at: Instant) {
        let key = normalize_error(message);

        if let Some(position) = self.records.iter().position(|r| r.key == key) {
            if let Some(mut existing) = self.records.remove(position) {
                existing.duplicates.push(existing.last_seen);
                if existing.duplicates.len() > MAX_DUPLICATE_TIMESTAMPS {
                    let excess = existing.duplicates.len() - MAX_DUPLICATE_TIMESTAMPS;
                    existing.duplicates.drain(..excess);
                }
                existing.message = message.to_string();
                existing.last_seen = at;
                existing.occurrences = existing.occurrences.saturating_add(1);
                self.records.push_back(existing);
            }
            return;
        }

        self.records.push_back(ErrorRecord {
            message: message.to_string(),
            last_seen: at,
            occurrences: 1,
            duplicates: Vec::new(),
            key,
        });
        while self.records.len() > MAX_ERROR_HISTORY {
            self.records.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records from least to most recently seen
    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&ErrorRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Replace every run of ASCII digits with `NUM`.
fn normalize_error(message: &str) -> String {
    let mut normalized = String::with_capacity(message.len());
    let mut in_digits = false;
    for c in message.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                normalized.push_str("NUM");
                in_digits = true;
            }
        } else {
            in_digits = false;
            normalized.push(c);
        }
    }
    normalized
}

/// What a finished execution did to its slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded {
        next_run_in: Duration,
        completed: bool,
    },
    Failed {
        retry_in: Duration,
        /// Wait the schedule alone would have imposed.
        nominal_in: Duration,
        consecutive_failures: u32,
        degraded: bool,
        completed: bool,
    },
    /// The slot was restarted while this execution ran; only `in_flight` was cleared.
    Stale,
}

/// Mutable scheduling record for one profile.
#[derive(Debug)]
pub struct ExecutionSlot {
    pub(crate) descriptor: Arc<ProfileDescriptor>,
    pub(crate) state: SlotState,
    pub(crate) next_run_at: Instant,
    pub(crate) last_error: Option<FlowExecutionError>,
    pub(crate) consecutive_failures: u32,
    pub(crate) in_flight: bool,
    pub(crate) generation: u64,
    pub(crate) paused_until: Option<Instant>,
    pub(crate) last_run_started_at: Option<Instant>,
    pub(crate) last_run_finished_at: Option<Instant>,
    pub(crate) iterations: u64,
    pub(crate) errors: ErrorHistory,
    overlap_reported_for: Option<Instant>,
}

impl ExecutionSlot {
    /// Disabled profiles start STOPPED; enabled ones are due after their start
    /// delay, or at the first scheduled time after it for time-of-day profiles.
    pub fn new(descriptor: Arc<ProfileDescriptor>, now: Instant) -> Self {
        let state = if descriptor.enabled() {
            SlotState::Idle
        } else {
            SlotState::Stopped
        };
        let first_delay = descriptor.schedule().aligned_delay(descriptor.start_delay());
        let next_run_at = deadline(now, first_delay);
        Self {
            descriptor,
            state,
            next_run_at,
            last_error: None,
            consecutive_failures: 0,
            in_flight: false,
            generation: 0,
            paused_until: None,
            last_run_started_at: None,
            last_run_finished_at: None,
            iterations: 0,
            errors: ErrorHistory::default(),
            overlap_reported_for: None,
        }
    }

    pub fn descriptor(&self) -> &Arc<ProfileDescriptor> {
        &self.descriptor
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn next_run_at(&self) -> Instant {
        self.next_run_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&FlowExecutionError> {
        self.last_error.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.state.is_schedulable() && !self.in_flight && now >= self.next_run_at
    }

    /// True the first time a due slot is found still executing for this due time.
    ///
    /// `elsewhere` is set when an execution of the same profile name is running
    /// outside this slot, e.g. from a registration that has since been replaced.
    pub fn take_overlap(&mut self, now: Instant, elsewhere: bool) -> bool {
        let overlapping = self.state.is_schedulable()
            && (self.in_flight || elsewhere)
            && now >= self.next_run_at;
        if overlapping && self.overlap_reported_for != Some(self.next_run_at) {
            self.overlap_reported_for = Some(self.next_run_at);
            return true;
        }
        false
    }

    /// Mark the slot running and return the generation the execution belongs to.
    pub fn begin_run(&mut self, now: Instant) -> u64 {
        self.state = SlotState::Running;
        self.in_flight = true;
        self.last_run_started_at = Some(now);
        self.overlap_reported_for = None;
        self.generation
    }

    /// Apply the result of an execution started by [`begin_run`](Self::begin_run).
    pub fn complete_run(
        &mut self,
        generation: u64,
        result: &Result<(), FlowExecutionError>,
        now: Instant,
        policy: &RetryPolicy,
    ) -> RunOutcome {
        self.in_flight = false;
        self.last_run_finished_at = Some(now);

        if generation != self.generation {
            return RunOutcome::Stale;
        }

        self.iterations += 1;
        let completed = self
            .descriptor
            .max_iterations()
            .is_some_and(|max| self.iterations >= u64::from(max));
        let nominal = self.descriptor.schedule().next_delay();

        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.schedule_after(now, nominal);
                self.finish_state(SlotState::Sleeping, completed);
                RunOutcome::Succeeded {
                    next_run_in: self.next_run_at.saturating_duration_since(now),
                    completed,
                }
            }
            Err(error) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.errors.record(&error.to_string(), now);
                self.last_error = Some(error.clone());
                let mut delay = policy.delay_for(self.consecutive_failures, nominal);
                if delay > nominal {
                    delay = self.descriptor.schedule().aligned_delay(delay);
                }
                self.schedule_after(now, delay);
                self.finish_state(SlotState::Failed, completed);
                RunOutcome::Failed {
                    retry_in: self.next_run_at.saturating_duration_since(now),
                    nominal_in: nominal,
                    consecutive_failures: self.consecutive_failures,
                    degraded: policy.is_degraded(self.consecutive_failures),
                    completed,
                }
            }
        }
    }

    fn schedule_after(&mut self, now: Instant, delay: Duration) {
        let next = deadline(now, delay);
        self.next_run_at = match self.paused_until {
            Some(until) => next.max(until),
            None => next,
        };
    }

    // A stop issued mid-run wins over the execution's own outcome.
    fn finish_state(&mut self, after_run: SlotState, completed: bool) {
        if self.state != SlotState::Running {
            return;
        }
        self.state = if completed {
            SlotState::Completed
        } else {
            after_run
        };
    }

    /// Make the profile eligible and due now. Returns the previous state.
    pub fn start(&mut self, now: Instant) -> SlotState {
        let previous = self.state;
        match previous {
            SlotState::Stopped | SlotState::Completed | SlotState::Idle => {
                if previous == SlotState::Completed {
                    self.iterations = 0;
                }
                self.state = SlotState::Idle;
                self.schedule_after(now, Duration::ZERO);
            }
            SlotState::Running | SlotState::Sleeping | SlotState::Failed => {}
        }
        previous
    }

    /// Stop dispatching. An in-flight execution is left to finish.
    pub fn stop(&mut self) -> SlotState {
        let previous = self.state;
        self.state = SlotState::Stopped;
        previous
    }

    /// Reset counters and make the profile due now.
    ///
    /// Bumping the generation orphans any execution still in flight: its result
    /// clears `in_flight` but no longer touches counters or state.
    pub fn restart(&mut self, now: Instant) -> SlotState {
        let previous = self.state;
        self.generation += 1;
        self.consecutive_failures = 0;
        self.iterations = 0;
        self.last_error = None;
        self.paused_until = None;
        self.overlap_reported_for = None;
        self.state = SlotState::Idle;
        self.next_run_at = now;
        previous
    }

    /// Delay the next run until at least `until` without changing state.
    pub fn pause_until(&mut self, until: Instant) {
        self.paused_until = Some(until);
        self.next_run_at = self.next_run_at.max(until);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
        self.last_error = None;
    }

    pub fn snapshot(&self, now: Instant) -> SlotSnapshot {
        let ago = |at: Instant| duration_ms(now.saturating_duration_since(at));
        let next_run_in_ms = if self.state.is_schedulable() {
            Some(duration_ms(self.next_run_at.saturating_duration_since(now)))
        } else {
            None
        };

        SlotSnapshot {
            name: self.descriptor.name().to_string(),
            flow: self.descriptor.flow_selector().map(str::to_string),
            schedule: self.descriptor.schedule_summary(),
            state: self.state,
            enabled: self.descriptor.enabled(),
            in_flight: self.in_flight,
            next_run_in_ms,
            consecutive_failures: self.consecutive_failures,
            iterations: self.iterations,
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
            last_run_started_ms_ago: self.last_run_started_at.map(ago),
            last_run_finished_ms_ago: self.last_run_finished_at.map(ago),
            errors: self
                .errors
                .iter()
                .map(|record| ErrorSummary {
                    message: record.message.clone(),
                    occurrences: record.occurrences,
                    last_seen_ms_ago: ago(record.last_seen),
                    duplicates_ms_ago: record.duplicates.iter().map(|at| ago(*at)).collect(),
                })
                .collect(),
        }
    }
}

/// `now + delay`, saturating at a far-future instant instead of overflowing.
pub(crate) fn deadline(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay)
        .or_else(|| now.checked_add(Duration::from_secs(FAR_FUTURE_SECONDS)))
        .unwrap_or(now)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Point-in-time status of one profile.
///
/// Times are relative to when the snapshot was taken, so a snapshot can be
/// serialized and stored without depending on the process clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub name: String,
    pub flow: Option<String>,
    pub schedule: String,
    pub state: SlotState,
    pub enabled: bool,
    pub in_flight: bool,
    /// `None` unless the profile is waiting to be dispatched; zero when overdue.
    pub next_run_in_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub iterations: u64,
    pub last_error: Option<String>,
    pub last_run_started_ms_ago: Option<u64>,
    pub last_run_finished_ms_ago: Option<u64>,
    pub errors: Vec<ErrorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub message: String,
    pub occurrences: u32,
    pub last_seen_ms_ago: u64,
    pub duplicates_ms_ago: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::NoopFlow;
    use crate::registry::{ProfileSchedule, TimeOfDay};
    use crate::traits::{Flow, FlowFactory};

    fn descriptor(interval_secs: u64) -> ProfileDescriptor {
        ProfileDescriptor::new(
            "PM_38",
            FlowFactory::new(|| Box::new(NoopFlow::new()) as Box<dyn Flow>),
            Duration::from_secs(interval_secs),
        )
    }

    fn slot(descriptor: ProfileDescriptor, now: Instant) -> ExecutionSlot {
        ExecutionSlot::new(Arc::new(descriptor), now)
    }

    fn failure(message: &str) -> Result<(), FlowExecutionError> {
        Err(FlowExecutionError::Failed {
            message: message.to_string(),
        })
    }

    #[test]
    fn test_normalize_error_folds_digit_runs() {
        assert_eq!(
            normalize_error("port 8443 refused after 3 attempts"),
            "port NUM refused after NUM attempts"
        );
        assert_eq!(normalize_error("no digits"), "no digits");
    }

    #[test]
    fn test_error_history_folds_duplicates() {
        let t0 = Instant::now();
        let mut history = ErrorHistory::default();
        history.record("attempt 1 refused", t0);
        history.record("timeout", t0 + Duration::from_secs(1));
        history.record("attempt 2 refused", t0 + Duration::from_secs(2));

        assert_eq!(history.len(), 2);
        let latest = history.latest().unwrap();
        assert_eq!(latest.message, "attempt 2 refused");
        assert_eq!(latest.occurrences, 2);
        assert_eq!(latest.duplicates, vec![t0]);
        assert_eq!(history.iter().next().unwrap().message, "timeout");
    }

    #[test]
    fn test_error_history_is_bounded() {
        let t0 = Instant::now();
        let mut history = ErrorHistory::default();
        for label in ["a", "b", "c", "d", "e", "f", "g"] {
            history.record(&format!("error {}", label), t0);
        }
        assert_eq!(history.len(), MAX_ERROR_HISTORY);
        assert_eq!(history.iter().next().unwrap().message, "error c");

        for n in 0..10 {
            history.record(&format!("error g {}", n), t0 + Duration::from_secs(n));
        }
        let folded = history.latest().unwrap();
        assert_eq!(folded.occurrences, 10);
        assert_eq!(folded.duplicates.len(), MAX_DUPLICATE_TIMESTAMPS);
    }

    #[test]
    fn test_new_slot_honours_enabled_and_start_delay() {
        let now = Instant::now();
        let delayed = slot(descriptor(60).with_start_delay(Duration::from_secs(30)), now);
        assert_eq!(delayed.state(), SlotState::Idle);
        assert!(!delayed.is_due(now));
        assert!(delayed.is_due(now + Duration::from_secs(30)));

        let disabled = slot(descriptor(60).with_enabled(false), now);
        assert_eq!(disabled.state(), SlotState::Stopped);
        assert!(!disabled.is_due(now + Duration::from_secs(3_600)));
    }

    #[test]
    fn test_success_reschedules_from_completion() {
        let now = Instant::now();
        let mut slot = slot(descriptor(5), now);
        let generation = slot.begin_run(now);
        assert!(!slot.is_due(now));

        let finished = now + Duration::from_secs(2);
        let outcome = slot.complete_run(generation, &Ok(()), finished, &RetryPolicy::default());

        assert_eq!(
            outcome,
            RunOutcome::Succeeded {
                next_run_in: Duration::from_secs(5),
                completed: false
            }
        );
        assert_eq!(slot.state(), SlotState::Sleeping);
        assert_eq!(slot.next_run_at(), finished + Duration::from_secs(5));
    }

    #[test]
    fn test_failures_back_off_then_success_resets() {
        let now = Instant::now();
        let policy = RetryPolicy::new(2, 2.0, Duration::from_secs(3_600));
        let mut slot = slot(descriptor(10), now);

        let generation = slot.begin_run(now);
        slot.complete_run(generation, &failure("down"), now, &policy);
        assert_eq!(slot.state(), SlotState::Failed);
        assert_eq!(slot.next_run_at(), now + Duration::from_secs(10));

        let generation = slot.begin_run(now);
        let outcome = slot.complete_run(generation, &failure("down"), now, &policy);
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                retry_in: Duration::from_secs(20),
                nominal_in: Duration::from_secs(10),
                consecutive_failures: 2,
                degraded: true,
                completed: false,
            }
        );
        assert!(slot.last_error().is_some());

        let generation = slot.begin_run(now);
        slot.complete_run(generation, &Ok(()), now, &policy);
        assert_eq!(slot.consecutive_failures(), 0);
        assert_eq!(slot.next_run_at(), now + Duration::from_secs(10));
    }

    #[test]
    fn test_max_iterations_completes() {
        let now = Instant::now();
        let mut slot = slot(descriptor(1).with_max_iterations(Some(2)), now);
        let policy = RetryPolicy::default();

        let generation = slot.begin_run(now);
        slot.complete_run(generation, &Ok(()), now, &policy);
        let generation = slot.begin_run(now);
        let outcome = slot.complete_run(generation, &failure("last one"), now, &policy);

        assert!(matches!(outcome, RunOutcome::Failed { completed: true, .. }));
        assert_eq!(slot.state(), SlotState::Completed);
        assert!(!slot.is_due(now + Duration::from_secs(60)));

        assert_eq!(slot.start(now), SlotState::Completed);
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.iterations, 0);
    }

    #[test]
    fn test_stop_during_run_stays_stopped() {
        let now = Instant::now();
        let mut slot = slot(descriptor(5), now);
        let generation = slot.begin_run(now);

        assert_eq!(slot.stop(), SlotState::Running);
        slot.complete_run(generation, &Ok(()), now, &RetryPolicy::default());

        assert_eq!(slot.state(), SlotState::Stopped);
        assert!(!slot.is_in_flight());
        assert!(!slot.is_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn test_restart_orphans_in_flight_run() {
        let now = Instant::now();
        let mut slot = slot(descriptor(5), now);
        let generation = slot.begin_run(now);
        slot.consecutive_failures = 4;

        slot.restart(now);
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.consecutive_failures(), 0);
        assert!(!slot.is_due(now), "previous execution is still in flight");
        assert!(slot.take_overlap(now, false));
        assert!(!slot.take_overlap(now, false), "overlap is reported once per due time");

        let outcome = slot.complete_run(generation, &failure("late"), now, &RetryPolicy::default());
        assert_eq!(outcome, RunOutcome::Stale);
        assert_eq!(slot.consecutive_failures(), 0);
        assert_eq!(slot.state(), SlotState::Idle);
        assert!(slot.is_due(now));
    }

    #[test]
    fn test_huge_intervals_saturate_instead_of_overflowing() {
        let now = Instant::now();
        let huge = Duration::from_secs(u64::MAX);
        let mut slot = slot(descriptor(u64::MAX).with_start_delay(huge), now);
        assert!(!slot.is_due(now + Duration::from_secs(FAR_FUTURE_SECONDS / 2)));

        slot.restart(now);
        let generation = slot.begin_run(now);
        let outcome = slot.complete_run(generation, &Ok(()), now, &RetryPolicy::default());
        assert!(matches!(outcome, RunOutcome::Succeeded { .. }));
        assert!(slot.next_run_at() > now + Duration::from_secs(FAR_FUTURE_SECONDS / 2));

        let policy = RetryPolicy::new(1, 2.0, huge);
        let generation = slot.begin_run(now);
        let outcome = slot.complete_run(generation, &failure("down"), now, &policy);
        assert!(matches!(outcome, RunOutcome::Failed { degraded: true, .. }));
        assert_eq!(slot.state(), SlotState::Failed);
    }

    #[test]
    fn test_overlap_with_run_outside_the_slot() {
        let now = Instant::now();
        let mut slot = slot(descriptor(5), now);
        assert!(slot.is_due(now));
        assert!(!slot.take_overlap(now, false));
        assert!(slot.take_overlap(now, true));
        assert!(!slot.take_overlap(now, true));
    }

    #[test]
    fn test_time_of_day_profile_waits_for_its_slot() {
        let now = Instant::now();
        let times = TimeOfDay::parse(&["00:00", "12:00"], &[]).unwrap();
        let descriptor = descriptor(5).with_schedule(ProfileSchedule::At(times));
        let mut slot = slot(descriptor, now);

        let first = slot.next_run_at().saturating_duration_since(now);
        assert!(first > Duration::ZERO);
        assert!(first <= Duration::from_secs(13 * 3_600));

        slot.start(now);
        let generation = slot.begin_run(now);
        let outcome = slot.complete_run(generation, &failure("NE busy"), now, &RetryPolicy::default());
        let RunOutcome::Failed {
            retry_in,
            nominal_in,
            ..
        } = outcome
        else {
            panic!("expected a failure outcome, got {:?}", outcome);
        };
        assert_eq!(retry_in, nominal_in, "below the threshold the next slot is kept");
        assert!(retry_in <= Duration::from_secs(13 * 3_600));
    }

    #[test]
    fn test_pause_delays_next_run() {
        let now = Instant::now();
        let mut slot = slot(descriptor(5), now);
        let resume = now + Duration::from_secs(30);

        slot.pause_until(resume);
        assert_eq!(slot.state(), SlotState::Idle);
        assert!(!slot.is_due(now + Duration::from_secs(29)));
        assert!(slot.is_due(resume));

        let generation = slot.begin_run(resume);
        slot.complete_run(generation, &Ok(()), resume, &RetryPolicy::default());
        assert_eq!(slot.next_run_at(), resume + Duration::from_secs(5));
    }

    #[test]
    fn test_snapshot_reports_relative_times() {
        let now = Instant::now();
        let mut slot = slot(descriptor(300), now);
        let generation = slot.begin_run(now);
        slot.complete_run(generation, &failure("HTTP 503"), now, &RetryPolicy::default());
        slot.clear_errors();

        let snapshot = slot.snapshot(now + Duration::from_secs(60));
        assert_eq!(snapshot.name, "PM_38");
        assert_eq!(snapshot.schedule, "Every 0:05:00");
        assert_eq!(snapshot.state, SlotState::Failed);
        assert_eq!(snapshot.next_run_in_ms, Some(240_000));
        assert_eq!(snapshot.last_run_finished_ms_ago, Some(60_000));
        assert_eq!(snapshot.last_error, None);
        assert!(snapshot.errors.is_empty());
        assert_eq!(snapshot.consecutive_failures, 1);
    }
}
