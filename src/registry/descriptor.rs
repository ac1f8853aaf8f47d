// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use super::ProfileSchedule;
use crate::traits::FlowFactory;

/// Static description of one profile: what to run and how often.
///
/// Descriptors are built once, handed to the [`ProfileRegistry`](super::ProfileRegistry)
/// and shared behind an `Arc` from then on, so they never change after
/// registration.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use workload_scheduler::flows::NoopFlow;
/// use workload_scheduler::registry::ProfileDescriptor;
/// use workload_scheduler::traits::{Flow, FlowFactory};
///
/// let descriptor = ProfileDescriptor::new(
///     "PM_38",
///     FlowFactory::new(|| Box::new(NoopFlow::new()) as Box<dyn Flow>),
///     Duration::from_secs(900),
/// )
/// .with_start_delay(Duration::from_secs(30))
/// .with_max_iterations(Some(4));
///
/// assert_eq!(descriptor.name(), "PM_38");
/// assert_eq!(descriptor.schedule_summary(), "Every 0:15:00");
/// ```
#[derive(Debug, Clone)]
pub struct ProfileDescriptor {
    name: String,
    flow_factory: FlowFactory,
    schedule: ProfileSchedule,
    enabled: bool,
    start_delay: Duration,
    max_iterations: Option<u32>,
    execution_timeout: Option<Duration>,
    flow_selector: Option<String>,
}

impl ProfileDescriptor {
    pub fn new(name: impl Into<String>, flow_factory: FlowFactory, schedule_interval: Duration) -> Self {
        Self {
            name: name.into(),
            flow_factory,
            schedule: ProfileSchedule::Every(schedule_interval),
            enabled: true,
            start_delay: Duration::ZERO,
            max_iterations: None,
            execution_timeout: None,
            flow_selector: None,
        }
    }

    /// A descriptor with any cadence, interval or time of day.
    pub fn scheduled(
        name: impl Into<String>,
        flow_factory: FlowFactory,
        schedule: ProfileSchedule,
    ) -> Self {
        Self::new(name, flow_factory, Duration::ZERO).with_schedule(schedule)
    }

    /// Replace the interval given to [`new`](Self::new), e.g. with a time-of-day schedule.
    pub fn with_schedule(mut self, schedule: ProfileSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Disabled profiles are registered but start out stopped.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Offset before the first run, used to stagger profile start-up.
    pub fn with_start_delay(mut self, start_delay: Duration) -> Self {
        self.start_delay = start_delay;
        self
    }

    /// Run the flow this many times, then mark the profile completed.
    pub fn with_max_iterations(mut self, max_iterations: Option<u32>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_execution_timeout(mut self, execution_timeout: Option<Duration>) -> Self {
        self.execution_timeout = execution_timeout;
        self
    }

    pub fn with_flow_selector(mut self, flow_selector: impl Into<String>) -> Self {
        self.flow_selector = Some(flow_selector.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_factory(&self) -> &FlowFactory {
        &self.flow_factory
    }

    pub fn schedule(&self) -> &ProfileSchedule {
        &self.schedule
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    pub fn max_iterations(&self) -> Option<u32> {
        self.max_iterations
    }

    pub fn execution_timeout(&self) -> Option<Duration> {
        self.execution_timeout
    }

    pub fn flow_selector(&self) -> Option<&str> {
        self.flow_selector.as_deref()
    }

    /// Human readable cadence, e.g. `Every 0:05:00`.
    pub fn schedule_summary(&self) -> String {
        self.schedule.summary()
    }
}

/// Formats a duration as `[D day(s), ]H:MM:SS`, falling back to milliseconds
/// for sub-second intervals.
pub fn format_interval(interval: Duration) -> String {
    if interval < Duration::from_secs(1) {
        return format!("{}ms", interval.as_millis());
    }

    let total = interval.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    match days {
        0 => format!("{}:{:02}:{:02}", hours, minutes, seconds),
        1 => format!("1 day, {}:{:02}:{:02}", hours, minutes, seconds),
        _ => format!("{} days, {}:{:02}:{:02}", days, hours, minutes, seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval() {
        let cases = vec![
            (Duration::from_millis(250), "250ms"),
            (Duration::from_secs(5), "0:00:05"),
            (Duration::from_secs(300), "0:05:00"),
            (Duration::from_secs(3_600 * 6 + 61), "6:01:01"),
            (Duration::from_secs(86_400), "1 day, 0:00:00"),
            (Duration::from_secs(86_400 * 7 + 3_600), "7 days, 1:00:00"),
        ];

        for (interval, expected) in cases {
            assert_eq!(format_interval(interval), expected, "interval {:?}", interval);
        }
    }
}
