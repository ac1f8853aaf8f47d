// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_FAILURE_THRESHOLD, DEFAULT_MAX_BACKOFF_SECONDS,
};

/// Exponents beyond this saturate at the cap for any sane multiplier.
const MAX_EXPONENT: u32 = 64;

/// Backoff and alerting policy applied after failed executions.
///
/// Below `failure_threshold` consecutive failures a profile keeps its nominal
/// cadence. From the threshold on it is *degraded*: each further failure
/// multiplies the delay by `backoff_multiplier`, up to the larger of
/// `max_backoff` and the profile's own interval.
///
/// ```
/// use std::time::Duration;
/// use workload_scheduler::engine::RetryPolicy;
///
/// let policy = RetryPolicy::new(2, 2.0, Duration::from_secs(40));
/// let interval = Duration::from_secs(5);
///
/// let delays: Vec<u64> = (1..=5).map(|n| policy.delay_for(n, interval).as_secs()).collect();
/// assert_eq!(delays, vec![5, 10, 20, 40, 40]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub failure_threshold: u32,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff: Duration::from_secs(DEFAULT_MAX_BACKOFF_SECONDS),
        }
    }
}

impl RetryPolicy {
    pub fn new(failure_threshold: u32, backoff_multiplier: f64, max_backoff: Duration) -> Self {
        Self {
            failure_threshold,
            backoff_multiplier,
            max_backoff,
        }
    }

    fn threshold(&self) -> u32 {
        self.failure_threshold.max(1)
    }

    /// Whether a failure streak of this length should raise an alert.
    pub fn is_degraded(&self, consecutive_failures: u32) -> bool {
        consecutive_failures >= self.threshold()
    }

    /// Delay before the next attempt after `consecutive_failures` failures in a row.
    pub fn delay_for(&self, consecutive_failures: u32, interval: Duration) -> Duration {
        if !self.is_degraded(consecutive_failures) {
            return interval;
        }

        let cap = self.max_backoff.max(interval);
        let exponent = (consecutive_failures - self.threshold() + 1).min(MAX_EXPONENT);
        let scaled = interval.as_secs_f64() * self.backoff_multiplier.powi(exponent as i32);

        if !scaled.is_finite() || scaled >= cap.as_secs_f64() {
            return cap;
        }
        Duration::try_from_secs_f64(scaled)
            .map(|delay| delay.clamp(interval, cap))
            .unwrap_or(cap)
    }
}
