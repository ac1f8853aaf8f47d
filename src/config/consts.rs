// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default scheduler tick (1 second)
pub const DEFAULT_TICK_MS: u64 = 1_000;
/// Concurrency cap used when the host parallelism cannot be determined
pub const FALLBACK_MAX_CONCURRENCY: usize = 4;
/// Consecutive failures before backoff starts
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
/// Growth factor applied per failure past the threshold
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
/// Longest backed-off interval (1 hour) unless the profile's own interval is longer
pub const DEFAULT_MAX_BACKOFF_SECONDS: u64 = 3_600;
/// How long shutdown waits for in-flight executions
pub const DEFAULT_SHUTDOWN_GRACE_SECONDS: u64 = 30;
/// Buffered events per subscriber before the slowest one starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 1_024;
/// Distinct errors kept per profile
pub const MAX_ERROR_HISTORY: usize = 5;
/// Earlier timestamps kept for a folded duplicate error
pub const MAX_DUPLICATE_TIMESTAMPS: usize = 5;
/// Deadline used when a delay would overflow the clock (about 30 years)
pub const FAR_FUTURE_SECONDS: u64 = 86_400 * 365 * 30;
/// Longest accepted interval, start delay, timeout or backoff cap (one year)
pub const MAX_SCHEDULE_SECONDS: u64 = 86_400 * 366;
/// Longest accepted scheduler tick (1 hour)
pub const MAX_TICK_MS: u64 = 3_600_000;
