// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A time-of-day schedule that cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("At least one scheduled time is required")]
    NoTimes,

    #[error("Invalid scheduled time '{0}', expected HH:MM or HH:MM:SS")]
    InvalidTime(String),

    #[error("Invalid scheduled day '{0}', expected a weekday name such as MONDAY")]
    InvalidDay(String),

    #[error("Invalid schedule expression '{expression}': {reason}")]
    Expression { expression: String, reason: String },
}
