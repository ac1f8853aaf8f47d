// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for a human-readable line and
//! [`StructuredLog`] to emit the same event with typed `tracing` fields at the
//! level the message belongs to.
//!
//! # Organization
//!
//! * `config` - catalog loading and validation
//! * `flow` - built-in flow diagnostics
//! * `profile` - per-profile registration, execution and lifecycle events
//! * `scheduler` - scheduler loop lifecycle and dispatch passes
//!
//! # Usage Pattern
//!
//! ```rust
//! use workload_scheduler::observability::messages::StructuredLog;
//! use workload_scheduler::observability::messages::scheduler::SchedulerStarted;
//! use std::time::Duration;
//!
//! SchedulerStarted {
//!     profile_count: 12,
//!     max_concurrency: 4,
//!     tick: Duration::from_secs(1),
//! }
//! .log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod config;
pub mod flow;
pub mod profile;
pub mod scheduler;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
