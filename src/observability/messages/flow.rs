// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types emitted by built-in flows.

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::observability::messages::StructuredLog;

/// External command run by the `shell` flow exited.
///
/// # Log Level
/// `debug!` - Per-iteration detail; failures are reported by the scheduler
///
/// # Example
/// ```
/// use workload_scheduler::observability::messages::flow::ShellCommandFinished;
/// use std::time::Duration;
///
/// let msg = ShellCommandFinished {
///     command: "netconf-check",
///     exit_code: Some(0),
///     duration: Duration::from_millis(120),
/// };
///
/// assert_eq!(msg.to_string(), "Command 'netconf-check' exited with code 0 after 120ms");
/// ```
pub struct ShellCommandFinished<'a> {
    pub command: &'a str,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl Display for ShellCommandFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(
                f,
                "Command '{}' exited with code {} after {:?}",
                self.command, code, self.duration
            ),
            None => write!(
                f,
                "Command '{}' terminated by signal after {:?}",
                self.command, self.duration
            ),
        }
    }
}

impl StructuredLog for ShellCommandFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            exit_code = self.exit_code,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("shell_command", span_name = name, command = self.command)
    }
}
