// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing flows and running the scheduler loop.

use std::time::Duration;
use thiserror::Error;

use crate::errors::RegistryError;

/// Failure of a single flow execution.
///
/// Always caught at the boundary of the dispatched task and recorded in the
/// profile's slot. Never propagates to the scheduler loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowExecutionError {
    /// The flow returned an error.
    #[error("Flow failed: {message}")]
    Failed { message: String },

    /// The flow panicked while executing.
    #[error("Flow panicked: {message}")]
    Panicked { message: String },

    /// The flow did not finish within the profile's execution timeout.
    #[error("Flow timed out after {0:?}")]
    TimedOut(Duration),
}

impl FlowExecutionError {
    /// Convert a flow's `anyhow` error, keeping the whole context chain.
    pub fn from_flow_error(error: &anyhow::Error) -> Self {
        FlowExecutionError::Failed {
            message: format!("{:#}", error),
        }
    }

    /// Convert a panicked task's join error into a failure record.
    pub fn from_join_error(error: tokio::task::JoinError) -> Self {
        if error.is_panic() {
            let payload = error.into_panic();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            };
            FlowExecutionError::Panicked { message }
        } else {
            FlowExecutionError::Failed {
                message: "flow task was cancelled".to_string(),
            }
        }
    }
}

/// Errors surfaced by the scheduler itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Control-surface misuse (duplicate or unknown profile name).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// `spawn()` was called on a scheduler whose loop already ran.
    #[error("Scheduler loop is already running")]
    AlreadyStarted,

    /// Internal state is no longer trustworthy; the process should exit
    /// after the orderly shutdown that accompanies this error.
    #[error("Scheduler fatal error: {reason}")]
    Fatal { reason: String },

    /// In-flight executions did not finish within the shutdown grace period.
    #[error("{in_flight} execution(s) still running after shutdown grace period of {grace:?}")]
    ShutdownTimedOut { in_flight: usize, grace: Duration },
}
