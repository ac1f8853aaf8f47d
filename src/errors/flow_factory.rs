// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for resolving catalog flow selectors into flow factories.

use std::error::Error;
use std::fmt;

/// Errors that can occur while building a flow factory from a catalog entry
#[derive(Debug, Clone, PartialEq)]
pub enum FlowFactoryError {
    /// The catalog names a flow that no factory knows about
    UnknownFlow { profile_name: String, flow: String },

    /// The flow exists but its options are missing or malformed
    InvalidOptions {
        profile_name: String,
        flow: String,
        reason: String,
    },
}

impl fmt::Display for FlowFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowFactoryError::UnknownFlow { profile_name, flow } => {
                write!(
                    f,
                    "Profile '{}' uses unknown flow '{}'",
                    profile_name, flow
                )
            }
            FlowFactoryError::InvalidOptions {
                profile_name,
                flow,
                reason,
            } => {
                write!(
                    f,
                    "Invalid options for '{}' flow in profile '{}': {}",
                    flow, profile_name, reason
                )
            }
        }
    }
}

impl Error for FlowFactoryError {}
