// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

use crate::errors::{FlowFactoryError, RegistryError, ScheduleError};

/// Errors that can occur during catalog validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two catalog entries share the same profile name
    DuplicateProfileName {
        /// The duplicated name
        name: String,
    },
    /// A catalog entry has an empty name
    EmptyProfileName {
        /// Position of the entry in the catalog
        index: usize,
    },
    /// A profile has a zero schedule interval
    ZeroInterval {
        /// The profile with the invalid interval
        name: String,
    },
    /// A profile sets both or neither of `interval_seconds` and `scheduled_times`
    ScheduleConflict {
        /// The profile with the ambiguous schedule
        name: String,
    },
    /// A profile has `max_iterations: 0`, so it could never run
    ZeroIterations {
        /// The profile with the invalid iteration count
        name: String,
    },
    /// A scheduler or retry option is out of range
    InvalidOption {
        /// Dotted path of the offending option, e.g. `retry.backoff_multiplier`
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateProfileName { name } => {
                write!(f, "Duplicate profile name: '{}'", name)
            }
            ValidationError::EmptyProfileName { index } => {
                write!(f, "Profile at position {} has an empty name", index)
            }
            ValidationError::ZeroInterval { name } => {
                write!(f, "Profile '{}' has a zero schedule interval", name)
            }
            ValidationError::ScheduleConflict { name } => {
                write!(
                    f,
                    "Profile '{}' must set exactly one of interval_seconds or scheduled_times",
                    name
                )
            }
            ValidationError::ZeroIterations { name } => {
                write!(
                    f,
                    "Profile '{}' has max_iterations set to 0 and would never run",
                    name
                )
            }
            ValidationError::InvalidOption { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors produced while loading a catalog and turning it into a runtime.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported catalog format '{0}', expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    #[error("Catalog validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    FlowFactory(#[from] FlowFactoryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid schedule for profile '{profile_name}': {source}")]
    Schedule {
        profile_name: String,
        source: ScheduleError,
    },
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let cases = vec![
            (
                ValidationError::DuplicateProfileName {
                    name: "PM_38".to_string(),
                },
                "Duplicate profile name: 'PM_38'",
            ),
            (
                ValidationError::ZeroInterval {
                    name: "FM_01".to_string(),
                },
                "Profile 'FM_01' has a zero schedule interval",
            ),
            (
                ValidationError::InvalidOption {
                    field: "scheduler.tick_ms".to_string(),
                    reason: "must be greater than 0".to_string(),
                },
                "Invalid value for 'scheduler.tick_ms': must be greater than 0",
            ),
            (
                ValidationError::ScheduleConflict {
                    name: "SHM_07".to_string(),
                },
                "Profile 'SHM_07' must set exactly one of interval_seconds or scheduled_times",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_config_error_lists_every_validation_error() {
        let error = ConfigError::Validation(vec![
            ValidationError::EmptyProfileName { index: 2 },
            ValidationError::ZeroIterations {
                name: "SHM_07".to_string(),
            },
        ]);
        let message = error.to_string();
        assert!(message.starts_with("Catalog validation failed:"));
        assert!(message.contains("Profile at position 2 has an empty name"));
        assert!(message.contains("Profile 'SHM_07' has max_iterations set to 0"));
    }
}
