// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for profile registration and control-surface lookups.

use thiserror::Error;

/// Misuse of the registry or the control surface.
///
/// These are reported synchronously to the caller and never affect
/// profiles that are already scheduled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A profile with this name is already registered.
    #[error("Profile '{0}' is already registered")]
    DuplicateName(String),

    /// No profile with this name is registered.
    #[error("Profile '{0}' is not registered")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_messages() {
        assert_eq!(
            RegistryError::DuplicateName("PM_38".to_string()).to_string(),
            "Profile 'PM_38' is already registered"
        );
        assert_eq!(
            RegistryError::NotFound("FM_01".to_string()).to_string(),
            "Profile 'FM_01' is not registered"
        );
    }
}
