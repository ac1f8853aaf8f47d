// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for catalog loading and validation.

use std::fmt::{Display, Formatter};
use tracing::Span;

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;

/// Catalog file parsed and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workload_scheduler::observability::messages::config::CatalogLoaded;
///
/// let msg = CatalogLoaded {
///     path: "configs/workload.yaml",
///     profile_count: 8,
///     enabled_count: 6,
/// };
///
/// assert_eq!(msg.to_string(), "Loaded catalog 'configs/workload.yaml': 8 profiles (6 enabled)");
/// ```
pub struct CatalogLoaded<'a> {
    pub path: &'a str,
    pub profile_count: usize,
    pub enabled_count: usize,
}

impl Display for CatalogLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded catalog '{}': {} profiles ({} enabled)",
            self.path, self.profile_count, self.enabled_count
        )
    }
}

impl StructuredLog for CatalogLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            profile_count = self.profile_count,
            enabled_count = self.enabled_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("catalog", span_name = name, path = self.path)
    }
}

/// Catalog rejected by validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CatalogValidationFailed<'a> {
    pub errors: &'a [ValidationError],
}

impl Display for CatalogValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Catalog validation failed with {} error(s)", self.errors.len())?;
        for error in self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl StructuredLog for CatalogValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error_count = self.errors.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "catalog_validation",
            span_name = name,
            error_count = self.errors.len(),
        )
    }
}
