// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide catalog of named profiles.
//!
//! The registry maps a unique profile name to its [`ProfileDescriptor`]. It is an
//! explicit object created at start-up and handed to the scheduler, never ambient
//! global state.
//!
//! # Concurrency
//!
//! The map lives behind an `Arc` that writers replace wholesale. Readers clone the
//! `Arc` under a short read lock and then work on an immutable
//! [`RegistrySnapshot`], so the scheduler loop can iterate the catalog without
//! blocking registrations. Every successful write bumps [`ProfileRegistry::version`],
//! which the loop uses to notice that its slot table needs reconciling.
//!
//! # Examples
//! ```
//! use std::time::Duration;
//! use workload_scheduler::flows::NoopFlow;
//! use workload_scheduler::registry::ProfileRegistry;
//! use workload_scheduler::traits::{Flow, FlowFactory};
//!
//! let registry = ProfileRegistry::new();
//! let factory = FlowFactory::new(|| Box::new(NoopFlow::new()) as Box<dyn Flow>);
//!
//! registry.register("PM_38", factory.clone(), Duration::from_secs(60)).unwrap();
//! assert!(registry.register("PM_38", factory, Duration::from_secs(60)).is_err());
//!
//! let names: Vec<String> = registry.list().iter().map(|d| d.name().to_string()).collect();
//! assert_eq!(names, vec!["PM_38"]);
//! ```

mod descriptor;
mod schedule;

pub use descriptor::{format_interval, ProfileDescriptor};
pub use schedule::{ProfileSchedule, TimeOfDay};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::errors::RegistryError;
use crate::observability::messages::profile::{ProfileRegistered, ProfileUnregistered};
use crate::observability::messages::StructuredLog;
use crate::traits::FlowFactory;

type ProfileMap = BTreeMap<String, Arc<ProfileDescriptor>>;

/// Immutable, name-ordered view of the registry at one point in time.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    profiles: Arc<ProfileMap>,
    version: u64,
}

impl RegistrySnapshot {
    pub fn get(&self, name: &str) -> Option<&Arc<ProfileDescriptor>> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Descriptors in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProfileDescriptor>> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Registry of profile descriptors keyed by unique name.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: RwLock<Arc<ProfileMap>>,
    version: AtomicU64,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile with default metadata.
    ///
    /// Fails with [`RegistryError::DuplicateName`] if the name is taken; the
    /// existing registration is left untouched.
    pub fn register(
        &self,
        name: &str,
        flow_factory: FlowFactory,
        interval: Duration,
    ) -> Result<Arc<ProfileDescriptor>, RegistryError> {
        self.register_descriptor(ProfileDescriptor::new(name, flow_factory, interval))
    }

    /// Register a fully specified descriptor.
    pub fn register_descriptor(
        &self,
        descriptor: ProfileDescriptor,
    ) -> Result<Arc<ProfileDescriptor>, RegistryError> {
        let descriptor = Arc::new(descriptor);
        {
            // Writers only ever swap the Arc, so a poisoned lock still guards a consistent map.
            let mut guard = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
            if guard.contains_key(descriptor.name()) {
                return Err(RegistryError::DuplicateName(descriptor.name().to_string()));
            }
            let mut updated = ProfileMap::clone(&guard);
            updated.insert(descriptor.name().to_string(), descriptor.clone());
            *guard = Arc::new(updated);
            self.version.fetch_add(1, Ordering::SeqCst);
        }

        ProfileRegistered {
            profile_name: descriptor.name(),
            schedule: &descriptor.schedule_summary(),
            enabled: descriptor.enabled(),
        }
        .log();

        Ok(descriptor)
    }

    /// Remove a profile, returning its descriptor.
    pub fn unregister(&self, name: &str) -> Result<Arc<ProfileDescriptor>, RegistryError> {
        let removed = {
            let mut guard = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
            if !guard.contains_key(name) {
                return Err(RegistryError::NotFound(name.to_string()));
            }
            let mut updated = ProfileMap::clone(&guard);
            let removed = updated.remove(name);
            *guard = Arc::new(updated);
            self.version.fetch_add(1, Ordering::SeqCst);
            removed
        };

        ProfileUnregistered { profile_name: name }.log();

        removed.ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<ProfileDescriptor>> {
        self.snapshot().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().contains(name)
    }

    /// Copy of all descriptors ordered by name
    pub fn list(&self) -> Vec<Arc<ProfileDescriptor>> {
        self.snapshot().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Take a consistent, immutable view of the registry.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let guard = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        RegistrySnapshot {
            profiles: Arc::clone(&guard),
            version: self.version.load(Ordering::SeqCst),
        }
    }
}
