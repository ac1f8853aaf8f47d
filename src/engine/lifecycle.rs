// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operator control of individual profiles.
//!
//! Every operation is idempotent and fails with
//! [`RegistryError::NotFound`](crate::errors::RegistryError::NotFound) for an
//! unknown name. None of them wait for an in-flight execution: `stop` lets it
//! finish, `restart` orphans it.

use tokio::time::Instant;

use crate::engine::scheduler::{Scheduler, Shared, SlotHandle};
use crate::engine::slot::{ExecutionSlot, SlotSnapshot, SlotState};
use crate::errors::{RegistryError, SchedulerError};
use crate::observability::messages::profile::{ProfilePaused, ProfileStateChanged};
use crate::observability::messages::StructuredLog;

impl Scheduler {
    fn find_slot(&self, name: &str) -> Result<SlotHandle, SchedulerError> {
        self.shared.reconcile()?;
        self.shared
            .slot_handle(name)?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()).into())
    }

    fn with_slot<T>(
        &self,
        name: &str,
        apply: impl FnOnce(&mut ExecutionSlot) -> T,
    ) -> Result<T, SchedulerError> {
        let slot = self.find_slot(name)?;
        let mut guard = Shared::lock_slot(name, &slot)?;
        Ok(apply(&mut guard))
    }

    fn transition(
        &self,
        name: &str,
        operation: &str,
        apply: impl FnOnce(&mut ExecutionSlot, Instant) -> SlotState,
    ) -> Result<(), SchedulerError> {
        let now = Instant::now();
        let (from, to) = self.with_slot(name, |slot| {
            let from = apply(slot, now);
            (from, slot.state())
        })?;

        if from != to {
            ProfileStateChanged {
                profile_name: name,
                from,
                to,
                operation,
            }
            .log();
        }
        self.shared.wake.notify_one();
        Ok(())
    }

    /// Make a stopped, completed or idle profile due now.
    pub fn start(&self, name: &str) -> Result<(), SchedulerError> {
        self.transition(name, "start", |slot, now| slot.start(now))
    }

    /// Stop dispatching a profile. An in-flight execution finishes but is never retried.
    pub fn stop(&self, name: &str) -> Result<(), SchedulerError> {
        self.transition(name, "stop", |slot, _| slot.stop())
    }

    /// Stop then start, clearing failure and iteration counters.
    pub fn restart(&self, name: &str) -> Result<(), SchedulerError> {
        self.transition(name, "restart", |slot, now| slot.restart(now))
    }

    /// Delay a profile's next run until at least `until` without changing its state.
    pub fn pause_until(&self, name: &str, until: Instant) -> Result<(), SchedulerError> {
        self.with_slot(name, |slot| slot.pause_until(until))?;
        ProfilePaused {
            profile_name: name,
            resume_in: until.saturating_duration_since(Instant::now()),
        }
        .log();
        Ok(())
    }

    /// Forget a profile's error history and last error.
    pub fn clear_errors(&self, name: &str) -> Result<(), SchedulerError> {
        self.with_slot(name, |slot| slot.clear_errors())
    }

    pub fn status(&self, name: &str) -> Result<SlotSnapshot, SchedulerError> {
        let now = Instant::now();
        self.with_slot(name, |slot| slot.snapshot(now))
    }

    /// Status of every profile, ordered by name.
    pub fn statuses(&self) -> Result<Vec<SlotSnapshot>, SchedulerError> {
        self.shared.reconcile()?;
        let now = Instant::now();
        self.shared
            .slot_handles()?
            .iter()
            .map(|(name, slot)| -> Result<SlotSnapshot, SchedulerError> {
                Ok(Shared::lock_slot(name, slot)?.snapshot(now))
            })
            .collect()
    }

    pub fn start_all(&self) -> Result<(), SchedulerError> {
        for name in self.profile_names()? {
            self.start(&name)?;
        }
        Ok(())
    }

    pub fn stop_all(&self) -> Result<(), SchedulerError> {
        for name in self.profile_names()? {
            self.stop(&name)?;
        }
        Ok(())
    }

    fn profile_names(&self) -> Result<Vec<String>, SchedulerError> {
        self.shared.reconcile()?;
        Ok(self
            .shared
            .slot_handles()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }
}
