// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The scheduler loop: decides which profiles are due and dispatches them.
//!
//! # Architecture
//!
//! One coordinating task owns the tick. Every pass it reconciles the slot table
//! with the registry, collects due slots into a [`DueQueue`] and dispatches as
//! many as there are free semaphore permits. Each dispatch becomes an
//! independent *execution unit* task that:
//!
//! 1. builds a fresh flow from the profile's factory,
//! 2. runs it on its own inner task so a panic is caught as a `JoinError`,
//! 3. enforces the optional per-profile timeout,
//! 4. writes the outcome back into its slot, releases the permit and wakes the
//!    loop so queued profiles do not wait for the next tick.
//!
//! # Locking
//!
//! The slot table is an `RwLock<HashMap<_, Arc<Mutex<ExecutionSlot>>>>`. The
//! table lock is held only long enough to clone the `Arc`s; each slot mutex is
//! held for a handful of field updates and never across an `.await`. A poisoned
//! lock means a panic happened mid-update, so the slot can no longer be trusted:
//! the scheduler trips its cancellation token and [`Scheduler::join`] reports
//! [`SchedulerError::Fatal`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::config::consts::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_SHUTDOWN_GRACE_SECONDS, DEFAULT_TICK_MS,
    FALLBACK_MAX_CONCURRENCY,
};
use crate::engine::due_queue::{DueProfile, DueQueue};
use crate::engine::slot::{ExecutionSlot, RunOutcome, SlotSnapshot};
use crate::engine::RetryPolicy;
use crate::errors::{FlowExecutionError, SchedulerError};
use crate::observability::events::{EventBus, ProfileEvent, ProfileEventType};
use crate::observability::messages::profile::{
    ProfileCompleted, ProfileDegraded, ProfileDispatched, ProfileFailed, ProfileOverlapSkipped,
    ProfileSucceeded,
};
use crate::observability::messages::scheduler::{
    DispatchPassCompleted, SchedulerFatal, SchedulerShutdownCompleted, SchedulerShutdownStarted,
    SchedulerStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{ProfileDescriptor, ProfileRegistry};
use crate::traits::FlowFactory;

pub(crate) type SlotHandle = Arc<Mutex<ExecutionSlot>>;

/// Tuning for the scheduler loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick: Duration,
    pub max_concurrency: usize,
    pub shutdown_grace: Duration,
    pub event_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            max_concurrency: default_max_concurrency(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECONDS),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Host parallelism, or a fixed fallback when it cannot be determined.
pub fn default_max_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_MAX_CONCURRENCY)
}

/// Result of a graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    pub elapsed: Duration,
    /// Final status of every profile, ordered by name.
    pub statuses: Vec<SlotSnapshot>,
}

/// State shared between the scheduler handle, its loop and every execution unit.
pub(crate) struct Shared {
    pub(crate) registry: Arc<ProfileRegistry>,
    pub(crate) config: SchedulerConfig,
    pub(crate) slots: RwLock<HashMap<String, SlotHandle>>,
    reconciled_version: Mutex<Option<u64>>,
    /// Names with an execution in flight, whichever slot launched it.
    active_runs: Mutex<HashSet<String>>,
    permits: Arc<Semaphore>,
    pub(crate) wake: Notify,
    pub(crate) events: EventBus,
    cancel: CancellationToken,
    abort_runs: CancellationToken,
    tracker: TaskTracker,
    fatal: OnceLock<String>,
}

/// Runs every registered profile on its own cadence.
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use workload_scheduler::engine::{Scheduler, SchedulerConfig};
/// use workload_scheduler::flows::NoopFlow;
/// use workload_scheduler::registry::ProfileRegistry;
/// use workload_scheduler::traits::{Flow, FlowFactory};
///
/// # async fn run() -> Result<(), workload_scheduler::errors::SchedulerError> {
/// let scheduler = Scheduler::new(Arc::new(ProfileRegistry::new()), SchedulerConfig::default());
/// scheduler.register(
///     "PM_38",
///     FlowFactory::new(|| Box::new(NoopFlow::new()) as Box<dyn Flow>),
///     Duration::from_secs(900),
/// )?;
///
/// scheduler.spawn()?;
/// tokio::time::sleep(Duration::from_secs(60)).await;
/// let report = scheduler.shutdown(Duration::from_secs(30)).await?;
/// println!("{} profiles", report.statuses.len());
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    pub(crate) shared: Arc<Shared>,
    loop_handle: Mutex<Option<JoinHandle<Result<(), SchedulerError>>>>,
}

impl Scheduler {
    /// Create a scheduler over `registry`. Slots for the profiles already
    /// registered exist immediately, so lifecycle control works before
    /// [`spawn`](Self::spawn).
    pub fn new(registry: Arc<ProfileRegistry>, config: SchedulerConfig) -> Self {
        let shared = Arc::new(Shared {
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            events: EventBus::new(config.event_capacity),
            registry,
            config,
            slots: RwLock::new(HashMap::new()),
            reconciled_version: Mutex::new(None),
            active_runs: Mutex::new(HashSet::new()),
            wake: Notify::new(),
            cancel: CancellationToken::new(),
            abort_runs: CancellationToken::new(),
            tracker: TaskTracker::new(),
            fatal: OnceLock::new(),
        });

        if let Err(error) = shared.reconcile() {
            shared.trip_fatal(&error);
        }

        Self {
            shared,
            loop_handle: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.shared.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Register a profile and create its slot.
    pub fn register(
        &self,
        name: &str,
        flow_factory: FlowFactory,
        interval: Duration,
    ) -> Result<(), SchedulerError> {
        self.shared.registry.register(name, flow_factory, interval)?;
        self.shared.reconcile()?;
        self.shared.wake.notify_one();
        Ok(())
    }

    /// Register a fully specified descriptor and create its slot.
    pub fn register_descriptor(&self, descriptor: ProfileDescriptor) -> Result<(), SchedulerError> {
        self.shared.registry.register_descriptor(descriptor)?;
        self.shared.reconcile()?;
        self.shared.wake.notify_one();
        Ok(())
    }

    /// Remove a profile. An execution in flight finishes against the orphaned
    /// slot, and a profile registered again under the same name is not
    /// dispatched until that execution is done.
    pub fn unregister(&self, name: &str) -> Result<(), SchedulerError> {
        self.shared.registry.unregister(name)?;
        self.shared.reconcile()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.shared.events.subscribe()
    }

    /// Start the scheduler loop on its own task.
    pub fn spawn(&self) -> Result<(), SchedulerError> {
        let mut handle = self.shared.lock_loop_handle(&self.loop_handle)?;
        if handle.is_some() || self.shared.cancel.is_cancelled() {
            return Err(SchedulerError::AlreadyStarted);
        }
        *handle = Some(tokio::spawn(run_loop(Arc::clone(&self.shared))));
        Ok(())
    }

    /// Wait for the loop to exit. Returns `Fatal` if it stopped on corrupted state.
    pub async fn join(&self) -> Result<(), SchedulerError> {
        let handle = self.shared.lock_loop_handle(&self.loop_handle)?.take();
        match handle {
            Some(handle) => match handle.await {
                Ok(result) => result,
                Err(error) => Err(SchedulerError::Fatal {
                    reason: format!("scheduler loop task failed: {}", error),
                }),
            },
            None => self.shared.fatal_result(),
        }
    }

    /// Stop dispatching and wait up to `grace` for in-flight executions.
    ///
    /// Executions still running when the grace period expires are aborted at
    /// their next await point and the call returns
    /// [`SchedulerError::ShutdownTimedOut`].
    pub async fn shutdown(&self, grace: Duration) -> Result<ShutdownReport, SchedulerError> {
        let started = Instant::now();
        SchedulerShutdownStarted {
            in_flight: self.shared.tracker.len(),
            grace,
        }
        .log();

        self.shared.cancel.cancel();
        let loop_result = self.join().await;

        self.shared.tracker.close();
        if tokio::time::timeout(grace, self.shared.tracker.wait())
            .await
            .is_err()
        {
            let abandoned = self.shared.tracker.len();
            self.shared.abort_runs.cancel();
            SchedulerShutdownCompleted {
                duration: started.elapsed(),
                abandoned,
            }
            .log();
            loop_result?;
            return Err(SchedulerError::ShutdownTimedOut {
                in_flight: abandoned,
                grace,
            });
        }

        let elapsed = started.elapsed();
        SchedulerShutdownCompleted {
            duration: elapsed,
            abandoned: 0,
        }
        .log();
        loop_result?;

        Ok(ShutdownReport {
            elapsed,
            statuses: self.statuses()?,
        })
    }

    /// Number of executions currently running.
    pub fn in_flight(&self) -> usize {
        self.shared.tracker.len()
    }
}

async fn run_loop(shared: Arc<Shared>) -> Result<(), SchedulerError> {
    let mut ticker = tokio::time::interval(shared.config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = SchedulerStarted {
        profile_count: shared.registry.len(),
        max_concurrency: shared.config.max_concurrency.max(1),
        tick: shared.config.tick,
    };
    started.log();

    async move {
        loop {
            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = shared.wake.notified() => {}
            }

            if let Err(error) = shared.dispatch_pass() {
                shared.trip_fatal(&error);
                break;
            }
        }
        shared.fatal_result()
    }
    .instrument(started.span("scheduler_loop"))
    .await
}

impl Shared {
    fn poisoned(what: &str) -> SchedulerError {
        SchedulerError::Fatal {
            reason: format!("{} lock poisoned", what),
        }
    }

    fn lock_loop_handle<'a>(
        &self,
        handle: &'a Mutex<Option<JoinHandle<Result<(), SchedulerError>>>>,
    ) -> Result<MutexGuard<'a, Option<JoinHandle<Result<(), SchedulerError>>>>, SchedulerError>
    {
        handle.lock().map_err(|_| Self::poisoned("scheduler loop handle"))
    }

    pub(crate) fn lock_slot<'a>(
        name: &str,
        slot: &'a SlotHandle,
    ) -> Result<MutexGuard<'a, ExecutionSlot>, SchedulerError> {
        slot.lock()
            .map_err(|_| Self::poisoned(&format!("execution slot '{}'", name)))
    }

    /// Clone the handles of every slot, ordered by name.
    pub(crate) fn slot_handles(&self) -> Result<Vec<(String, SlotHandle)>, SchedulerError> {
        let slots = self.slots.read().map_err(|_| Self::poisoned("slot table"))?;
        let mut handles: Vec<(String, SlotHandle)> = slots
            .iter()
            .map(|(name, slot)| (name.clone(), Arc::clone(slot)))
            .collect();
        drop(slots);
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(handles)
    }

    pub(crate) fn slot_handle(&self, name: &str) -> Result<Option<SlotHandle>, SchedulerError> {
        let slots = self.slots.read().map_err(|_| Self::poisoned("slot table"))?;
        Ok(slots.get(name).cloned())
    }

    /// Bring the slot table in line with the registry.
    ///
    /// New profiles get a fresh slot, removed ones lose theirs, and a name that
    /// was unregistered and registered again gets a fresh slot for its new
    /// descriptor. Nothing happens if the registry has not changed.
    pub(crate) fn reconcile(&self) -> Result<(), SchedulerError> {
        let mut applied = self
            .reconciled_version
            .lock()
            .map_err(|_| Self::poisoned("reconcile"))?;
        let snapshot = self.registry.snapshot();
        if *applied == Some(snapshot.version()) {
            return Ok(());
        }

        let now = Instant::now();
        let mut slots = self.slots.write().map_err(|_| Self::poisoned("slot table"))?;
        slots.retain(|name, _| snapshot.contains(name));

        for descriptor in snapshot.iter() {
            let current = match slots.get(descriptor.name()) {
                Some(slot) => {
                    let guard = Self::lock_slot(descriptor.name(), slot)?;
                    Arc::ptr_eq(guard.descriptor(), descriptor)
                }
                None => false,
            };
            if !current {
                slots.insert(
                    descriptor.name().to_string(),
                    Arc::new(Mutex::new(ExecutionSlot::new(Arc::clone(descriptor), now))),
                );
            }
        }

        *applied = Some(snapshot.version());
        Ok(())
    }

    /// Dispatch every due slot that a permit is available for.
    fn dispatch_pass(self: &Arc<Self>) -> Result<(), SchedulerError> {
        self.reconcile()?;
        let now = Instant::now();

        let handles = self.slot_handles()?;
        let active = self
            .active_runs
            .lock()
            .map_err(|_| Self::poisoned("active runs"))?
            .clone();
        let mut queue = DueQueue::new();
        let mut by_name: HashMap<String, SlotHandle> = HashMap::with_capacity(handles.len());

        for (name, slot) in handles {
            let (due, overlapping, due_at) = {
                let mut guard = Self::lock_slot(&name, &slot)?;
                let elsewhere = active.contains(&name);
                let due = !elsewhere && guard.is_due(now);
                let overlapping = !due && guard.take_overlap(now, elsewhere);
                (due, overlapping, guard.next_run_at())
            };

            if due {
                queue.push(DueProfile::new(name.clone(), due_at));
                by_name.insert(name, slot);
            } else if overlapping {
                ProfileOverlapSkipped {
                    profile_name: &name,
                }
                .log();
                self.events
                    .publish(ProfileEvent::new(name, ProfileEventType::SkippedOverlap));
            }
        }

        let due = queue.len();
        let mut dispatched = 0;
        while !queue.is_empty() {
            let permit = match Arc::clone(&self.permits).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let Some(profile) = queue.pop() else { break };
            if let Some(slot) = by_name.remove(&profile.name) {
                self.dispatch(profile.name, slot, permit, now)?;
                dispatched += 1;
            }
        }

        if due > 0 {
            DispatchPassCompleted {
                due,
                dispatched,
                queued: queue.len(),
            }
            .log();
        }
        Ok(())
    }

    fn dispatch(
        self: &Arc<Self>,
        name: String,
        slot: SlotHandle,
        permit: OwnedSemaphorePermit,
        now: Instant,
    ) -> Result<(), SchedulerError> {
        self.active_runs
            .lock()
            .map_err(|_| Self::poisoned("active runs"))?
            .insert(name.clone());

        let (descriptor, generation, iteration, waited) = {
            let mut guard = Self::lock_slot(&name, &slot)?;
            let waited = now.saturating_duration_since(guard.next_run_at());
            let generation = guard.begin_run(now);
            (
                Arc::clone(guard.descriptor()),
                generation,
                guard.iterations + 1,
                waited,
            )
        };

        let dispatched = ProfileDispatched {
            profile_name: &name,
            iteration,
            waited,
        };
        dispatched.log();
        let span = dispatched.span("execution_unit");
        self.events
            .publish(ProfileEvent::new(name.clone(), ProfileEventType::Started));

        let shared = Arc::clone(self);
        self.tracker.spawn(
            async move {
                let started = Instant::now();
                let result = shared.execute_flow(&descriptor).await;
                if let Err(error) = shared.complete(&name, &slot, generation, result, started) {
                    shared.trip_fatal(&error);
                }
                shared.release_run(&name);
                drop(permit);
                shared.wake.notify_one();
            }
            .instrument(span),
        );
        Ok(())
    }

    /// Run one flow instance, converting every way it can end into a `Result`.
    async fn execute_flow(&self, descriptor: &ProfileDescriptor) -> Result<(), FlowExecutionError> {
        let factory = descriptor.flow_factory().clone();
        let mut handle = tokio::spawn(
            async move {
                let flow = factory.build();
                flow.execute().await
            }
            .in_current_span(),
        );
        let abort = handle.abort_handle();

        let run = async {
            match descriptor.execution_timeout() {
                Some(limit) => tokio::time::timeout(limit, &mut handle)
                    .await
                    .map_err(|_| FlowExecutionError::TimedOut(limit)),
                None => Ok((&mut handle).await),
            }
        };

        let result = tokio::select! {
            result = run => result,
            _ = self.abort_runs.cancelled() => Err(FlowExecutionError::Failed {
                message: "execution abandoned at shutdown".to_string(),
            }),
        };

        match result {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(error))) => Err(FlowExecutionError::from_flow_error(&error)),
            Ok(Err(join_error)) => Err(FlowExecutionError::from_join_error(join_error)),
            Err(error) => {
                abort.abort();
                Err(error)
            }
        }
    }

    fn complete(
        &self,
        name: &str,
        slot: &SlotHandle,
        generation: u64,
        result: Result<(), FlowExecutionError>,
        started: Instant,
    ) -> Result<(), SchedulerError> {
        let now = Instant::now();
        let (outcome, consecutive_failures, iterations) = {
            let mut guard = Self::lock_slot(name, slot)?;
            let outcome = guard.complete_run(generation, &result, now, &self.config.retry);
            (outcome, guard.consecutive_failures(), guard.iterations)
        };

        match (&result, &outcome) {
            (
                Ok(()),
                RunOutcome::Succeeded {
                    next_run_in,
                    completed,
                },
            ) => {
                ProfileSucceeded {
                    profile_name: name,
                    duration: now.saturating_duration_since(started),
                    next_run_in: *next_run_in,
                }
                .log();
                if *completed {
                    ProfileCompleted {
                        profile_name: name,
                        iterations,
                    }
                    .log();
                }
                self.events
                    .publish(ProfileEvent::new(name, ProfileEventType::Succeeded));
            }
            (
                Err(error),
                RunOutcome::Failed {
                    retry_in,
                    nominal_in,
                    consecutive_failures,
                    degraded,
                    completed,
                },
            ) => {
                ProfileFailed {
                    profile_name: name,
                    consecutive_failures: *consecutive_failures,
                    error,
                    retry_in: *retry_in,
                }
                .log();
                if *degraded && *consecutive_failures == self.config.retry.failure_threshold.max(1)
                {
                    ProfileDegraded {
                        profile_name: name,
                        consecutive_failures: *consecutive_failures,
                        nominal_interval: *nominal_in,
                        backoff_interval: *retry_in,
                    }
                    .log();
                }
                if *completed {
                    ProfileCompleted {
                        profile_name: name,
                        iterations,
                    }
                    .log();
                }
                self.events.publish(
                    ProfileEvent::new(name, ProfileEventType::Failed)
                        .with_error(error.to_string())
                        .with_failures(*consecutive_failures, *degraded),
                );
            }
            (result, _) => {
                // Restarted mid-run: report what happened without touching the slot.
                let event = match result {
                    Ok(()) => ProfileEvent::new(name, ProfileEventType::Succeeded),
                    Err(error) => ProfileEvent::new(name, ProfileEventType::Failed)
                        .with_error(error.to_string())
                        .with_failures(consecutive_failures, false),
                };
                self.events.publish(event);
            }
        }
        Ok(())
    }

    fn release_run(&self, name: &str) {
        match self.active_runs.lock() {
            Ok(mut active) => {
                active.remove(name);
            }
            Err(_) => self.trip_fatal(&Self::poisoned("active runs")),
        }
    }

    fn trip_fatal(&self, error: &SchedulerError) {
        let reason = match error {
            SchedulerError::Fatal { reason } => reason.clone(),
            other => other.to_string(),
        };
        if self.fatal.set(reason.clone()).is_ok() {
            SchedulerFatal { reason: &reason }.log();
        }
        self.cancel.cancel();
    }

    fn fatal_result(&self) -> Result<(), SchedulerError> {
        match self.fatal.get() {
            Some(reason) => Err(SchedulerError::Fatal {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::stub::{stub_factory, ExecutionRecorder, StubBehavior};

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_tracks_registry_changes() {
        let registry = Arc::new(ProfileRegistry::new());
        let scheduler = Scheduler::new(Arc::clone(&registry), SchedulerConfig::default());
        let recorder = ExecutionRecorder::new();

        registry
            .register(
                "FM_01",
                stub_factory(&recorder, Duration::ZERO, StubBehavior::Succeed),
                Duration::from_secs(60),
            )
            .unwrap();
        scheduler.shared.reconcile().unwrap();
        assert_eq!(scheduler.shared.slot_handles().unwrap().len(), 1);

        registry.unregister("FM_01").unwrap();
        scheduler.shared.reconcile().unwrap();
        assert!(scheduler.shared.slot_handles().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_twice_is_rejected() {
        let scheduler = Scheduler::new(Arc::new(ProfileRegistry::new()), SchedulerConfig::default());
        scheduler.spawn().unwrap();
        assert_eq!(scheduler.spawn(), Err(SchedulerError::AlreadyStarted));
        scheduler.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poisoned_slot_is_fatal() {
        let scheduler = Scheduler::new(Arc::new(ProfileRegistry::new()), SchedulerConfig::default());
        let recorder = ExecutionRecorder::new();
        scheduler
            .register(
                "NHM_03",
                stub_factory(&recorder, Duration::ZERO, StubBehavior::Succeed),
                Duration::from_secs(60),
            )
            .unwrap();

        let slot = scheduler.shared.slot_handle("NHM_03").unwrap().unwrap();
        let poisoner = std::thread::spawn(move || {
            let _guard = slot.lock().unwrap();
            panic!("poison the slot");
        });
        assert!(poisoner.join().is_err());

        scheduler.spawn().unwrap();
        let result = scheduler.join().await;
        assert!(matches!(result, Err(SchedulerError::Fatal { reason }) if reason.contains("NHM_03")));
    }
}
