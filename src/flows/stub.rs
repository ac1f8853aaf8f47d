// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Instrumented flows for scheduler tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::traits::{Flow, FlowFactory};

/// Shared record of every execution of the flows built from one factory.
#[derive(Debug, Default)]
pub struct ExecutionRecorder {
    starts: Mutex<Vec<Instant>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ExecutionRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Start times of every execution, in order.
    pub fn starts(&self) -> Vec<Instant> {
        self.starts.lock().unwrap().clone()
    }

    /// Start times as offsets from `origin`, in whole seconds.
    pub fn start_offsets(&self, origin: Instant) -> Vec<u64> {
        self.starts()
            .into_iter()
            .map(|at| at.duration_since(origin).as_secs())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn enter(self: &Arc<Self>) -> (usize, ActiveGuard) {
        let count = {
            let mut starts = self.starts.lock().unwrap();
            starts.push(Instant::now());
            starts.len()
        };
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        (count, ActiveGuard(Arc::clone(self)))
    }
}

// Decrements on drop so aborted executions are not counted as still running.
struct ActiveGuard(Arc<ExecutionRecorder>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How a stub execution ends.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    Succeed,
    Fail(&'static str),
    Panic(&'static str),
    /// Fail the first `n` executions, then succeed.
    FailFirst(usize),
    /// Fail with the execution number appended, e.g. `refused 3`.
    FailNumbered(&'static str),
}

pub struct StubFlow {
    recorder: Arc<ExecutionRecorder>,
    run_time: Duration,
    behavior: StubBehavior,
}

#[async_trait]
impl Flow for StubFlow {
    async fn execute(&self) -> anyhow::Result<()> {
        let (count, _guard) = self.recorder.enter();
        if !self.run_time.is_zero() {
            tokio::time::sleep(self.run_time).await;
        }

        match &self.behavior {
            StubBehavior::Succeed => Ok(()),
            StubBehavior::Fail(message) => anyhow::bail!("{}", message),
            StubBehavior::Panic(message) => panic!("{}", message),
            StubBehavior::FailFirst(n) if count <= *n => {
                anyhow::bail!("failure {} of {}", count, n)
            }
            StubBehavior::FailFirst(_) => Ok(()),
            StubBehavior::FailNumbered(prefix) => anyhow::bail!("{} {}", prefix, count),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn stub_factory(
    recorder: &Arc<ExecutionRecorder>,
    run_time: Duration,
    behavior: StubBehavior,
) -> FlowFactory {
    let recorder = Arc::clone(recorder);
    FlowFactory::new(move || {
        Box::new(StubFlow {
            recorder: Arc::clone(&recorder),
            run_time,
            behavior: behavior.clone(),
        }) as Box<dyn Flow>
    })
}
