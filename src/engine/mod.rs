// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod due_queue;
mod lifecycle;
pub mod retry;
pub mod scheduler;
pub mod slot;

pub use retry::RetryPolicy;
pub use scheduler::{default_max_concurrency, Scheduler, SchedulerConfig, ShutdownReport};
pub use slot::{ErrorSummary, ExecutionSlot, SlotSnapshot, SlotState};
