// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability for the scheduler: structured log messages and the profile event bus.
//!
//! Log output goes through struct-based messages (see [`messages`]) so the wording
//! of every diagnostic lives in one place and each event carries typed fields.
//! Machine consumers subscribe to [`events::EventBus`] instead of scraping logs.
//!
//! # Architecture
//!
//! * `messages::config` - catalog loading and validation
//! * `messages::profile` - registration, execution and lifecycle control per profile
//! * `messages::scheduler` - scheduler loop start-up, dispatch passes, shutdown
//! * `events` - [`events::ProfileEvent`] broadcast for every execution milestone
//!
//! # Usage
//!
//! ```rust
//! use workload_scheduler::observability::messages::profile::ProfileOverlapSkipped;
//!
//! let msg = ProfileOverlapSkipped { profile_name: "PM_38" };
//! tracing::warn!("{}", msg);
//! ```

pub mod events;
pub mod messages;
