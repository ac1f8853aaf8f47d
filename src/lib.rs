// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // catalog loading + runtime builder
pub mod engine;     // scheduler loop, slots, backoff
pub mod errors;     // error handling
pub mod flows;      // built-in flows
pub mod observability;
pub mod registry;   // profile registry
pub mod traits;     // flow abstraction
