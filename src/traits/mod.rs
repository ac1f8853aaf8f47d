// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod flow;

pub use flow::{Flow, FlowFactory};
