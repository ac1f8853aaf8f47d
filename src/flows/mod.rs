// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod fail;
pub mod noop;
pub mod shell;
pub mod sleep;

#[cfg(test)]
pub mod stub;

pub use factory::LocalFlowFactory;
pub use fail::FailFlow;
pub use noop::NoopFlow;
pub use shell::ShellFlow;
pub use sleep::SleepFlow;
