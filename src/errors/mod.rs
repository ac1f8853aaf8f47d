// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod flow_factory;
mod registry;
mod schedule;

pub use config::{ConfigError, ValidationError};
pub use execution::{FlowExecutionError, SchedulerError};
pub use flow_factory::FlowFactoryError;
pub use registry::RegistryError;
pub use schedule::ScheduleError;
