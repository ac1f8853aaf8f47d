// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// The executable behaviour a profile delegates to.
///
/// A flow performs one iteration of work against the managed system. All side
/// effects happen externally; the scheduler only cares whether the iteration
/// succeeded. Flows carry configuration set at construction and no state
/// between invocations, since the scheduler builds a fresh instance per run.
#[async_trait]
pub trait Flow: Send + Sync {
    async fn execute(&self) -> anyhow::Result<()>;

    fn name(&self) -> &str;
}

/// Newtype wrapper around a flow constructor.
///
/// The registry stores one factory per profile; the scheduler calls
/// [`FlowFactory::build`] on every dispatch.
///
/// ```
/// use workload_scheduler::traits::{Flow, FlowFactory};
///
/// struct Ping;
///
/// #[async_trait::async_trait]
/// impl Flow for Ping {
///     async fn execute(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "ping"
///     }
/// }
///
/// let factory = FlowFactory::new(|| Box::new(Ping) as Box<dyn Flow>);
/// assert_eq!(factory.build().name(), "ping");
/// ```
#[derive(Clone)]
pub struct FlowFactory(Arc<dyn Fn() -> Box<dyn Flow> + Send + Sync>);

impl FlowFactory {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> Box<dyn Flow> + Send + Sync + 'static,
    {
        Self(Arc::new(constructor))
    }

    /// Construct a fresh flow instance for one execution
    pub fn build(&self) -> Box<dyn Flow> {
        (self.0)()
    }
}

impl fmt::Debug for FlowFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowFactory").finish_non_exhaustive()
    }
}
