// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::traits::Flow;

/// Flow that succeeds immediately. Useful for smoke-testing a catalog.
#[derive(Debug, Default)]
pub struct NoopFlow;

impl NoopFlow {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Flow for NoopFlow {
    async fn execute(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
