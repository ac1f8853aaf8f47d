// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::traits::Flow;

/// Flow that always fails, for exercising alerting and backoff.
#[derive(Debug, Clone)]
pub struct FailFlow {
    message: String,
}

impl FailFlow {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Flow for FailFlow {
    async fn execute(&self) -> anyhow::Result<()> {
        anyhow::bail!("{}", self.message)
    }

    fn name(&self) -> &str {
        "fail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_returns_configured_message() {
        let flow = FailFlow::new("managed system unreachable");
        let error = flow.execute().await.unwrap_err();
        assert_eq!(error.to_string(), "managed system unreachable");
    }
}
