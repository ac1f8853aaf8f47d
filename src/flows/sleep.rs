// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::traits::Flow;

/// Flow that simulates I/O against the managed system by waiting.
#[derive(Debug, Clone)]
pub struct SleepFlow {
    duration: Duration,
}

impl SleepFlow {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl Flow for SleepFlow {
    async fn execute(&self) -> anyhow::Result<()> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "sleep"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_waits_for_duration() {
        let flow = SleepFlow::new(Duration::from_millis(750));
        let started = Instant::now();
        flow.execute().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(750));
    }
}
