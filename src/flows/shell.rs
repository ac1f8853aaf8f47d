// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::Instant;

use crate::observability::messages::flow::ShellCommandFinished;
use crate::observability::messages::StructuredLog;
use crate::traits::Flow;

/// Flow that runs an external command once per iteration.
///
/// A non-zero exit status is a failure carrying the command's stderr. The child
/// is killed if the execution is dropped, so timeouts and shutdown do not leave
/// stray processes behind.
#[derive(Debug, Clone)]
pub struct ShellFlow {
    command: String,
    args: Vec<String>,
}

impl ShellFlow {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl Flow for ShellFlow {
    async fn execute(&self) -> anyhow::Result<()> {
        let started = Instant::now();
        let output = Command::new(&self.command)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to spawn '{}'", self.command))?;

        ShellCommandFinished {
            command: &self.command,
            exit_code: output.status.code(),
            duration: started.elapsed(),
        }
        .log();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "shell"
    }
}
