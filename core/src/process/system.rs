//! Runner that spawns real processes

use super::{CommandRunner, CommandSpec, CommandStatus};
use crate::error::{Result, StepError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::debug;

/// Spawns commands with inherited stdio, echoing each one first when asked
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    echo: bool,
}

impl SystemRunner {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandStatus> {
        if self.echo {
            eprintln!("+ {}", spec);
        }
        debug!("Running: {}", spec);

        let resolved = which::which(&spec.program).map_err(|e| {
            debug!("Lookup of {} failed: {}", spec.program, e);
            StepError::ProgramNotFound {
                program: spec.program.clone(),
            }
        })?;
        debug!("Resolved {} to {}", spec.program, resolved.display());

        let start_time = Instant::now();
        let status = Command::new(&resolved)
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| StepError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let status = CommandStatus {
            code: status.code(),
        };
        debug!(
            "{} finished with {:?} after {} ms",
            spec.program,
            status.code,
            start_time.elapsed().as_millis()
        );
        Ok(status)
    }
}
