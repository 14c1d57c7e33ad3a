//! Runner that records invocations instead of running them

use super::{CommandRunner, CommandSpec, CommandStatus};
use crate::error::{Result, StepError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Records every command and answers with scripted statuses.
///
/// Programs without a scripted status succeed.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    statuses: HashMap<String, CommandStatus>,
    missing: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` exit with `code`
    pub fn with_exit_code(mut self, program: impl Into<String>, code: i32) -> Self {
        self.statuses
            .insert(program.into(), CommandStatus::from_code(code));
        self
    }

    /// Make `program` look absent from `PATH`
    pub fn with_missing(mut self, program: impl Into<String>) -> Self {
        self.missing.insert(program.into());
        self
    }

    /// Commands recorded so far, in call order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandStatus> {
        if self.missing.contains(&spec.program) {
            return Err(StepError::ProgramNotFound {
                program: spec.program.clone(),
            }
            .into());
        }

        self.calls
            .lock()
            .map_err(|_| "recording runner lock poisoned")?
            .push(spec.clone());

        Ok(self
            .statuses
            .get(&spec.program)
            .copied()
            .unwrap_or(CommandStatus::SUCCESS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_scripts() {
        let runner = RecordingRunner::new().with_exit_code("false", 1);

        let ok = runner.run(&CommandSpec::new("true")).await.unwrap();
        let failed = runner.run(&CommandSpec::new("false")).await.unwrap();

        assert!(ok.success());
        assert_eq!(failed.code, Some(1));
        let programs: Vec<_> = runner.calls().into_iter().map(|c| c.program).collect();
        assert_eq!(programs, vec!["true", "false"]);
    }

    #[tokio::test]
    async fn test_missing_program_is_not_recorded() {
        let runner = RecordingRunner::new().with_missing("genlm");
        assert!(runner.run(&CommandSpec::new("genlm")).await.is_err());
        assert!(runner.calls().is_empty());
    }
}
