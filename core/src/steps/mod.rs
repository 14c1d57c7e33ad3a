//! Provisioning steps
//!
//! A step either completes, is skipped, or fails with an error that stops
//! the run. Steps are executed strictly in order by the
//! [`Pipeline`](crate::pipeline::Pipeline).

pub mod directory;
pub mod generate;
pub mod install;

use crate::error::Result;
use crate::process::{shell_quote, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

pub use directory::{ensure_models_dir, DirectoryStep};
pub use generate::{genlm_command, GenerateStep};
pub use install::InstallStep;

/// Something a step would do, used for plans and dry runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Run(CommandSpec),
    CreateDir(PathBuf),
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::Run(spec) => write!(f, "{}", spec),
            PlannedAction::CreateDir(path) => {
                write!(f, "mkdir -p {}", shell_quote(&path.to_string_lossy()))
            }
        }
    }
}

/// How a step finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Nothing needed doing; the state was already as required
    Unchanged,
    Skipped { reason: String },
}

/// One stage of a provisioning run
#[async_trait]
pub trait ProvisionStep: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Actions this step would take, without side effects
    fn plan(&self) -> Vec<PlannedAction>;

    /// Run the step
    async fn execute(&self, runner: &dyn CommandRunner) -> Result<StepOutcome>;
}
