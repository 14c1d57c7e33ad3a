//! Language model generation through the external generator

use super::{PlannedAction, ProvisionStep, StepOutcome};
use crate::config::ProvisionConfig;
use crate::error::{Result, StepError};
use crate::process::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use tracing::info;

/// Build the generator invocation.
///
/// Flags come first in a fixed order, the language is always last. With
/// default settings this is `genlm --alphabet-mode utf8 en`.
pub fn genlm_command(config: &ProvisionConfig) -> CommandSpec {
    let opts = &config.genlm;
    let mut spec = CommandSpec::new(config.program.clone())
        .arg("--alphabet-mode")
        .arg(config.alphabet_mode.as_str());

    if let Some(workers) = opts.workers {
        spec = spec.arg("--workers").arg(workers.to_string());
    }
    if let Some(block_size) = &opts.block_size {
        spec = spec.arg("--block-size").arg(block_size.clone());
    }
    if let Some(prune_factor) = opts.prune_factor {
        spec = spec.arg("--prune-factor").arg(prune_factor.to_string());
    }
    if let Some(vocabulary_size) = opts.vocabulary_size {
        spec = spec
            .arg("--vocabulary-size")
            .arg(vocabulary_size.to_string());
    }
    if let Some(alpha) = opts.alpha {
        spec = spec.arg("--alpha").arg(alpha.to_string());
    }
    if let Some(beta) = opts.beta {
        spec = spec.arg("--beta").arg(beta.to_string());
    }
    if opts.force_download {
        spec = spec.arg("--force-download");
    }
    if opts.force_generate {
        spec = spec.arg("--force-generate");
    }

    spec.arg(config.language.as_str())
}

/// Runs the generator; its exit status decides the outcome of the whole run
#[derive(Debug, Clone)]
pub struct GenerateStep {
    spec: CommandSpec,
}

impl GenerateStep {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    pub fn from_config(config: &ProvisionConfig) -> Self {
        Self::new(genlm_command(config))
    }
}

#[async_trait]
impl ProvisionStep for GenerateStep {
    fn name(&self) -> &str {
        "generate"
    }

    fn plan(&self) -> Vec<PlannedAction> {
        vec![PlannedAction::Run(self.spec.clone())]
    }

    async fn execute(&self, runner: &dyn CommandRunner) -> Result<StepOutcome> {
        info!("Generating language model with {}", self.spec.program);
        let status = runner.run(&self.spec).await?;
        if !status.success() {
            return Err(StepError::CommandFailed {
                program: self.spec.program.clone(),
                code: status.code,
            }
            .into());
        }
        Ok(StepOutcome::Completed)
    }
}
