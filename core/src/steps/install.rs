//! OS package installation

use super::{PlannedAction, ProvisionStep, StepOutcome};
use crate::config::InstallConfig;
use crate::error::{ConfigError, Result, StepError};
use crate::process::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use tracing::info;

/// Runs the optional update command, then installs the configured packages
#[derive(Debug, Clone)]
pub struct InstallStep {
    config: InstallConfig,
}

impl InstallStep {
    pub fn new(config: InstallConfig) -> Self {
        Self { config }
    }

    fn skip_reason(&self) -> Option<&'static str> {
        if !self.config.enabled {
            Some("package installation disabled")
        } else if self.config.packages.is_empty() {
            Some("no packages configured")
        } else {
            None
        }
    }

    fn commands(&self) -> Result<Vec<CommandSpec>> {
        let mut commands = Vec::with_capacity(2);
        if let Some(update) = &self.config.update_command {
            let spec = CommandSpec::from_argv(update).ok_or(ConfigError::EmptyCommand {
                step: "update".to_string(),
            })?;
            commands.push(spec);
        }
        let install = CommandSpec::from_argv(&self.config.install_command)
            .ok_or(ConfigError::EmptyCommand {
                step: "install".to_string(),
            })?
            .args(self.config.packages.iter().cloned());
        commands.push(install);
        Ok(commands)
    }
}

#[async_trait]
impl ProvisionStep for InstallStep {
    fn name(&self) -> &str {
        "install"
    }

    fn plan(&self) -> Vec<PlannedAction> {
        if self.skip_reason().is_some() {
            return Vec::new();
        }
        self.commands()
            .map(|commands| commands.into_iter().map(PlannedAction::Run).collect())
            .unwrap_or_default()
    }

    async fn execute(&self, runner: &dyn CommandRunner) -> Result<StepOutcome> {
        if let Some(reason) = self.skip_reason() {
            info!("Skipping package installation: {}", reason);
            return Ok(StepOutcome::Skipped {
                reason: reason.to_string(),
            });
        }

        info!("Installing {} packages", self.config.packages.len());
        for spec in self.commands()? {
            let status = runner.run(&spec).await?;
            if !status.success() {
                return Err(StepError::InstallFailed {
                    command: spec.to_string(),
                    code: status.code,
                }
                .into());
            }
        }
        Ok(StepOutcome::Completed)
    }
}
