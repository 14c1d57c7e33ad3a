//! Sequential provisioning pipeline
//!
//! Runs install, directory creation and generation in that order and stops
//! at the first failure, like a shell script under `set -e`.

use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::paths::ModelPaths;
use crate::process::CommandRunner;
use crate::steps::{
    DirectoryStep, GenerateStep, InstallStep, PlannedAction, ProvisionStep, StepOutcome,
};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Result of one executed step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
    pub duration: Duration,
}

/// Result of a successful run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

/// Ordered provisioning steps for one configuration
pub struct Pipeline {
    paths: ModelPaths,
    steps: Vec<Box<dyn ProvisionStep>>,
}

impl Pipeline {
    /// Validate `config`, resolve paths from the environment and build the steps
    pub fn from_config(config: &ProvisionConfig) -> Result<Self> {
        config.validate()?;
        let paths = ModelPaths::resolve(
            &config.group_dir,
            &config.models_subdir,
            config.strict_group_dir,
        )?;
        Ok(Self::with_paths(config, paths))
    }

    /// Build the steps for already resolved paths
    pub fn with_paths(config: &ProvisionConfig, paths: ModelPaths) -> Self {
        let steps: Vec<Box<dyn ProvisionStep>> = vec![
            Box::new(InstallStep::new(config.install.clone())),
            Box::new(DirectoryStep::new(
                paths.models_dir.clone(),
                config.echo_commands,
            )),
            Box::new(GenerateStep::from_config(config)),
        ];
        Self { paths, steps }
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    /// Planned actions per step, without side effects
    pub fn describe(&self) -> Vec<(String, Vec<PlannedAction>)> {
        self.steps
            .iter()
            .map(|step| (step.name().to_string(), step.plan()))
            .collect()
    }

    /// Execute every step in order, aborting on the first error
    pub async fn run(&self, runner: &dyn CommandRunner) -> Result<RunReport> {
        let mut report = RunReport::default();

        for step in &self.steps {
            info!("Step {}: starting", step.name());
            let start = Instant::now();
            match step.execute(runner).await {
                Ok(outcome) => {
                    let duration = start.elapsed();
                    info!(
                        "Step {}: {:?} in {} ms",
                        step.name(),
                        outcome,
                        duration.as_millis()
                    );
                    report.steps.push(StepReport {
                        name: step.name().to_string(),
                        outcome,
                        duration,
                    });
                }
                Err(e) => {
                    error!(
                        "Step {} failed after {} completed step(s): {}",
                        step.name(),
                        report.steps.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        Ok(report)
    }
}
