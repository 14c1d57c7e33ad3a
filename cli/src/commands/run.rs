//! Provisioning run command

use anyhow::Result;
use lmprep_core::{Pipeline, SystemRunner};
use tracing::{debug, info};

/// Install packages, ensure the models directory and run the generator
pub async fn run_command(config_loader: crate::config::CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    debug!("Resolved configuration: {:?}", config);

    let pipeline = Pipeline::from_config(&config)?;
    if config.dry_run {
        info!("Dry run, nothing will be executed");
        crate::output::print_plan(pipeline.paths(), &pipeline.describe());
        return Ok(());
    }

    info!(
        "Generating {} model into {}",
        config.language,
        pipeline.paths().models_dir.display()
    );
    let runner = SystemRunner::new(config.echo_commands);
    let report = pipeline.run(&runner).await?;

    if config.echo_commands {
        crate::output::print_summary(&report);
    }
    Ok(())
}
