//! Show what a run would do

use anyhow::Result;
use lmprep_core::Pipeline;

/// Print the resolved paths and every command a run would execute
pub async fn plan_command(config_loader: crate::config::CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    let pipeline = Pipeline::from_config(&config)?;
    crate::output::print_plan(pipeline.paths(), &pipeline.describe());
    Ok(())
}
