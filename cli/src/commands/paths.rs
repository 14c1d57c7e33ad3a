//! Print the derived directories

use anyhow::Result;
use lmprep_core::ModelPaths;

/// Resolve the group and models directories without touching the filesystem
pub async fn paths_command(
    config_loader: crate::config::CliConfigLoader,
    json: bool,
) -> Result<()> {
    let config = config_loader.load().await?;
    let paths = ModelPaths::resolve(
        &config.group_dir,
        &config.models_subdir,
        config.strict_group_dir,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        crate::output::print_paths(&paths);
    }
    Ok(())
}
