//! # lmprep CLI
//!
//! Provision a host for language model generation and launch `genlm`.
//!
//! ## Usage
//!
//! - `lmprep` / `lmprep run` - install packages, create the models directory, generate
//! - `lmprep plan` - show what a run would do
//! - `lmprep paths` - print the derived group and models directories
//!
//! The models directory is `${ML_GROUP_DIR}/language-models`. The run stops at
//! the first failing step and exits with that step's status.

use clap::{Parser, Subcommand};
use lmprep_core::config::{AlphabetMode, GenlmOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod commands;
mod config;
mod output;

use commands::{paths_command, plan_command, run_command};
use config::CliConfigLoader;

/// lmprep - provision a host and generate a language model
#[derive(Parser)]
#[command(name = "lmprep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Provision a host and generate a language model with genlm")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use this path as the group directory instead of $ML_GROUP_DIR
    #[arg(long, global = true, conflicts_with = "group_dir_env")]
    group_dir: Option<String>,

    /// Read the group directory from this environment variable
    #[arg(long, global = true)]
    group_dir_env: Option<String>,

    /// Name of the models directory below the group directory
    #[arg(long, global = true)]
    models_subdir: Option<String>,

    /// Fail when the group directory variable is unset
    #[arg(long, global = true)]
    strict: bool,

    /// Generator program to run
    #[arg(long, global = true)]
    program: Option<String>,

    /// Language of the model to generate
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Alphabet mode passed to the generator (auto, utf8, specific)
    #[arg(long, global = true)]
    alphabet_mode: Option<AlphabetMode>,

    /// Do not install OS packages
    #[arg(long, global = true)]
    skip_install: bool,

    /// Do not refresh the package index before installing
    #[arg(long, global = true)]
    skip_update: bool,

    /// Additional OS package to install (repeatable)
    #[arg(long = "package", value_name = "PACKAGE", global = true)]
    packages: Vec<String>,

    #[command(flatten)]
    genlm: GenlmArgs,

    /// Do not echo commands before running them
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the plan instead of executing it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags forwarded to the generator
#[derive(clap::Args)]
struct GenlmArgs {
    /// Number of preparation and counting workers
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Maximum block size per worker, e.g. 100M
    #[arg(long, global = true)]
    block_size: Option<String>,

    /// Times --vocabulary-size of items kept by each aggregator
    #[arg(long, global = true)]
    prune_factor: Option<usize>,

    /// Final number of words in the vocabulary
    #[arg(long, global = true)]
    vocabulary_size: Option<usize>,

    /// Override the language-specific alpha parameter
    #[arg(long, global = true)]
    alpha: Option<f64>,

    /// Override the language-specific beta parameter
    #[arg(long, global = true)]
    beta: Option<f64>,

    /// Re-download the corpus and regenerate from scratch
    #[arg(long, global = true)]
    force_download: bool,

    /// Regenerate from scratch, reusing the download
    #[arg(long, global = true)]
    force_generate: bool,
}

impl From<GenlmArgs> for GenlmOptions {
    fn from(args: GenlmArgs) -> Self {
        GenlmOptions {
            workers: args.workers,
            block_size: args.block_size,
            prune_factor: args.prune_factor,
            vocabulary_size: args.vocabulary_size,
            alpha: args.alpha,
            beta: args.beta,
            force_download: args.force_download,
            force_generate: args.force_generate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Install packages, create the models directory and run the generator
    Run,

    /// Show what a run would do without doing it
    Plan,

    /// Print the group and models directories
    Paths {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &mut Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new()
        .with_extra_packages(std::mem::take(&mut cli.packages))
        .with_skip_install(cli.skip_install)
        .with_skip_update(cli.skip_update)
        .with_strict(cli.strict)
        .with_quiet(cli.quiet)
        .with_dry_run(cli.dry_run);

    if let Some(config_path) = cli.config.take() {
        loader = loader.with_config_override(config_path);
    }

    if let Some(group_dir) = cli.group_dir.take() {
        loader = loader.with_group_dir(group_dir);
    }

    if let Some(var) = cli.group_dir_env.take() {
        loader = loader.with_group_dir_env(var);
    }

    if let Some(subdir) = cli.models_subdir.take() {
        loader = loader.with_models_subdir_override(subdir);
    }

    if let Some(program) = cli.program.take() {
        loader = loader.with_program_override(program);
    }

    if let Some(language) = cli.language.take() {
        loader = loader.with_language_override(language);
    }

    if let Some(mode) = cli.alphabet_mode {
        loader = loader.with_alphabet_mode_override(mode);
    }

    loader
}

/// Exit status for a failed command: the first core error in the chain decides
fn exit_code_for(err: &anyhow::Error) -> u8 {
    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<lmprep_core::Error>())
        .map(lmprep_core::Error::exit_code)
        .unwrap_or(lmprep_core::error::EXIT_FAILURE);
    u8::try_from(code).unwrap_or(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    lmprep_core::init_tracing(filter);

    let config_loader = build_config_loader(&mut cli);
    let genlm: GenlmOptions = cli.genlm.into();
    let config_loader = config_loader.with_genlm_overrides(genlm);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_command(config_loader).await,
        Commands::Plan => plan_command(config_loader).await,
        Commands::Paths { json } => paths_command(config_loader, json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lmprep_core::error::StepError;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["lmprep"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lmprep", "plan", "--language", "de", "--workers", "4"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Plan)));
        assert_eq!(cli.language.as_deref(), Some("de"));
        assert_eq!(cli.genlm.workers, Some(4));
    }

    #[test]
    fn test_alphabet_mode_flag() {
        let cli = Cli::try_parse_from(["lmprep", "--alphabet-mode", "auto"]).unwrap();
        assert_eq!(cli.alphabet_mode, Some(AlphabetMode::Auto));
        assert!(Cli::try_parse_from(["lmprep", "--alphabet-mode", "bytes"]).is_err());
    }

    #[test]
    fn test_exit_code_mapping() {
        let err = anyhow::Error::from(lmprep_core::Error::from(StepError::CommandFailed {
            program: "genlm".to_string(),
            code: Some(4),
        }));
        assert_eq!(exit_code_for(&err), 4);

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code_for(&err), 1);

        let err = anyhow::Error::from(lmprep_core::Error::from(StepError::ProgramNotFound {
            program: "genlm".to_string(),
        }))
        .context("running pipeline");
        assert_eq!(exit_code_for(&err), 127);
    }
}
