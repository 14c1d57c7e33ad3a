//! # lmprep Core
//!
//! Core library for lmprep - provisions a host for language model generation
//! and launches the external `genlm` generator.
//!
//! The run is a fixed sequence: install OS packages, ensure the models
//! directory beneath the group directory exists, then invoke the generator.
//! The first failing step aborts the run and its exit status is propagated.

// Core modules
pub mod config;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod steps;

// Re-export commonly used types
pub use config::{AlphabetMode, GroupDirSource, LanguageCode, ProvisionConfig};
pub use error::{Error, Result};
pub use paths::ModelPaths;
pub use pipeline::{Pipeline, RunReport, StepReport};
pub use process::{CommandRunner, CommandSpec, SystemRunner};

/// Initialize tracing with a filter directive such as `info` or `lmprep=debug`.
///
/// `LMPREP_LOG`, then `RUST_LOG`, override the directive when set.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("LMPREP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
