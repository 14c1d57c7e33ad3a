//! CLI command implementations

pub mod paths;
pub mod plan;
pub mod run;

pub use paths::paths_command;
pub use plan::plan_command;
pub use run::run_command;
