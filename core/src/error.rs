//! Error types and handling for lmprep core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lmprep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit status used when a program cannot be found on `PATH`
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Exit status used when no more specific status is available
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for lmprep core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provisioning step errors
    #[error(transparent)]
    Step(#[from] StepError),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {var} is not set and strict mode is enabled")]
    MissingGroupDir { var: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Empty command for {step}")]
    EmptyCommand { step: String },
}

/// Errors raised while running a provisioning step
#[derive(Error, Debug)]
pub enum StepError {
    #[error("{program}: command not found")]
    ProgramNotFound { program: String },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Package installation failed: {command} exited with {}", describe_code(.code))]
    InstallFailed { command: String, code: Option<i32> },

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", describe_code(.code))]
    CommandFailed { program: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Process exit status that should be reported for this error.
    ///
    /// A failing child's own status is propagated; a missing program maps to
    /// 127 like a POSIX shell; everything else is a generic failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Step(StepError::ProgramNotFound { .. }) => EXIT_COMMAND_NOT_FOUND,
            Error::Step(StepError::InstallFailed { code, .. })
            | Error::Step(StepError::CommandFailed { code, .. }) => match code {
                Some(code) if *code != 0 => *code,
                _ => EXIT_FAILURE,
            },
            _ => EXIT_FAILURE,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
