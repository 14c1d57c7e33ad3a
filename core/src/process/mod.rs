//! Process execution seam
//!
//! Steps never spawn processes directly; they hand a [`CommandSpec`] to a
//! [`CommandRunner`]. [`SystemRunner`] runs real programs, [`RecordingRunner`]
//! records invocations and answers with scripted statuses.

pub mod recording;
pub mod system;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

pub use recording::RecordingRunner;
pub use system::SystemRunner;

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from an argv-style list; `None` when the list is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Renders the command the way a shell trace would print it
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

pub(crate) fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,@+%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: CommandStatus = CommandStatus { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs commands on behalf of provisioning steps
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion.
    ///
    /// A program that cannot be located is an error
    /// ([`StepError::ProgramNotFound`](crate::error::StepError::ProgramNotFound));
    /// a program that runs and fails is reported through the returned status.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain_command() {
        let spec = CommandSpec::new("genlm").args(["--alphabet-mode", "utf8", "en"]);
        assert_eq!(spec.to_string(), "genlm --alphabet-mode utf8 en");
    }

    #[test]
    fn test_display_quotes_special_words() {
        let spec = CommandSpec::new("echo")
            .arg("two words")
            .arg("")
            .arg("it's");
        assert_eq!(spec.to_string(), "echo 'two words' '' 'it'\\''s'");
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["apt-get".to_string(), "update".to_string()];
        let spec = CommandSpec::from_argv(&argv).unwrap();
        assert_eq!(spec.program, "apt-get");
        assert_eq!(spec.args, vec!["update"]);
        assert!(CommandSpec::from_argv(&[]).is_none());
    }

    #[test]
    fn test_status_success() {
        assert!(CommandStatus::SUCCESS.success());
        assert!(!CommandStatus::from_code(2).success());
        assert!(!CommandStatus { code: None }.success());
    }
}
