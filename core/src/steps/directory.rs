//! Models directory creation

use super::{PlannedAction, ProvisionStep, StepOutcome};
use crate::error::{Result, StepError};
use crate::process::{shell_quote, CommandRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create `path` and any missing parents.
///
/// Returns `false` when the directory already existed.
pub async fn ensure_models_dir(path: &Path) -> Result<bool> {
    if tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        debug!("{} already exists", path.display());
        return Ok(false);
    }

    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StepError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(true)
}

/// Ensures the models directory exists
#[derive(Debug, Clone)]
pub struct DirectoryStep {
    path: PathBuf,
    echo: bool,
}

impl DirectoryStep {
    pub fn new(path: PathBuf, echo: bool) -> Self {
        Self { path, echo }
    }
}

#[async_trait]
impl ProvisionStep for DirectoryStep {
    fn name(&self) -> &str {
        "directory"
    }

    fn plan(&self) -> Vec<PlannedAction> {
        vec![PlannedAction::CreateDir(self.path.clone())]
    }

    async fn execute(&self, _runner: &dyn CommandRunner) -> Result<StepOutcome> {
        if self.echo {
            eprintln!("+ mkdir -p {}", shell_quote(&self.path.to_string_lossy()));
        }

        if ensure_models_dir(&self.path).await? {
            info!("Created models directory {}", self.path.display());
            Ok(StepOutcome::Completed)
        } else {
            Ok(StepOutcome::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RecordingRunner;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("x").join("language-models");

        let created = ensure_models_dir(&target).await.unwrap();

        assert!(created);
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_existing_directory_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("language-models");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("lm.binary"), b"model").unwrap();

        let step = DirectoryStep::new(target.clone(), false);
        let outcome = step.execute(&RecordingRunner::new()).await.unwrap();

        assert_eq!(outcome, StepOutcome::Unchanged);
        assert_eq!(std::fs::read(target.join("lm.binary")).unwrap(), b"model");
    }

    #[tokio::test]
    async fn test_file_in_the_way_is_an_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("language-models");
        std::fs::write(&target, b"not a directory").unwrap();

        let err = ensure_models_dir(&target).await.unwrap_err();

        assert!(err.to_string().contains("Failed to create directory"));
    }

    #[test]
    fn test_plan() {
        let step = DirectoryStep::new(PathBuf::from("/tmp/x/language-models"), true);
        let plan: Vec<String> = step.plan().iter().map(|a| a.to_string()).collect();
        assert_eq!(plan, vec!["mkdir -p /tmp/x/language-models"]);
    }

    #[test]
    fn test_plan_quotes_paths_with_spaces() {
        let step = DirectoryStep::new(PathBuf::from("/tmp/my models/language-models"), true);
        let plan: Vec<String> = step.plan().iter().map(|a| a.to_string()).collect();
        assert_eq!(plan, vec!["mkdir -p '/tmp/my models/language-models'"]);
    }
}
