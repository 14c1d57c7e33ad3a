//! Group and models directory derivation

use crate::config::GroupDirSource;
use crate::error::{ConfigError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The two paths a provisioning run works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPaths {
    /// `None` when the group directory source resolved to nothing
    pub group_dir: Option<PathBuf>,
    pub models_dir: PathBuf,
}

impl ModelPaths {
    /// Join `subdir` onto the group directory with [`Path::join`].
    ///
    /// A trailing separator on the group directory is not doubled. An absent
    /// group directory degrades to the filesystem root, so the models
    /// directory becomes `/<subdir>`.
    pub fn derive(group_dir: Option<&Path>, subdir: &str) -> Self {
        let models_dir = match group_dir {
            Some(group) => group.join(subdir),
            None => Path::new("/").join(subdir),
        };
        Self {
            group_dir: group_dir.map(Path::to_path_buf),
            models_dir,
        }
    }

    /// Resolve against the process environment
    pub fn resolve(source: &GroupDirSource, subdir: &str, strict: bool) -> Result<Self> {
        Self::resolve_with(source, subdir, strict, |var| std::env::var(var).ok())
    }

    /// Resolve using `lookup` for environment variables
    pub fn resolve_with<F>(
        source: &GroupDirSource,
        subdir: &str,
        strict: bool,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let group_dir = match source {
            GroupDirSource::Env(var) => match lookup(var).filter(|v| !v.is_empty()) {
                Some(value) => Some(PathBuf::from(value)),
                None if strict => {
                    return Err(ConfigError::MissingGroupDir { var: var.clone() }.into());
                }
                None => {
                    warn!(
                        "{} is not set; models directory falls back to /{}",
                        var, subdir
                    );
                    None
                }
            },
            GroupDirSource::Path(path) => {
                Some(PathBuf::from(shellexpand::tilde(path).into_owned()))
            }
        };

        let paths = Self::derive(group_dir.as_deref(), subdir);
        debug!("Resolved models directory: {}", paths.models_dir.display());
        Ok(paths)
    }
}
