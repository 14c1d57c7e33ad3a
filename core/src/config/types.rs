//! Configuration types for lmprep core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default environment variable holding the group base directory
pub const DEFAULT_GROUP_DIR_ENV: &str = "ML_GROUP_DIR";

/// Default directory name for models beneath the group directory
pub const DEFAULT_MODELS_SUBDIR: &str = "language-models";

/// Default generator program
pub const DEFAULT_PROGRAM: &str = "genlm";

/// Default language to generate a model for
pub const DEFAULT_LANGUAGE: &str = "en";

/// Packages needed to build and run the KenLM toolchain behind genlm
pub const DEFAULT_PACKAGES: &[&str] = &[
    "build-essential",
    "cmake",
    "libboost-all-dev",
    "zlib1g-dev",
    "libbz2-dev",
    "liblzma-dev",
];

/// Alphabet selection passed to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetMode {
    /// Decide from the vocabulary whether the model is character based
    Auto,
    /// Every UTF-8 byte is a symbol
    #[default]
    Utf8,
    /// Use the language-specific alphabet
    Specific,
}

impl AlphabetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlphabetMode::Auto => "auto",
            AlphabetMode::Utf8 => "utf8",
            AlphabetMode::Specific => "specific",
        }
    }
}

impl fmt::Display for AlphabetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlphabetMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(AlphabetMode::Auto),
            "utf8" => Ok(AlphabetMode::Utf8),
            "specific" => Ok(AlphabetMode::Specific),
            other => Err(ConfigError::InvalidValue {
                field: "alphabet_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Lowercase language tag such as `en`, `de` or `pt`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        let code = code.into();
        let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_lowercase());
        if !valid {
            return Err(ConfigError::InvalidValue {
                field: "language".to_string(),
                value: code,
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = ConfigError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Where the group base directory comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDirSource {
    /// Read from the named environment variable at resolution time
    Env(String),
    /// A literal path; a leading `~` is expanded
    Path(String),
}

impl GroupDirSource {
    /// Parse the config-file form: `env:VAR` or a path
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix("env:") {
            Some(var) => GroupDirSource::Env(var.to_string()),
            None => GroupDirSource::Path(value.to_string()),
        }
    }
}

impl Default for GroupDirSource {
    fn default() -> Self {
        GroupDirSource::Env(DEFAULT_GROUP_DIR_ENV.to_string())
    }
}

/// Optional tuning flags forwarded to the generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenlmOptions {
    /// Number of preparation and counting workers
    pub workers: Option<usize>,
    /// Maximum block size read per worker, e.g. `100M`
    pub block_size: Option<String>,
    /// Multiple of the vocabulary size kept by each aggregator
    pub prune_factor: Option<usize>,
    /// Final number of words in the vocabulary
    pub vocabulary_size: Option<usize>,
    /// Override for the language-specific alpha parameter
    pub alpha: Option<f64>,
    /// Override for the language-specific beta parameter
    pub beta: Option<f64>,
    #[serde(default)]
    pub force_download: bool,
    #[serde(default)]
    pub force_generate: bool,
}

impl GenlmOptions {
    /// Check values the generator would reject
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(invalid("genlm.workers", "0"));
        }
        if self.vocabulary_size == Some(0) {
            return Err(invalid("genlm.vocabulary_size", "0"));
        }
        if self.prune_factor == Some(0) {
            return Err(invalid("genlm.prune_factor", "0"));
        }
        if let Some(block_size) = &self.block_size {
            if !is_file_size(block_size) {
                return Err(invalid("genlm.block_size", block_size));
            }
        }
        Ok(())
    }
}

/// Accepts sizes like `512`, `100M`, `2G` or `64k`
fn is_file_size(value: &str) -> bool {
    let digits = value.trim_end_matches(|c: char| "kKmMgGtT".contains(c));
    let suffix_len = value.len() - digits.len();
    !digits.is_empty() && suffix_len <= 1 && digits.chars().all(|c| c.is_ascii_digit())
}

fn invalid(field: &str, value: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// OS package installation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    pub enabled: bool,
    /// Run before installing, e.g. `apt-get update`
    pub update_command: Option<Vec<String>>,
    /// Packages are appended to this command
    pub install_command: Vec<String>,
    pub packages: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_command: Some(vec!["apt-get".to_string(), "update".to_string()]),
            install_command: vec![
                "apt-get".to_string(),
                "install".to_string(),
                "-y".to_string(),
            ],
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl InstallConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.install_command.is_empty() {
            return Err(ConfigError::EmptyCommand {
                step: "install".to_string(),
            }
            .into());
        }
        if matches!(&self.update_command, Some(cmd) if cmd.is_empty()) {
            return Err(ConfigError::EmptyCommand {
                step: "update".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Fully resolved provisioning configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    pub group_dir: GroupDirSource,
    pub models_subdir: String,
    /// Fail instead of degrading to `/language-models` when the group dir is unset
    pub strict_group_dir: bool,
    pub program: String,
    pub language: LanguageCode,
    pub alphabet_mode: AlphabetMode,
    pub genlm: GenlmOptions,
    pub install: InstallConfig,
    /// Echo each command before it runs
    pub echo_commands: bool,
    pub dry_run: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            group_dir: GroupDirSource::default(),
            models_subdir: DEFAULT_MODELS_SUBDIR.to_string(),
            strict_group_dir: false,
            program: DEFAULT_PROGRAM.to_string(),
            language: LanguageCode::default(),
            alphabet_mode: AlphabetMode::default(),
            genlm: GenlmOptions::default(),
            install: InstallConfig::default(),
            echo_commands: true,
            dry_run: false,
        }
    }
}

impl ProvisionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::EmptyCommand {
                step: "generate".to_string(),
            }
            .into());
        }
        if self.models_subdir.is_empty() || self.models_subdir.contains('/') {
            return Err(invalid("models_subdir", &self.models_subdir));
        }
        self.genlm.validate()?;
        self.install.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_mode_parsing() {
        assert_eq!("utf8".parse::<AlphabetMode>().unwrap(), AlphabetMode::Utf8);
        assert_eq!(
            "specific".parse::<AlphabetMode>().unwrap(),
            AlphabetMode::Specific
        );
        assert!("ascii".parse::<AlphabetMode>().is_err());
        assert_eq!(AlphabetMode::default().as_str(), "utf8");
    }

    #[test]
    fn test_language_code_validation() {
        assert_eq!(LanguageCode::new("en").unwrap().as_str(), "en");
        assert!(LanguageCode::new("deu").is_ok());
        assert!(LanguageCode::new("EN").is_err());
        assert!(LanguageCode::new("e").is_err());
        assert!(LanguageCode::new("en-us").is_err());
    }

    #[test]
    fn test_language_code_deserialize_rejects_invalid() {
        let parsed: std::result::Result<LanguageCode, _> = serde_json::from_str("\"pt\"");
        assert_eq!(parsed.unwrap().as_str(), "pt");
        let parsed: std::result::Result<LanguageCode, _> = serde_json::from_str("\"P1\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_genlm_options_reject_unknown_keys() {
        let parsed: std::result::Result<GenlmOptions, _> =
            serde_json::from_str(r#"{ "workers": 4 }"#);
        assert_eq!(parsed.unwrap().workers, Some(4));

        let err = serde_json::from_str::<GenlmOptions>(r#"{ "worker": 4 }"#).unwrap_err();
        assert!(err.to_string().contains("worker"));
    }

    #[test]
    fn test_group_dir_source_parse() {
        assert_eq!(
            GroupDirSource::parse("env:SHARED"),
            GroupDirSource::Env("SHARED".to_string())
        );
        assert_eq!(
            GroupDirSource::parse("~/models"),
            GroupDirSource::Path("~/models".to_string())
        );
    }

    #[test]
    fn test_block_size_validation() {
        assert!(is_file_size("100M"));
        assert!(is_file_size("512"));
        assert!(!is_file_size("M"));
        assert!(!is_file_size("10MB"));
        assert!(!is_file_size("1.5G"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ProvisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.program, "genlm");
        assert_eq!(config.language.as_str(), "en");
        assert!(config.install.enabled);
    }

    #[test]
    fn test_invalid_config_values() {
        let mut config = ProvisionConfig::default();
        config.genlm.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = ProvisionConfig::default();
        config.install.install_command.clear();
        assert!(config.validate().is_err());

        config.install.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = ProvisionConfig::default();
        config.models_subdir = "a/b".to_string();
        assert!(config.validate().is_err());
    }
}
