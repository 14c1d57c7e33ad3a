//! CLI configuration loader for lmprep
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./lmprep.json or ./.lmprep/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/lmprep/config.json or ~/.config/lmprep/config.json
//! 4. Built-in defaults (no files)

use anyhow::{anyhow, Context, Result};
use lmprep_core::config::{
    AlphabetMode, GenlmOptions, GroupDirSource, InstallConfig, LanguageCode, ProvisionConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw configuration file format; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Group base directory: "env:VAR_NAME" or a path
    pub group_dir: Option<String>,
    pub models_subdir: Option<String>,
    pub strict_group_dir: Option<bool>,
    pub program: Option<String>,
    pub language: Option<String>,
    pub alphabet_mode: Option<AlphabetMode>,
    pub echo_commands: Option<bool>,
    pub genlm: GenlmOptions,
    pub install: RawInstallConfig,
}

/// Package installation section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawInstallConfig {
    pub enabled: Option<bool>,
    /// An empty list disables the update command
    pub update_command: Option<Vec<String>>,
    pub install_command: Option<Vec<String>>,
    /// Replaces the default package list
    pub packages: Option<Vec<String>>,
    /// Appended to the package list
    pub extra_packages: Vec<String>,
}

/// CLI configuration loader
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    group_dir_override: Option<GroupDirSource>,
    models_subdir_override: Option<String>,
    program_override: Option<String>,
    language_override: Option<String>,
    alphabet_mode_override: Option<AlphabetMode>,
    genlm_overrides: GenlmOptions,
    extra_packages: Vec<String>,
    skip_install: bool,
    skip_update: bool,
    strict: bool,
    quiet: bool,
    dry_run: bool,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Take the group directory from a literal path
    pub fn with_group_dir(mut self, path: String) -> Self {
        self.group_dir_override = Some(GroupDirSource::Path(path));
        self
    }

    /// Take the group directory from another environment variable
    pub fn with_group_dir_env(mut self, var: String) -> Self {
        self.group_dir_override = Some(GroupDirSource::Env(var));
        self
    }

    pub fn with_models_subdir_override(mut self, subdir: String) -> Self {
        self.models_subdir_override = Some(subdir);
        self
    }

    pub fn with_program_override(mut self, program: String) -> Self {
        self.program_override = Some(program);
        self
    }

    pub fn with_language_override(mut self, language: String) -> Self {
        self.language_override = Some(language);
        self
    }

    pub fn with_alphabet_mode_override(mut self, mode: AlphabetMode) -> Self {
        self.alphabet_mode_override = Some(mode);
        self
    }

    /// Generator flags set on the command line win over the file's
    pub fn with_genlm_overrides(mut self, overrides: GenlmOptions) -> Self {
        self.genlm_overrides = overrides;
        self
    }

    pub fn with_extra_packages(mut self, packages: Vec<String>) -> Self {
        self.extra_packages = packages;
        self
    }

    pub fn with_skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    pub fn with_skip_update(mut self, skip: bool) -> Self {
        self.skip_update = skip;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ProvisionConfig> {
        // Step 1: Find and load base configuration
        let raw = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides and resolve
        self.resolve_config(raw)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        let cwd = std::env::current_dir()?;
        let mut candidates = vec![
            cwd.join("lmprep.json"),
            cwd.join(".lmprep").join("config.json"),
        ];
        if let Some(config_dir) = self.get_xdg_config_dir() {
            candidates.push(config_dir.join("lmprep").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                info!("Using config file {}", candidate.display());
                return self.load_file(&candidate).await;
            }
        }

        debug!("No config file found, using built-in defaults");
        Ok(RawConfig::default())
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
            _ => dirs::home_dir().map(|home| home.join(".config")),
        }
    }

    /// Merge file values, defaults and flag overrides into a validated config
    fn resolve_config(&self, raw: RawConfig) -> Result<ProvisionConfig> {
        let defaults = ProvisionConfig::default();

        let group_dir = match &self.group_dir_override {
            Some(source) => source.clone(),
            None => raw
                .group_dir
                .as_deref()
                .map(GroupDirSource::parse)
                .unwrap_or(defaults.group_dir),
        };

        let language = match self.language_override.as_ref().or(raw.language.as_ref()) {
            Some(code) => LanguageCode::new(code.clone())?,
            None => defaults.language,
        };

        let config = ProvisionConfig {
            group_dir,
            models_subdir: self
                .models_subdir_override
                .clone()
                .or(raw.models_subdir)
                .unwrap_or(defaults.models_subdir),
            strict_group_dir: self.strict || raw.strict_group_dir.unwrap_or(false),
            program: self
                .program_override
                .clone()
                .or(raw.program)
                .map(|program| shellexpand::tilde(&program).into_owned())
                .unwrap_or(defaults.program),
            language,
            alphabet_mode: self
                .alphabet_mode_override
                .or(raw.alphabet_mode)
                .unwrap_or(defaults.alphabet_mode),
            genlm: merge_genlm(raw.genlm, &self.genlm_overrides),
            install: self.resolve_install(raw.install, defaults.install),
            echo_commands: !self.quiet && raw.echo_commands.unwrap_or(true),
            dry_run: self.dry_run,
        };

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(config)
    }

    fn resolve_install(&self, raw: RawInstallConfig, defaults: InstallConfig) -> InstallConfig {
        let update_command = if self.skip_update {
            None
        } else {
            match raw.update_command {
                Some(cmd) if cmd.is_empty() => None,
                Some(cmd) => Some(cmd),
                None => defaults.update_command,
            }
        };

        let mut packages = raw.packages.unwrap_or(defaults.packages);
        packages.extend(raw.extra_packages);
        packages.extend(self.extra_packages.iter().cloned());

        InstallConfig {
            enabled: !self.skip_install && raw.enabled.unwrap_or(defaults.enabled),
            update_command,
            install_command: raw.install_command.unwrap_or(defaults.install_command),
            packages,
        }
    }
}

fn merge_genlm(file: GenlmOptions, flags: &GenlmOptions) -> GenlmOptions {
    GenlmOptions {
        workers: flags.workers.or(file.workers),
        block_size: flags.block_size.clone().or(file.block_size),
        prune_factor: flags.prune_factor.or(file.prune_factor),
        vocabulary_size: flags.vocabulary_size.or(file.vocabulary_size),
        alpha: flags.alpha.or(file.alpha),
        beta: flags.beta.or(file.beta),
        force_download: flags.force_download || file.force_download,
        force_generate: flags.force_generate || file.force_generate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            "lmprep.json",
            r#"{
                "group_dir": "/srv/ml",
                "language": "de",
                "alphabet_mode": "specific",
                "genlm": { "workers": 8 },
                "install": { "enabled": false }
            }"#,
        );

        let config = CliConfigLoader::new()
            .with_config_override(path)
            .load()
            .await
            .unwrap();

        assert_eq!(config.group_dir, GroupDirSource::Path("/srv/ml".to_string()));
        assert_eq!(config.language.as_str(), "de");
        assert_eq!(config.alphabet_mode, AlphabetMode::Specific);
        assert_eq!(config.genlm.workers, Some(8));
        assert!(!config.install.enabled);
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let temp = TempDir::new().unwrap();
        write_config(&temp, "config.json", r#"{ "group_dir": "env:SHARED" }"#);

        let config = CliConfigLoader::new()
            .with_config_override(temp.path().to_path_buf())
            .load()
            .await
            .unwrap();

        assert_eq!(config.group_dir, GroupDirSource::Env("SHARED".to_string()));
    }

    #[tokio::test]
    async fn test_flags_override_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            "lmprep.json",
            r#"{ "language": "de", "program": "/opt/genlm", "genlm": { "workers": 8 } }"#,
        );

        let config = CliConfigLoader::new()
            .with_config_override(path)
            .with_language_override("pt".to_string())
            .with_program_override("genlm-dev".to_string())
            .with_genlm_overrides(GenlmOptions {
                workers: Some(2),
                ..GenlmOptions::default()
            })
            .with_group_dir("/data".to_string())
            .with_quiet(true)
            .load()
            .await
            .unwrap();

        assert_eq!(config.language.as_str(), "pt");
        assert_eq!(config.program, "genlm-dev");
        assert_eq!(config.genlm.workers, Some(2));
        assert_eq!(config.group_dir, GroupDirSource::Path("/data".to_string()));
        assert!(!config.echo_commands);
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "lmprep.json", r#"{ "grup_dir": "/x" }"#);

        let result = CliConfigLoader::new().with_config_override(path).load().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_misspelled_generator_option_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "lmprep.json", r#"{ "genlm": { "worker": 4 } }"#);

        let result = CliConfigLoader::new().with_config_override(path).load().await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("worker"));
    }

    #[tokio::test]
    async fn test_missing_override_path() {
        let temp = TempDir::new().unwrap();
        let result = CliConfigLoader::new()
            .with_config_override(temp.path().join("absent.json"))
            .load()
            .await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("does not exist"));
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = CliConfigLoader::new()
            .resolve_config(RawConfig::default())
            .unwrap();

        assert_eq!(config, ProvisionConfig::default());
    }

    #[test]
    fn test_install_resolution() {
        let raw = RawInstallConfig {
            update_command: Some(Vec::new()),
            packages: Some(vec!["cmake".to_string()]),
            extra_packages: vec!["git".to_string()],
            ..RawInstallConfig::default()
        };

        let install = CliConfigLoader::new()
            .with_extra_packages(vec!["wget".to_string()])
            .resolve_install(raw, InstallConfig::default());

        assert!(install.enabled);
        assert_eq!(install.update_command, None);
        assert_eq!(install.packages, vec!["cmake", "git", "wget"]);
    }

    #[test]
    fn test_skip_flags() {
        let install = CliConfigLoader::new()
            .with_skip_install(true)
            .with_skip_update(true)
            .resolve_install(RawInstallConfig::default(), InstallConfig::default());

        assert!(!install.enabled);
        assert_eq!(install.update_command, None);
    }

    #[test]
    fn test_invalid_language_is_rejected() {
        let result = CliConfigLoader::new()
            .with_language_override("English".to_string())
            .resolve_config(RawConfig::default());

        assert!(result.is_err());
    }
}
