//! Configuration module for lmprep core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    AlphabetMode, GenlmOptions, GroupDirSource, InstallConfig, LanguageCode, ProvisionConfig,
    DEFAULT_GROUP_DIR_ENV, DEFAULT_LANGUAGE, DEFAULT_MODELS_SUBDIR, DEFAULT_PACKAGES,
    DEFAULT_PROGRAM,
};
