//! Configuration discovery and flag merging

pub mod loader;

pub use loader::CliConfigLoader;
