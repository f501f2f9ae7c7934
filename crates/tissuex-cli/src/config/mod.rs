//! Configuration loading for tissuex.
//! Reads the file named by `--config`, else the TISSUEX_CONFIG env var,
//! else tissuex.toml from the current directory, else built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tissuex_common::ClassifierConfig;

pub const CONFIG_ENV: &str = "TISSUEX_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tissuex.toml";

mod tests;

/// Where the configuration should come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Named explicitly (flag or env var); must exist.
    Required(PathBuf),
    /// The conventional file, used only if present.
    Optional(PathBuf),
}

pub fn resolve_source(explicit: Option<&Path>, env_value: Option<String>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Required(path.to_path_buf());
    }
    match env_value {
        Some(path) if !path.trim().is_empty() => ConfigSource::Required(PathBuf::from(path)),
        _ => ConfigSource::Optional(PathBuf::from(DEFAULT_CONFIG_FILE)),
    }
}

pub fn load_from(source: &ConfigSource) -> anyhow::Result<ClassifierConfig> {
    match source {
        ConfigSource::Required(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            ClassifierConfig::from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        ConfigSource::Optional(path) if path.exists() => ClassifierConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        ConfigSource::Optional(_) => Ok(ClassifierConfig::default()),
    }
}

pub fn load(explicit: Option<&Path>) -> anyhow::Result<ClassifierConfig> {
    let source = resolve_source(explicit, std::env::var(CONFIG_ENV).ok());
    tracing::debug!(?source, "resolving configuration");
    load_from(&source)
}
