// Configuration loader
// Loads settings from ~/.infogen/config.toml (optional) plus environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::CONFIG_DIR_NAME;
use super::settings::Config;

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "INFOGEN_DATA_DIR";

/// Default location of the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Load configuration from the default path, falling back to defaults when absent.
pub fn load_config() -> Result<Config> {
    load(None)
}

/// Load a specific config file.
pub fn load_config_from(path: &Path) -> Result<Config> {
    load(Some(path))
}

/// Load from `path` (or the default location when `None`), apply environment
/// overrides, then validate.
pub fn load(path: Option<&Path>) -> Result<Config> {
    load_with(path, |name| std::env::var(name).ok())
}

fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => Config::default(),
        },
    };

    let config = apply_env_overrides(config, lookup)?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir.trim());
    }
    Ok(config)
}
