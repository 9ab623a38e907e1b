//! Configuration loading.
//!
//! Resolves the configuration path, creates a commented default file when
//! none exists, and parses and validates the result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Config;
use super::builder::create_default_config;
use super::validation::validate_config;

/// The configuration file path: `<dir>/sunphases.toml` for an explicit
/// directory, otherwise `~/.config/sunphases/sunphases.toml`.
pub fn get_config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    let base = match config_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::config_dir()
            .context("could not determine user configuration directory")?
            .join("sunphases"),
    };
    Ok(base.join("sunphases.toml"))
}

/// Load configuration, creating a default file when none exists.
pub fn load(config_dir: Option<&Path>) -> Result<Config> {
    let path = get_config_path(config_dir)?;
    if !path.exists() {
        create_default_config(&path)?;
        log_block_start!("Created default configuration at {}", path.display());
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}
