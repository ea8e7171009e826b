//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use alongtrack_core::config::{CliConfigOverrides, LayeredConfig};

/// Configuration file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "alongtrack.toml";

/// Layer defaults, a config file, the environment and CLI overrides
pub fn load_config(config_file: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file_path(config_file) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}

/// Explicit file if given, otherwise the local file when it exists
fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG_FILE);
            local.exists().then_some(local)
        }
    }
}
