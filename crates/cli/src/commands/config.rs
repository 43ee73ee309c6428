use std::path::Path;

use anyhow::{Context, Result};
use decomprove_core::ImproveConfig;

/// Load the effective configuration (file, then environment overrides).
pub fn load_config(path: Option<&Path>) -> Result<ImproveConfig> {
    ImproveConfig::load(path).context("Failed to load configuration")
}

/// Print the effective configuration with the API key masked.
pub fn show_config_command(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let json = serde_json::to_string_pretty(&config.redacted())
        .context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}
