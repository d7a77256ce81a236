// Configuration loader
// Loads settings from ~/.unmangle/config.toml or the GEMINI_API_KEY variable

use anyhow::{bail, Context, Result};
use std::fs;

use super::settings::Config;

/// Load configuration from the config file or environment
pub fn load_config() -> Result<Config> {
    if let Some(config) = try_load_from_config_file()? {
        return Ok(config);
    }

    // Fall back to environment variable
    if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
        if !api_key.is_empty() {
            return Ok(Config::with_api_key(api_key));
        }
    }

    bail!(
        "No configuration found. Create ~/.unmangle/config.toml:\n\n\
        [oracle]\n\
        api_key = \"your-gemini-api-key\"\n\
        renaming_model = \"gemini-2.0-flash\"\n\
        summary_model = \"gemini-2.0-flash\"\n\n\
        [application]\n\
        descriptive_name_prefix = \"llm_\"\n\n\
        Alternatively, set the environment variable:\n\
        export GEMINI_API_KEY=\"...\""
    );
}

fn try_load_from_config_file() -> Result<Option<Config>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home.join(".unmangle/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read configuration from {}", config_path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(Some(config))
}
