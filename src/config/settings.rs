// Configuration types

use anyhow::{bail, Result};
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub oracle: OracleConfig,

    #[serde(default)]
    pub application: ApplicationConfig,
}

/// Oracle service settings
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub api_key: String,

    /// Model used for renaming passes
    #[serde(default = "default_renaming_model")]
    pub renaming_model: String,

    /// Model used for summary reports
    #[serde(default = "default_summary_model")]
    pub summary_model: String,

    /// API base URL override (proxies, regional endpoints)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Application behavior settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Prefix every accepted descriptive name must carry
    #[serde(default = "default_prefix")]
    pub descriptive_name_prefix: String,

    /// Mirror the oracle's live token stream to the console
    #[serde(default = "default_stream_responses")]
    pub stream_responses: bool,
}

fn default_renaming_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_summary_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_prefix() -> String {
    "llm_".to_string()
}

fn default_stream_responses() -> bool {
    true
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            descriptive_name_prefix: default_prefix(),
            stream_responses: default_stream_responses(),
        }
    }
}

impl Config {
    /// Minimal configuration from just an API key (environment fallback)
    pub fn with_api_key(api_key: String) -> Self {
        Self {
            oracle: OracleConfig {
                api_key,
                renaming_model: default_renaming_model(),
                summary_model: default_summary_model(),
                base_url: None,
            },
            application: ApplicationConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.oracle.api_key.trim().is_empty() {
            bail!("Oracle API key is empty");
        }
        if self.oracle.renaming_model.trim().is_empty() {
            bail!("Renaming model id is empty");
        }
        if self.oracle.summary_model.trim().is_empty() {
            bail!("Summary model id is empty");
        }
        // An empty prefix would make every suggestion look already prefixed
        if self.application.descriptive_name_prefix.is_empty() {
            bail!("Descriptive name prefix must not be empty");
        }
        Ok(())
    }
}
