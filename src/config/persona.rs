// Persona system for steering the oracle
//
// Two persona families: renaming personas bias which parts of the module the
// oracle labels first; summary personas shape the post-rename analyst
// report. Persona text is configuration data, not pipeline contract.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A persona defines how the oracle should approach the module
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    /// Persona name shown to the user
    pub name: String,

    /// One-line description
    pub description: String,

    /// System instruction prepended to the prompt
    pub instructions: String,
}

impl Persona {
    /// Load a persona from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read persona from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse persona TOML")
    }

    /// Load a built-in renaming persona by key
    pub fn renaming_builtin(key: &str) -> Result<Self> {
        let template = match key {
            "standard" => include_str!("../../data/personas/renaming/standard.toml"),
            "network" => include_str!("../../data/personas/renaming/network.toml"),
            "crypto" => include_str!("../../data/personas/renaming/crypto.toml"),
            "persistence" => include_str!("../../data/personas/renaming/persistence.toml"),
            _ => anyhow::bail!("Unknown renaming persona: {}", key),
        };

        toml::from_str(template)
            .with_context(|| format!("Failed to parse builtin renaming persona: {}", key))
    }

    /// Load a built-in summary persona by key
    pub fn summary_builtin(key: &str) -> Result<Self> {
        let template = match key {
            "general" => include_str!("../../data/personas/summary/general.toml"),
            "soc-analyst" => include_str!("../../data/personas/summary/soc_analyst.toml"),
            "incident-response" => {
                include_str!("../../data/personas/summary/incident_response.toml")
            }
            "threat-hunter" => include_str!("../../data/personas/summary/threat_hunter.toml"),
            "detection-engineer" => {
                include_str!("../../data/personas/summary/detection_engineer.toml")
            }
            "reverse-engineer" => {
                include_str!("../../data/personas/summary/reverse_engineer.toml")
            }
            _ => anyhow::bail!("Unknown summary persona: {}", key),
        };

        toml::from_str(template)
            .with_context(|| format!("Failed to parse builtin summary persona: {}", key))
    }

    /// List built-in renaming persona keys
    pub fn list_renaming() -> Vec<&'static str> {
        vec!["standard", "network", "crypto", "persistence"]
    }

    /// List built-in summary persona keys
    pub fn list_summary() -> Vec<&'static str> {
        vec![
            "general",
            "soc-analyst",
            "incident-response",
            "threat-hunter",
            "detection-engineer",
            "reverse-engineer",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_renaming_personas() {
        for key in Persona::list_renaming() {
            let persona = Persona::renaming_builtin(key);
            assert!(persona.is_ok(), "Failed to load renaming persona: {}", key);
            assert!(!persona.unwrap().instructions.is_empty());
        }
    }

    #[test]
    fn test_builtin_summary_personas() {
        for key in Persona::list_summary() {
            let persona = Persona::summary_builtin(key);
            assert!(persona.is_ok(), "Failed to load summary persona: {}", key);
            assert!(!persona.unwrap().instructions.is_empty());
        }
    }

    #[test]
    fn test_unknown_persona_is_an_error() {
        assert!(Persona::renaming_builtin("nope").is_err());
        assert!(Persona::summary_builtin("nope").is_err());
    }
}
