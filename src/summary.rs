// Module summary reports
//
// After renaming, the oracle can write an analyst report over the module's
// decompiled text under a chosen summary persona. The report is free text by
// contract; no repair step applies here.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Persona;
use crate::oracle::Oracle;

pub struct SummaryGenerator<'a> {
    oracle: &'a dyn Oracle,
    model: String,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(oracle: &'a dyn Oracle, model: &str) -> Self {
        Self {
            oracle,
            model: model.to_string(),
        }
    }

    /// Ask the oracle for a report over the decompiled module text
    pub async fn generate(&self, decompiled_code: &str, persona: &Persona) -> Result<String> {
        let prompt = build_summary_prompt(&persona.instructions, decompiled_code);

        tracing::info!(persona = %persona.name, "Generating module summary report...");

        let report = self
            .oracle
            .complete(&prompt, &self.model, false)
            .await
            .context("Summary generation failed")?;

        if report.trim().is_empty() {
            anyhow::bail!("Oracle returned an empty summary report");
        }

        Ok(report)
    }
}

fn build_summary_prompt(instructions: &str, decompiled_code: &str) -> String {
    format!(
        "{}\n\nDecompiled code:\n```csharp\n{}\n```\n",
        instructions, decompiled_code
    )
}

/// Where the report is saved: next to the module, stamped with the persona
pub fn summary_file_path(module_path: &Path, persona_name: &str) -> PathBuf {
    let stem = module_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    let file_name = format!("{}_{}_summary.txt", stem, persona_name.replace(' ', "_"));

    match module_path.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
