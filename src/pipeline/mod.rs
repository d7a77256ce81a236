// Convergence loop
//
// Drives repeated oracle passes against the registry until every member is
// named or progress stops. One pass = snapshot unnamed members, query the
// oracle, repair the response, merge accepted suggestions. A malformed
// response costs one pass, never the run; a transport failure aborts the
// run.

use anyhow::{Context, Result};

use crate::oracle::Oracle;
use crate::prompt::build_renaming_prompt;
use crate::registry::MemberRegistry;
use crate::repair::repair_response;

/// Members the oracle is asked to handle per pass; the recommended pass
/// count rounds the registry size up against this batch size.
const ORACLE_BATCH_SIZE: usize = 80;

/// How a renaming run ended. Both variants are normal completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every registered member received a name
    FullyNamed { total: usize, passes: usize },

    /// The loop exhausted its budget or stopped making progress
    PartiallyNamed {
        named: usize,
        total: usize,
        passes: usize,
    },
}

impl RunOutcome {
    pub fn passes(&self) -> usize {
        match self {
            RunOutcome::FullyNamed { passes, .. } => *passes,
            RunOutcome::PartiallyNamed { passes, .. } => *passes,
        }
    }
}

/// Recommended number of passes for a registry of the given size
pub fn recommended_passes(total_members: usize) -> usize {
    if total_members == 0 {
        return 0;
    }
    usize::max(1, total_members.div_ceil(ORACLE_BATCH_SIZE))
}

/// One renaming run over a single module
pub struct RenamingSession<'a> {
    oracle: &'a dyn Oracle,
    model: String,
    prefix: String,
    persona_instructions: String,
    echo_stream: bool,
}

impl<'a> RenamingSession<'a> {
    pub fn new(
        oracle: &'a dyn Oracle,
        model: impl Into<String>,
        prefix: impl Into<String>,
        persona_instructions: impl Into<String>,
        echo_stream: bool,
    ) -> Self {
        Self {
            oracle,
            model: model.into(),
            prefix: prefix.into(),
            persona_instructions: persona_instructions.into(),
            echo_stream,
        }
    }

    /// Run up to `max_passes` oracle passes against the registry.
    ///
    /// Stops early when all members are named, or when a pass after the
    /// first produces zero updates. Oracle transport errors propagate and
    /// abort the run; the registry keeps whatever progress was merged.
    pub async fn run(
        &self,
        registry: &mut MemberRegistry,
        decompiled_code: &str,
        max_passes: usize,
    ) -> Result<RunOutcome> {
        let mut passes = 0;

        while passes < max_passes {
            let snapshot = registry.unnamed_snapshot();
            if snapshot.is_empty() {
                tracing::info!("No more unnamed members to process. Skipping oracle call.");
                break;
            }

            tracing::info!(
                pass = passes + 1,
                max_passes,
                remaining = snapshot.len(),
                "Starting renaming pass"
            );

            let enumeration = serde_json::to_string_pretty(&snapshot)
                .context("Failed to serialize unnamed-member snapshot")?;
            let prompt = build_renaming_prompt(
                &self.persona_instructions,
                decompiled_code,
                &enumeration,
                passes,
            );

            let response = self
                .oracle
                .complete(&prompt, &self.model, self.echo_stream)
                .await
                .with_context(|| format!("Oracle call failed on pass {}", passes + 1))?;

            let updated = match repair_response(&response) {
                Some(payload) => registry.merge_oracle_updates(&payload, &self.prefix),
                None => {
                    tracing::warn!(
                        pass = passes + 1,
                        "Unable to repair a JSON payload from the oracle response; \
                         pass contributes zero updates"
                    );
                    0
                }
            };

            passes += 1;
            tracing::info!(
                pass = passes,
                updated,
                named = registry.named_count(),
                total = registry.total_count(),
                "Pass complete"
            );

            if registry.named_count() == registry.total_count() {
                tracing::info!("All identified members have been given descriptive names.");
                break;
            }
            if updated == 0 && passes > 1 {
                tracing::info!("No new mappings received in this pass. Stopping iteration.");
                break;
            }
        }

        let named = registry.named_count();
        let total = registry.total_count();
        let outcome = if named == total {
            RunOutcome::FullyNamed { total, passes }
        } else {
            RunOutcome::PartiallyNamed {
                named,
                total,
                passes,
            }
        };
        Ok(outcome)
    }
}
