// Application orchestration
//
// The full run over one module: load the dump, populate the registry, drive
// the convergence loop, apply renames, write the renamed dump, and
// optionally generate a summary report.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::fs;

use crate::apply::apply_renames;
use crate::cli::{Args, ConsoleSink};
use crate::config::{Config, Persona};
use crate::oracle::Oracle;
use crate::pipeline::{recommended_passes, RenamingSession, RunOutcome};
use crate::registry::MemberRegistry;
use crate::summary::{summary_file_path, SummaryGenerator};
use crate::symbols::ProcessedModule;

pub async fn run(args: Args, config: Config, oracle: &dyn Oracle) -> Result<()> {
    let persona = Persona::renaming_builtin(&args.persona).with_context(|| {
        format!(
            "Unknown renaming persona '{}'. Available: {}",
            args.persona,
            Persona::list_renaming().join(", ")
        )
    })?;

    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| config.application.descriptive_name_prefix.clone());
    let echo_stream = config.application.stream_responses && !args.quiet;

    let mut module = ProcessedModule::load(&args.module_dump)?;

    let mut registry = MemberRegistry::new();
    registry.set_sink(Box::new(ConsoleSink));
    registry.populate(&module.dump.symbols);

    println!(
        "Identified {} distinct types (classes, structs, enums, interfaces) in the module.",
        module.dump.symbols.types.len()
    );
    println!(
        "Total identified members (including namespaces, methods, fields): {} elements.",
        registry.total_count()
    );

    let max_passes = args
        .max_passes
        .unwrap_or_else(|| recommended_passes(registry.total_count()));

    let session = RenamingSession::new(
        oracle,
        config.oracle.renaming_model.as_str(),
        prefix.as_str(),
        persona.instructions.as_str(),
        echo_stream,
    );
    let outcome = session
        .run(&mut registry, &module.dump.decompiled_code, max_passes)
        .await?;

    match outcome {
        RunOutcome::FullyNamed { .. } => {
            println!("\n--- Renaming process complete (full renaming) ---");
            println!("{}", "All identifiable members have been renamed!".green());
        }
        RunOutcome::PartiallyNamed { named, total, .. } => {
            println!("\n--- Renaming process completed (partial renaming) ---");
            println!(
                "{}",
                format!(
                    "Warning: not all members could be renamed. {} out of {} members remain with obfuscated names.",
                    total - named,
                    total
                )
                .yellow()
            );
            println!(
                "{}",
                "Consider running the tool again with more passes or a different persona."
                    .yellow()
            );
        }
    }

    apply_renames(&mut module.dump.symbols, &registry, &prefix);

    let output_path = module.save_renamed(outcome.passes())?;
    println!("\nRenamed module dump saved as {}", output_path.display());

    if args.summary {
        let summary_persona = Persona::summary_builtin(&args.summary_persona).with_context(|| {
            format!(
                "Unknown summary persona '{}'. Available: {}",
                args.summary_persona,
                Persona::list_summary().join(", ")
            )
        })?;

        let generator = SummaryGenerator::new(oracle, &config.oracle.summary_model);
        let report = generator
            .generate(&module.dump.decompiled_code, &summary_persona)
            .await?;

        println!();
        println!(
            "--- [{}] Module summary report ---",
            summary_persona.name.as_str().green()
        );
        println!("{}", report);

        let report_path = summary_file_path(&args.module_dump, &summary_persona.name);
        fs::write(&report_path, &report)
            .with_context(|| format!("Failed to write summary to {}", report_path.display()))?;
        println!("\nSummary report saved to: {}", report_path.display());
    }

    Ok(())
}
