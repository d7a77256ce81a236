// Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "unmangle",
    version,
    about = "Rename obfuscated .NET module symbols with an LLM oracle"
)]
pub struct Args {
    /// Path to the module dump produced by the disassembler toolchain
    pub module_dump: PathBuf,

    /// Prefix for descriptive names (overrides configuration)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Maximum oracle passes; defaults to the recommended count for the
    /// module's size
    #[arg(long)]
    pub max_passes: Option<usize>,

    /// Renaming persona: standard, network, crypto, persistence
    #[arg(long, default_value = "standard")]
    pub persona: String,

    /// Generate an analyst summary report after renaming
    #[arg(long)]
    pub summary: bool,

    /// Summary persona: general, soc-analyst, incident-response,
    /// threat-hunter, detection-engineer, reverse-engineer
    #[arg(long, default_value = "general")]
    pub summary_persona: String,

    /// Suppress the live oracle stream echo
    #[arg(long)]
    pub quiet: bool,
}
