// Unmangle - LLM-assisted symbol renamer for obfuscated .NET modules
// Main entry point

use anyhow::Result;
use clap::Parser;

use unmangle::app;
use unmangle::cli::Args;
use unmangle::config::load_config;
use unmangle::oracle::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Load configuration
    let config = load_config()?;

    // Create the oracle client
    let mut oracle = GeminiClient::new(config.oracle.api_key.clone())?;
    if let Some(base_url) = &config.oracle.base_url {
        oracle = oracle.with_base_url(base_url.clone());
    }

    app::run(args, config, &oracle).await
}
