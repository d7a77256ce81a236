// Oracle abstraction
//
// The pipeline only needs one thing from the language-model service: a full
// completion for a prompt. The trait keeps the convergence loop testable
// with scripted oracles and leaves transport policy (retry, timeout,
// streaming) inside the client implementation.

pub mod gemini;
pub mod retry;

pub use gemini::GeminiClient;

use anyhow::Result;
use async_trait::async_trait;

/// External language-model service supplying descriptive-name suggestions
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Request a completion and return the full response text.
    ///
    /// `echo_stream` asks the client to mirror the live token stream to the
    /// console while it accumulates; the returned string is always the
    /// complete text either way.
    async fn complete(&self, prompt: &str, model: &str, echo_stream: bool) -> Result<String>;
}
