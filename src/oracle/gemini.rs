// Google Gemini oracle client
//
// Uses the streaming endpoint and accumulates the full completion; renaming
// prompts routinely produce long payloads and the stream lets the analyst
// watch the oracle work. The SSE protocol sends `data: {...}` lines, each a
// response chunk with candidate parts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use crossterm::style::Stylize;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

use super::retry::with_retry;
use super::Oracle;

const REQUEST_TIMEOUT_SECS: u64 = 300;
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (tests, proxies, regional endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn complete_once(&self, prompt: &str, model: &str, echo_stream: bool) -> Result<String> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?key={}&alt=sse",
            self.base_url, model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::info!(model, "Sending data to oracle model...");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        if echo_stream {
            println!();
            println!("{}", "--- Live oracle response stream ---".dark_cyan());
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut full_completion = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.context("Failed to read Gemini response stream")?;
            buffer.extend_from_slice(&bytes);

            // SSE format: "data: {...}\n"
            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let line = String::from_utf8_lossy(&line_bytes);

                let Some(json_str) = line.strip_prefix("data: ") else {
                    continue;
                };
                let json_str = json_str.trim();
                if json_str == "[DONE]" {
                    continue;
                }

                if let Ok(stream_response) = serde_json::from_str::<GeminiResponse>(json_str) {
                    if let Some(candidate) = stream_response.candidates.into_iter().next() {
                        for part in candidate.content.parts {
                            if part.text.is_empty() {
                                continue;
                            }
                            if echo_stream {
                                print!("{}", part.text);
                                let _ = std::io::stdout().flush();
                            }
                            full_completion.push_str(&part.text);
                        }
                    }
                }
            }
        }

        if echo_stream {
            println!();
            println!("{}", "--- End of stream ---".dark_cyan());
            println!();
        }

        tracing::debug!(
            model,
            length = full_completion.len(),
            "Received oracle response"
        );

        Ok(full_completion)
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn complete(&self, prompt: &str, model: &str, echo_stream: bool) -> Result<String> {
        with_retry(|| self.complete_once(prompt, model, echo_stream)).await
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default = "empty_content")]
    content: GeminiContent,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

fn empty_content() -> GeminiContent {
    GeminiContent {
        role: String::new(),
        parts: Vec::new(),
    }
}
