//! Chat-completions client for the fix request
//!
//! One request, one response. Transport failures are terminal for the
//! run: there is no retry or backoff, the operator re-triggers instead.

use crate::util::truncate;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const API_KEY_ENV: &str = "OPENAI_API_TOKEN";

const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 4000;
/// Deterministic-leaning sampling for repeatable diagnoses.
const TEMPERATURE: f32 = 0.1;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Client for the language-model service.
///
/// The credential is resolved once at construction; a missing key never
/// gets as far as a network call.
pub struct LlmClient {
    api_key: String,
    client: reqwest::Client,
}

impl LlmClient {
    /// Build a client from the process environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .with_context(|| format!("{} not found in environment", API_KEY_ENV))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    /// Send the diagnostic request and return the raw completion text.
    pub async fn request_fix(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to reach the language-model service")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            anyhow::bail!("API error {}: {}", status, truncate(&text, 200));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse completion response: {}", truncate(&text, 200)))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
