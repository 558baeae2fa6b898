/// LLM Client — the single point of entry for all Claude API calls in Inquisitor.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// The client makes exactly one API attempt per `complete` call. Retry,
/// backoff, and output repair live in `chains::validator`, which owns the
/// per-chain policy; stacking a second retry loop here would multiply
/// worst-case latency.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod cache;
pub mod cost;

use cache::ResponseCache;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Inquisitor.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The completion capability every chain runs against. Production uses
/// `LlmClient`; tests substitute scripted doubles.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Sends one prompt and returns the raw text reply. Exactly one API
    /// attempt; callers decide whether and how to retry.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by all chains in Inquisitor.
/// Wraps the Anthropic Messages API with an optional response cache.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    cache: Option<std::sync::Arc<ResponseCache>>,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            cache: None,
        }
    }

    /// Attaches a response cache. Identical (system, prompt) pairs within
    /// the TTL are served without an API call.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(std::sync::Arc::new(cache));
        self
    }

    /// Makes a single raw call to the Claude API, returning the full
    /// response object. Any non-2xx status is an error; there is no retry
    /// at this layer.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}, est_cost_usd={:.6}",
            llm_response.usage.input_tokens,
            llm_response.usage.output_tokens,
            cost::estimate_cost_usd(
                MODEL,
                llm_response.usage.input_tokens,
                llm_response.usage.output_tokens,
            )
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let cache_key = self
            .cache
            .as_ref()
            .map(|_| ResponseCache::key(MODEL, system, prompt));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(cached) = cache.get(key) {
                let est_input = cost::estimate_tokens(prompt) + cost::estimate_tokens(system);
                let est_output = cost::estimate_tokens(&cached);
                debug!(
                    "LLM cache hit: est_saved_usd={:.6}, {:?}",
                    cost::estimate_cost_usd(MODEL, est_input, est_output),
                    cache.stats()
                );
                return Ok(cached);
            }
        }

        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?.to_string();

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.put(key, text.clone());
        }

        Ok(text)
    }
}
