//! Shared validation and repair contract for every generation chain.
//!
//! All chain calls go through `ChainRunner::run`: one completion attempt,
//! fence stripping, JSON parsing, range validation, then at most one
//! follow-up attempt. A validation failure re-prompts with the validator's
//! error appended so the model can correct itself; a transport failure or
//! timeout re-sends the original prompt after a short pause. The second
//! failure of either kind surfaces as `ChainError` and the caller decides
//! what degradation looks like.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::{Completion, LlmError};

/// Total attempts per chain call: the first try plus one repair or retry.
pub const CHAIN_ATTEMPTS: u32 = 2;

/// Pause before re-sending after a transport failure or timeout. Repair
/// attempts skip it; the model is not rate-limiting us, it misread the
/// schema.
const RETRY_PAUSE: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("{chain} output failed validation after repair: {detail}")]
    Validation { chain: &'static str, detail: String },

    #[error("{chain} timed out after {attempts} attempts")]
    Timeout { chain: &'static str, attempts: u32 },

    #[error("{chain} completion failed: {source}")]
    Completion {
        chain: &'static str,
        #[source]
        source: LlmError,
    },
}

/// Schema contract a chain's parsed output must satisfy.
/// Error strings feed the repair prompt verbatim, so phrase them as
/// instructions the model can act on.
pub trait ChainOutput: DeserializeOwned {
    fn validate(&self) -> Result<(), String>;
}

/// One generation chain: a name for logs and errors, a prompt builder,
/// and optional input-dependent checks on the parsed output.
pub trait Chain: Send + Sync {
    type Input: Send + Sync;
    type Output: ChainOutput;

    const NAME: &'static str;

    /// Builds the (prompt, system) pair for one input.
    fn prompts(&self, input: &Self::Input) -> (String, String);

    /// Input-dependent validation, e.g. duplicate-question detection.
    fn check(&self, _input: &Self::Input, _output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

/// Executes chains against a completion backend with the shared
/// timeout/retry/repair policy.
pub struct ChainRunner {
    completion: Arc<dyn Completion>,
    timeout_per_attempt: Duration,
}

impl ChainRunner {
    pub fn new(completion: Arc<dyn Completion>, timeout_per_attempt: Duration) -> Self {
        Self {
            completion,
            timeout_per_attempt,
        }
    }

    pub async fn run<C: Chain>(&self, chain: &C, input: &C::Input) -> Result<C::Output, ChainError> {
        let (prompt, system) = chain.prompts(input);

        let mut last_error: Option<ChainError> = None;
        let mut repair: Option<String> = None;

        for attempt in 1..=CHAIN_ATTEMPTS {
            if attempt > 1 && repair.is_none() {
                tokio::time::sleep(RETRY_PAUSE).await;
            }

            let effective_prompt = match &repair {
                Some(detail) => repair_prompt(&prompt, detail),
                None => prompt.clone(),
            };

            let outcome = tokio::time::timeout(
                self.timeout_per_attempt,
                self.completion.complete(&effective_prompt, &system),
            )
            .await;

            let raw = match outcome {
                Err(_) => {
                    warn!(
                        "{} attempt {attempt} timed out after {:?}",
                        C::NAME,
                        self.timeout_per_attempt
                    );
                    last_error = Some(ChainError::Timeout {
                        chain: C::NAME,
                        attempts: attempt,
                    });
                    continue;
                }
                Ok(Err(e)) => {
                    warn!("{} attempt {attempt} failed: {e}", C::NAME);
                    last_error = Some(ChainError::Completion {
                        chain: C::NAME,
                        source: e,
                    });
                    continue;
                }
                Ok(Ok(raw)) => raw,
            };

            let parsed = parse_output::<C::Output>(&raw)
                .and_then(|output| chain.check(input, &output).map(|_| output));

            match parsed {
                Ok(output) => return Ok(output),
                Err(detail) => {
                    warn!("{} attempt {attempt} returned invalid output: {detail}", C::NAME);
                    repair = Some(detail.clone());
                    last_error = Some(ChainError::Validation {
                        chain: C::NAME,
                        detail,
                    });
                }
            }
        }

        Err(last_error.unwrap_or(ChainError::Timeout {
            chain: C::NAME,
            attempts: CHAIN_ATTEMPTS,
        }))
    }
}

/// Strips fences, parses JSON, and runs the output's own validation.
/// Returns the repair-prompt detail on any failure.
pub fn parse_output<T: ChainOutput>(raw: &str) -> Result<T, String> {
    let text = strip_json_fences(raw);
    if text.is_empty() {
        return Err("the response was empty; return the JSON object described in the prompt"
            .to_string());
    }
    let output: T = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
    output.validate()?;
    Ok(output)
}

fn repair_prompt(original: &str, detail: &str) -> String {
    format!(
        "{original}\n\nYour previous reply was rejected: {detail}\n\
        Return ONLY a corrected JSON object that satisfies the schema above. No commentary."
    )
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
