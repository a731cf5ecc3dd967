//! OpenAI-compatible Backend
//!
//! Talks to any server implementing the `/chat/completions` endpoint,
//! such as vLLM, llama.cpp's server, or the hosted OpenAI API.
//!
//! # Features
//!
//! - JSON-mode requests with the label list in the system prompt
//! - Token budget doubling when output is truncated
//! - Retry with backoff on transport failures
//! - Refusals mapped to zero hits
//!
//! # Examples
//!
//! ```no_run
//! use clause_llm::{BackendConfig, OpenAiClassifier};
//!
//! let config = BackendConfig {
//!     endpoint: "http://localhost:8000/v1".to_string(),
//!     model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
//!     ..Default::default()
//! };
//! let classifier = OpenAiClassifier::new(config).unwrap();
//! ```

use crate::config::BackendConfig;
use crate::retry::{AttemptOutcome, RetryDecision, RetryState};
use crate::{prompt, response, LlmError};
use clause_domain::traits::{ClassifyRequest, Classifier};
use clause_domain::Extraction;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Classifier backed by an OpenAI-compatible chat completions API
pub struct OpenAiClassifier {
    config: BackendConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// One completed call, before interpretation
#[derive(Debug, Default)]
struct Completion {
    content: String,
    finish_reason: Option<String>,
    refusal: Option<String>,
}

impl OpenAiClassifier {
    /// Create a new classifier after validating the configuration
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.resolved_api_key(),
            config,
            client,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Full URL of the completions endpoint
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Classify one chunk, retrying as the [`RetryState`] allows
    pub async fn classify_chunk(&self, request: &ClassifyRequest<'_>) -> Result<Vec<Extraction>, LlmError> {
        let system = prompt::system_prompt(request.allowed_labels);
        let user = prompt::user_message(request);
        debug!("Prompt sizes: system {} bytes, user {} bytes", system.len(), user.len());

        let mut state = RetryState::new(
            self.config.max_tokens,
            self.config.max_attempts,
            self.config.max_token_budget,
        );

        loop {
            let (outcome, error) = match self.complete(&system, &user, state.token_budget).await {
                Ok(completion) => match interpret(completion, state.token_budget) {
                    Ok(hits) => return Ok(hits),
                    Err(failure) => failure,
                },
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => (AttemptOutcome::Transport, e),
            };

            match state.advance(outcome) {
                RetryDecision::Retry(next) => {
                    warn!(
                        "Attempt {}/{} failed ({}), retrying with {} tokens",
                        state.attempt, state.max_attempts, error, next.token_budget
                    );
                    if outcome == AttemptOutcome::Transport {
                        tokio::time::sleep(state.backoff()).await;
                    }
                    state = next;
                }
                RetryDecision::Exhausted => {
                    return Err(LlmError::Exhausted {
                        attempts: state.attempt,
                        last_error: error.to_string(),
                    });
                }
            }
        }
    }

    /// Send one request
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<Completion, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            max_tokens,
            temperature: self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let mut builder = self.client.post(self.completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.config.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let completion = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| Completion {
                content: choice.message.content.unwrap_or_default(),
                finish_reason: choice.finish_reason,
                refusal: choice.message.refusal,
            })
            .unwrap_or_default();

        debug!(
            "Completion: {} bytes, finish_reason {:?}",
            completion.content.len(),
            completion.finish_reason
        );
        Ok(completion)
    }
}

/// Turn a completion into hits, or the outcome to feed the retry state
fn interpret(completion: Completion, token_budget: u32) -> Result<Vec<Extraction>, (AttemptOutcome, LlmError)> {
    if completion.finish_reason.as_deref() == Some("length") {
        return Err((AttemptOutcome::Truncated, LlmError::Truncated(token_budget)));
    }

    if let Some(refusal) = completion.refusal.filter(|r| !r.trim().is_empty()) {
        warn!("Model refused to classify chunk: {}", refusal);
        return Ok(Vec::new());
    }

    if completion.content.trim().is_empty() {
        return Err((
            AttemptOutcome::Empty,
            LlmError::InvalidResponse("Model returned empty response text".to_string()),
        ));
    }

    response::parse_hits(&completion.content).map_err(|e| (AttemptOutcome::Unparseable, e))
}

impl Classifier for OpenAiClassifier {
    type Error = LlmError;

    fn classify(
        &self,
        request: &ClassifyRequest<'_>,
    ) -> impl Future<Output = Result<Vec<Extraction>, Self::Error>> {
        self.classify_chunk(request)
    }
}
