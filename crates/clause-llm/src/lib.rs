//! Clause LLM Backend Layer
//!
//! Classification backends implementing the `Classifier` trait from
//! `clause-domain`.
//!
//! # Backends
//!
//! - `MockClassifier`: Deterministic mock for testing
//! - `OpenAiClassifier`: Any OpenAI-compatible `/chat/completions` server
//!   (vLLM, llama.cpp server, hosted OpenAI)
//!
//! # Examples
//!
//! ```
//! use clause_domain::traits::{Classifier, ClassifyRequest};
//! use clause_domain::{Extraction, TaxonomyEntry};
//! use clause_llm::MockClassifier;
//!
//! # async fn example() {
//! let classifier = MockClassifier::new(vec![Extraction::new("Wages Clause", "paid weekly")]);
//! let labels = [TaxonomyEntry::new("Wages Clause", "Pay rates")];
//! let request = ClassifyRequest {
//!     chunk_text: "Employees are paid weekly.",
//!     left_context: "",
//!     right_context: "",
//!     allowed_labels: &labels,
//! };
//! let hits = classifier.classify(&request).await.unwrap();
//! assert_eq!(hits.len(), 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod openai;
pub mod prompt;
pub mod response;
pub mod retry;

use clause_domain::traits::{Classifier, ClassifyRequest};
use clause_domain::Extraction;
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use config::BackendConfig;
pub use openai::OpenAiClassifier;
pub use retry::{AttemptOutcome, RetryDecision, RetryState};

/// Errors that can occur during classification calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Unusable response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Output cut off by the token limit
    #[error("Model output truncated at {0} tokens")]
    Truncated(u32),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Every attempt failed
    #[error("Giving up after {attempts} attempt(s): {last_error}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// The final attempt's error
        last_error: String,
    },

    /// Invalid backend configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::ModelNotAvailable(_) | LlmError::Config(_))
    }
}

/// A classification request as seen by [`MockClassifier`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Chunk text
    pub chunk_text: String,
    /// Left context
    pub left_context: String,
    /// Right context
    pub right_context: String,
    /// Names of the allowed labels
    pub allowed_labels: Vec<String>,
}

/// Mock classifier for deterministic testing
///
/// Responses are keyed by a substring of the chunk text. Failure triggers
/// are checked first, then scripted responses in insertion order, then the
/// default hits. No network calls are made.
///
/// # Examples
///
/// ```
/// use clause_domain::Extraction;
/// use clause_llm::MockClassifier;
///
/// let mut classifier = MockClassifier::empty();
/// classifier.add_response("Article 4", vec![Extraction::new("Wages Clause", "overtime")]);
/// classifier.add_error("Article 9");
/// assert_eq!(classifier.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClassifier {
    default_hits: Vec<Extraction>,
    responses: Arc<Mutex<Vec<(String, Vec<Extraction>)>>>,
    failures: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockClassifier {
    /// Create a MockClassifier returning the same hits for every chunk
    pub fn new(default_hits: Vec<Extraction>) -> Self {
        Self {
            default_hits,
            ..Default::default()
        }
    }

    /// Create a MockClassifier that finds nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return `hits` for chunks containing `trigger`
    pub fn add_response(&mut self, trigger: impl Into<String>, hits: Vec<Extraction>) {
        self.responses.lock().unwrap().push((trigger.into(), hits));
    }

    /// Fail for chunks containing `trigger`
    pub fn add_error(&mut self, trigger: impl Into<String>) {
        self.failures.lock().unwrap().push(trigger.into());
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count and recorded requests
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
        self.requests.lock().unwrap().clear();
    }

    /// Requests seen so far, in call order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: &ClassifyRequest<'_>) -> Result<Vec<Extraction>, LlmError> {
        *self.call_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(RecordedRequest {
            chunk_text: request.chunk_text.to_string(),
            left_context: request.left_context.to_string(),
            right_context: request.right_context.to_string(),
            allowed_labels: request.allowed_labels.iter().map(|e| e.name.clone()).collect(),
        });

        let failures = self.failures.lock().unwrap();
        if failures.iter().any(|t| request.chunk_text.contains(t.as_str())) {
            return Err(LlmError::Communication("Mock error".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        if let Some((_, hits)) = responses
            .iter()
            .find(|(trigger, _)| request.chunk_text.contains(trigger.as_str()))
        {
            return Ok(hits.clone());
        }

        Ok(self.default_hits.clone())
    }
}

impl Classifier for MockClassifier {
    type Error = LlmError;

    fn classify(
        &self,
        request: &ClassifyRequest<'_>,
    ) -> impl Future<Output = Result<Vec<Extraction>, Self::Error>> {
        let result = self.respond(request);
        async move { result }
    }
}
