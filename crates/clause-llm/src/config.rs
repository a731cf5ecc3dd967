//! Backend connection settings

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for an OpenAI-compatible backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, up to and including the API version (e.g. `.../v1`)
    pub endpoint: String,

    /// Model name sent with each request
    pub model: String,

    /// Initial completion token budget
    pub max_tokens: u32,

    /// Attempts per chunk before giving up
    pub max_attempts: u32,

    /// Ceiling for the token budget when retrying truncated output
    pub max_token_budget: u32,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Bearer token; falls back to `OPENAI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured API key, else the environment's
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.endpoint.trim().is_empty() {
            return Err(LlmError::Config("endpoint must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::Config("model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Config("timeout_secs must be greater than 0".to_string()));
        }
        if self.max_token_budget < self.max_tokens {
            return Err(LlmError::Config(format!(
                "max_token_budget ({}) is below max_tokens ({})",
                self.max_token_budget, self.max_tokens
            )));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/v1".to_string(),
            model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            max_tokens: 1024,
            max_attempts: 2,
            max_token_budget: 16_384,
            timeout_secs: 120,
            temperature: 0.0,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BackendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_configs() {
        let config = BackendConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LlmError::Config(_))));

        let config = BackendConfig {
            max_tokens: 4096,
            max_token_budget: 2048,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = BackendConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BackendConfig = toml::from_str("model = \"gpt-4o-mini\"\nmax_attempts = 4\n").unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.max_tokens, 1024);
        assert!(config.api_key.is_none());
    }
}
