//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or output error
    #[error("Store error: {0}")]
    Store(#[from] clause_store::StoreError),

    /// Invalid extraction settings
    #[error("Extractor error: {0}")]
    Extractor(#[from] clause_extractor::ExtractorError),

    /// Backend setup error
    #[error("Backend error: {0}")]
    Llm(#[from] clause_llm::LlmError),

    /// Run aborted
    #[error("Run failed: {0}")]
    Resumer(#[from] clause_resumer::ResumerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
