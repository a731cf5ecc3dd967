//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for chunking and classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size (bytes)
    pub max_chunk_size: usize,

    /// Fraction of `max_chunk_size` repeated at the start of the next chunk
    pub overlap_fraction: f64,

    /// Bytes of surrounding text passed as left/right context per chunk
    pub context_chars: usize,

    /// Delay between consecutive classification calls (milliseconds)
    pub request_delay_ms: u64,
}

impl ExtractorConfig {
    /// Delay between classification calls as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Number of bytes shared by consecutive chunks
    pub fn overlap_chars(&self) -> usize {
        (self.max_chunk_size as f64 * self.overlap_fraction).floor() as usize
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_size == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_size must be greater than 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.overlap_fraction) {
            return Err(ExtractorError::Config(format!(
                "overlap_fraction {} out of range [0.0, 1.0)",
                self.overlap_fraction
            )));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 6_000,
            overlap_fraction: 0.15,
            context_chars: 300,
            request_delay_ms: 0,
        }
    }
}
