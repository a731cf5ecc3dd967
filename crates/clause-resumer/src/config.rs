//! Configuration for resumable runs

use crate::ResumerError;
use serde::{Deserialize, Serialize};

/// Which pages of a partially processed document are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Only pages after the highest processed page. Earlier gaps stay
    /// skipped until the document's cache entry is reset.
    #[default]
    AfterLastProcessed,
    /// Every listed page not yet processed
    FillGaps,
}

/// Configuration for the Resumer
///
/// # Examples
///
/// ```
/// use clause_resumer::{ResumePolicy, ResumerConfig};
///
/// let config = ResumerConfig::default();
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.resume_policy, ResumePolicy::AfterLastProcessed);
///
/// let config = ResumerConfig::full_coverage();
/// assert_eq!(config.resume_policy, ResumePolicy::FillGaps);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumerConfig {
    /// Process at most this many documents per run
    pub sample_size: Option<usize>,

    /// Seed for document sampling
    pub seed: u64,

    /// Only consider pages numbered `<= max_pages`
    pub max_pages: Option<u32>,

    /// Pages combined into one extraction call; `None` for the whole
    /// remaining document
    pub pages_per_batch: Option<usize>,

    /// Scheduling rule for partially processed documents
    pub resume_policy: ResumePolicy,
}

impl ResumerConfig {
    /// Preset that revisits gaps left by failed pages
    pub fn full_coverage() -> Self {
        Self {
            resume_policy: ResumePolicy::FillGaps,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ResumerError> {
        if self.sample_size == Some(0) {
            return Err(ResumerError::Config("sample_size must be >= 1".to_string()));
        }
        if self.max_pages == Some(0) {
            return Err(ResumerError::Config("max_pages must be >= 1".to_string()));
        }
        if self.pages_per_batch == Some(0) {
            return Err(ResumerError::Config("pages_per_batch must be >= 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ResumerConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            seed: 42,
            max_pages: None,
            pages_per_batch: None,
            resume_policy: ResumePolicy::AfterLastProcessed,
        }
    }
}
