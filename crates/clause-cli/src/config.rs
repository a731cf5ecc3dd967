//! Configuration management for the CLI.

use crate::cli::{ExtractArgs, PathArgs};
use crate::error::{CliError, Result};
use clause_extractor::ExtractorConfig;
use clause_llm::BackendConfig;
use clause_resumer::{OutputPaths, ResumePolicy, ResumerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Every section is optional in the file; missing keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global settings
    pub settings: Settings,

    /// Input and output locations
    pub paths: PathsConfig,

    /// Chunking and request pacing
    pub extractor: ExtractorConfig,

    /// Document selection and resume rule
    pub resumer: ResumerConfig,

    /// Classification backend
    pub backend: BackendConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `document_<n>/page_<n>.txt`
    pub ocr_dir: PathBuf,

    /// Taxonomy markdown file
    pub taxonomy: PathBuf,

    /// Extraction rows CSV
    pub output_csv: PathBuf,

    /// Annotated pages JSONL
    pub output_jsonl: PathBuf,

    /// Processing cache
    pub cache_file: PathBuf,

    /// Debug dump directory; disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".clausex").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!("Config file {} not found", path.display())));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Override locations given on the command line.
    pub fn apply_paths(&mut self, args: &PathArgs) {
        let paths = &mut self.paths;
        if let Some(dir) = &args.ocr_dir {
            paths.ocr_dir = dir.clone();
        }
        if let Some(file) = &args.taxonomy {
            paths.taxonomy = file.clone();
        }
        if let Some(file) = &args.output_csv {
            paths.output_csv = file.clone();
        }
        if let Some(file) = &args.output_jsonl {
            paths.output_jsonl = file.clone();
        }
        if let Some(file) = &args.cache_file {
            paths.cache_file = file.clone();
        }
        if let Some(dir) = &args.debug_dir {
            paths.debug_dir = Some(dir.clone());
        }
    }

    /// Override everything the extract command accepts.
    pub fn apply_extract(&mut self, args: &ExtractArgs) {
        self.apply_paths(&args.paths);

        let resumer = &mut self.resumer;
        if args.sample_size.is_some() {
            resumer.sample_size = args.sample_size;
        }
        if args.max_pages.is_some() {
            resumer.max_pages = args.max_pages;
        }
        if let Some(seed) = args.seed {
            resumer.seed = seed;
        }
        if args.pages_per_batch.is_some() {
            resumer.pages_per_batch = args.pages_per_batch;
        }
        if args.fill_gaps {
            resumer.resume_policy = ResumePolicy::FillGaps;
        }

        let backend = &mut self.backend;
        if let Some(endpoint) = &args.endpoint {
            backend.endpoint = endpoint.clone();
        }
        if let Some(model) = &args.model {
            backend.model = model.clone();
        }
        if let Some(max_tokens) = args.max_tokens {
            backend.max_tokens = max_tokens;
        }
        if let Some(max_attempts) = args.max_attempts {
            backend.max_attempts = max_attempts;
        }
        if let Some(timeout) = args.timeout {
            backend.timeout_secs = timeout;
        }

        if let Some(sleep_ms) = args.sleep_ms {
            self.extractor.request_delay_ms = sleep_ms;
        }
    }
}

impl PathsConfig {
    /// Output locations handed to the worker
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            csv: self.output_csv.clone(),
            jsonl: self.output_jsonl.clone(),
            debug_dir: self.debug_dir.clone(),
        }
    }

    /// Everything a full clear deletes: cache, outputs and debug dumps
    pub fn clearable(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            self.cache_file.clone(),
            self.output_csv.clone(),
            self.output_jsonl.clone(),
        ];
        paths.extend(self.debug_dir.clone());
        paths
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ocr_dir: PathBuf::from("ocr_output"),
            taxonomy: PathBuf::from("taxonomy.md"),
            output_csv: PathBuf::from("output/extracted_clauses.csv"),
            output_jsonl: PathBuf::from("output/extracted_clauses.jsonl"),
            cache_file: PathBuf::from("output/processing_cache.json"),
            debug_dir: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
