//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Clausex - Label the clauses of OCR'd contract documents.
#[derive(Debug, Parser)]
#[command(name = "clausex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.clausex/config.toml)
    #[arg(short, long, global = true, env = "CLAUSEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per document)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract clauses from every incomplete document, resuming from the cache
    Extract(ExtractArgs),

    /// Show per-document progress
    Status(StatusArgs),

    /// Reset a document's progress, or delete the cache and all outputs
    Clear(ClearArgs),
}

/// Input and output locations; each overrides the config file.
#[derive(Debug, Default, Args)]
pub struct PathArgs {
    /// Directory holding document_<n>/page_<n>.txt files
    #[arg(long, env = "CLAUSEX_OCR_DIR")]
    pub ocr_dir: Option<PathBuf>,

    /// Taxonomy markdown file
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Extraction rows CSV
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Annotated pages JSONL
    #[arg(long)]
    pub output_jsonl: Option<PathBuf>,

    /// Processing cache file
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Directory for per-page and per-failure debug dumps
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Default, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Process at most N documents, sampled with --seed
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Only consider pages numbered <= N
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Seed for document sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pages combined into one extraction call
    #[arg(long)]
    pub pages_per_batch: Option<usize>,

    /// Also schedule unprocessed pages before the last processed page
    #[arg(long)]
    pub fill_gaps: bool,

    /// OpenAI-compatible base URL (e.g. http://localhost:8000/v1)
    #[arg(long, env = "CLAUSEX_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model name
    #[arg(long, env = "CLAUSEX_MODEL")]
    pub model: Option<String>,

    /// Initial completion token budget
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Attempts per chunk
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay between classification calls in milliseconds
    #[arg(long)]
    pub sleep_ms: Option<u64>,

    /// Delete the cache, outputs and debug dumps before starting
    #[arg(long)]
    pub clear_cache: bool,
}

/// Arguments for the status command.
#[derive(Debug, Default, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Only consider pages numbered <= N
    #[arg(long)]
    pub max_pages: Option<u32>,
}

/// Arguments for the clear command.
#[derive(Debug, Default, Args)]
pub struct ClearArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Reset only this document's cache entry
    #[arg(short, long)]
    pub document: Option<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flags() {
        let cli = Cli::parse_from([
            "clausex",
            "extract",
            "--ocr-dir",
            "ocr",
            "--sample-size",
            "3",
            "--fill-gaps",
            "--max-attempts",
            "4",
            "--sleep-ms",
            "250",
        ]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.paths.ocr_dir, Some(PathBuf::from("ocr")));
                assert_eq!(args.sample_size, Some(3));
                assert!(args.fill_gaps);
                assert_eq!(args.max_attempts, Some(4));
                assert_eq!(args.sleep_ms, Some(250));
                assert!(!args.clear_cache);
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["clausex", "status", "--format", "json", "-v"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_clear_command() {
        let cli = Cli::parse_from(["clausex", "clear", "--document", "document_7", "-y"]);
        match cli.command {
            Command::Clear(args) => {
                assert_eq!(args.document.as_deref(), Some("document_7"));
                assert!(args.yes);
            }
            _ => panic!("Expected Clear command"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["clausex"]).is_err());
    }
}
