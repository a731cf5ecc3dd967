//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::clear::clear_paths;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use clause_extractor::Extractor;
use clause_llm::OpenAiClassifier;
use clause_resumer::{ExtractionWorker, Resumer};
use clause_store::{load_taxonomy, CacheFile, FsPageStore};
use tracing::info;

/// Execute the extract command.
///
/// Ctrl-C stops the run between units of work; every page recorded before
/// that point stays recorded.
pub async fn execute_extract(args: ExtractArgs, mut config: Config, formatter: &Formatter) -> Result<()> {
    config.apply_extract(&args);
    let paths = &config.paths;

    if args.clear_cache {
        let removed = clear_paths(&paths.clearable())?;
        println!("{}", formatter.info(&format!("Cleared cache and outputs ({} path(s) removed)", removed)));
    }

    let taxonomy = load_taxonomy(&paths.taxonomy)?;
    info!("Loaded {} labels from {}", taxonomy.len(), paths.taxonomy.display());

    let classifier = OpenAiClassifier::new(config.backend.clone())?;
    info!("Using model '{}' at {}", config.backend.model, config.backend.endpoint);

    let extractor = Extractor::new(classifier, taxonomy, config.extractor.clone())?;
    let resumer = Resumer::new(CacheFile::load(&paths.cache_file), config.resumer.clone())?;
    let store = FsPageStore::new(&paths.ocr_dir);
    let mut worker = ExtractionWorker::new(extractor, store, resumer, paths.output_paths());

    let outcome = tokio::select! {
        result = worker.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(result) => {
            let metrics = result?;
            println!("{}", formatter.format_metrics(&metrics)?);
        }
        None => {
            println!(
                "{}",
                formatter.warning("Interrupted; progress up to the last completed page is saved")
            );
            println!("{}", formatter.format_metrics(worker.metrics())?);
        }
    }

    Ok(())
}
