//! Status command implementation.

use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use clause_resumer::Resumer;
use clause_store::{CacheFile, FsPageStore};

/// Execute the status command.
pub fn execute_status(args: StatusArgs, mut config: Config, formatter: &Formatter) -> Result<()> {
    config.apply_paths(&args.paths);
    if args.max_pages.is_some() {
        config.resumer.max_pages = args.max_pages;
    }

    let resumer = Resumer::new(CacheFile::load(&config.paths.cache_file), config.resumer.clone())?;
    let reports = resumer.report(&FsPageStore::new(&config.paths.ocr_dir))?;

    println!("{}", formatter.format_status(&reports)?);
    Ok(())
}
