//! Clear command implementation.

use crate::cli::ClearArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use clause_store::{remove_path, CacheFile};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Execute the clear command.
pub fn execute_clear(args: ClearArgs, mut config: Config, formatter: &Formatter) -> Result<()> {
    config.apply_paths(&args.paths);
    let paths = &config.paths;

    if let Some(document_id) = &args.document {
        if !args.yes && !confirm(&format!("Reset progress for '{}'?", document_id))? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }

        let mut cache = CacheFile::load(&paths.cache_file);
        if cache.reset_document(document_id)? {
            println!("{}", formatter.success(&format!("Reset progress for '{}'", document_id)));
        } else {
            println!("{}", formatter.warning(&format!("No cache entry for '{}'", document_id)));
        }
        return Ok(());
    }

    let targets = paths.clearable();
    if !args.yes {
        println!("About to delete:");
        for path in &targets {
            println!("  - {}", path.display());
        }
        if !confirm("Continue?")? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    let removed = clear_paths(&targets)?;
    println!("{}", formatter.success(&format!("Removed {} path(s)", removed)));
    Ok(())
}

/// Delete each path that exists; returns how many were removed.
pub(crate) fn clear_paths(paths: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for path in paths {
        if remove_path(path)? {
            info!("Removed {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clear_paths() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("out.csv");
        let debug = dir.path().join("debug");
        fs::write(&csv, "document_id\n").unwrap();
        fs::create_dir_all(debug.join("nested")).unwrap();

        let targets = vec![csv.clone(), debug.clone(), dir.path().join("absent.json")];
        assert_eq!(clear_paths(&targets).unwrap(), 2);
        assert!(!csv.exists());
        assert!(!debug.exists());
        assert_eq!(clear_paths(&targets).unwrap(), 0);
    }

    #[test]
    fn test_reset_single_document() {
        let dir = tempfile::tempdir().unwrap();
        let cache_file = dir.path().join("cache.json");
        let mut cache = CacheFile::load(&cache_file);
        cache.record_page_done("document_1", 1).unwrap();
        cache.record_page_done("document_2", 1).unwrap();

        let mut config = Config::default();
        config.paths.cache_file = cache_file.clone();
        let args = ClearArgs {
            document: Some("document_1".to_string()),
            yes: true,
            ..Default::default()
        };
        let formatter = Formatter::new(crate::config::OutputFormat::Quiet, false);
        execute_clear(args, config, &formatter).unwrap();

        let cache = CacheFile::load(&cache_file);
        assert!(cache.document("document_1").is_none());
        assert!(cache.document("document_2").is_some());
    }
}
