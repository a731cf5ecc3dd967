//! Taxonomy file loading

use crate::StoreError;
use clause_domain::Taxonomy;
use std::path::Path;
use tracing::info;

/// Load a taxonomy from a markdown file
pub fn load_taxonomy(path: impl AsRef<Path>) -> Result<Taxonomy, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StoreError::NotFound(format!("Taxonomy file not found: {}", path.display())));
    }

    let markdown = std::fs::read_to_string(path)?;
    let taxonomy = Taxonomy::parse_markdown(&markdown);
    info!("Loaded {} taxonomy labels from {}", taxonomy.len(), path.display());
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.md");
        std::fs::write(
            &path,
            "# Taxonomy\n\n### 1. Recognition Clause\n**TLDR**: Union recognition\n\n### 2. Wages Clause\n**TLDR**: Pay\n",
        )
        .unwrap();

        let taxonomy = load_taxonomy(&path).unwrap();
        assert_eq!(taxonomy.names(), vec!["Recognition Clause", "Wages Clause", "OTHER"]);
    }

    #[test]
    fn test_missing_taxonomy() {
        let result = load_taxonomy("/nonexistent/taxonomy.md");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
