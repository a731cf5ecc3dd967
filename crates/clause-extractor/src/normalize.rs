//! Map free-text model labels onto canonical taxonomy names

use clause_domain::{Taxonomy, OTHER_LABEL};
use std::collections::HashMap;

/// Canonicalizes classifier labels against a taxonomy.
///
/// Every output is one of the taxonomy's declared names; anything that
/// cannot be matched becomes `OTHER`.
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    canonical_index: HashMap<String, String>,
    known_names: Vec<String>,
}

impl LabelNormalizer {
    /// Build the lookup index for a taxonomy
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let mut canonical_index = HashMap::new();
        let mut known_names = Vec::with_capacity(taxonomy.len());

        for name in taxonomy.names() {
            let lower = name.to_lowercase();
            canonical_index.entry(slug(&lower)).or_insert_with(|| name.to_string());
            canonical_index.entry(lower).or_insert_with(|| name.to_string());
            known_names.push(name.to_string());
        }

        Self {
            canonical_index,
            known_names,
        }
    }

    /// Normalize a raw label.
    ///
    /// Lookup order: blank input, exact lowercase match, slug match,
    /// then containment of a canonical name in the raw label (first in
    /// taxonomy order wins), else `OTHER`.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return OTHER_LABEL.to_string();
        }

        let lower = trimmed.to_lowercase();
        if let Some(name) = self.canonical_index.get(&lower) {
            return name.clone();
        }
        if let Some(name) = self.canonical_index.get(&slug(&lower)) {
            return name.clone();
        }

        self.known_names
            .iter()
            .find(|name| lower.contains(&name.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| OTHER_LABEL.to_string())
    }
}

/// Collapse every run of non-alphanumeric characters to one space
fn slug(lower: &str) -> String {
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
