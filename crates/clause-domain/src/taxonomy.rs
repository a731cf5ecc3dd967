//! Taxonomy module - the canonical clause labels

/// Catch-all label used when no taxonomy entry applies
pub const OTHER_LABEL: &str = "OTHER";

const OTHER_DESCRIPTION: &str = "Other clause not covered by taxonomy.";

/// One canonical clause label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    /// Canonical label name, e.g. "Recognition Clause"
    pub name: String,
    /// One-line summary shown to the classifier
    pub tldr: String,
    /// Longer description (informational only)
    pub description: String,
}

impl TaxonomyEntry {
    /// Create an entry with a short description
    pub fn new(name: impl Into<String>, tldr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tldr: tldr.into(),
            description: String::new(),
        }
    }

    /// Whether this is the `OTHER` sentinel
    pub fn is_other(&self) -> bool {
        self.name == OTHER_LABEL
    }
}

/// Ordered list of canonical labels.
///
/// Declaration order matters: it breaks ties during label normalization.
/// The `OTHER` sentinel is always present exactly once; it is appended when
/// the source does not declare it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    /// Build a taxonomy from entries, enforcing the `OTHER` invariant
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        let mut seen_other = false;
        let mut kept = Vec::with_capacity(entries.len() + 1);

        for entry in entries {
            if entry.is_other() {
                if seen_other {
                    continue;
                }
                seen_other = true;
            }
            kept.push(entry);
        }

        if !seen_other {
            kept.push(TaxonomyEntry::new(OTHER_LABEL, OTHER_DESCRIPTION));
        }

        Self { entries: kept }
    }

    /// Parse the taxonomy markdown format.
    ///
    /// ```text
    /// ### 1. Recognition Clause
    /// **TLDR**: Employer recognizes the union.
    /// **Description**: ...
    /// --### 2. Disabled Clause      (skipped)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use clause_domain::Taxonomy;
    ///
    /// let taxonomy = Taxonomy::parse_markdown("### 1. Wages Clause\n**TLDR**: Pay rates.\n");
    /// assert_eq!(taxonomy.names(), vec!["Wages Clause", "OTHER"]);
    /// ```
    pub fn parse_markdown(markdown: &str) -> Self {
        let mut entries = Vec::new();
        let mut current: Option<TaxonomyEntry> = None;

        for raw_line in markdown.lines() {
            let line = raw_line.trim();
            // A commented-out heading closes the current entry so its
            // fields are not attributed to the previous clause.
            if line.starts_with("--###") {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
                continue;
            }

            if let Some(name) = parse_heading(line) {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
                current = Some(TaxonomyEntry::new(name, ""));
                continue;
            }

            let Some(entry) = current.as_mut() else {
                continue;
            };
            if line.starts_with("**TLDR**") {
                if let Some((_, value)) = line.split_once(':') {
                    entry.tldr = value.trim().to_string();
                }
            } else if line.starts_with("**Description**") {
                if let Some((_, value)) = line.split_once(':') {
                    entry.description = value.trim().to_string();
                }
            }
        }

        if let Some(entry) = current {
            entries.push(entry);
        }

        Self::new(entries)
    }

    /// All entries in declaration order, including `OTHER`
    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// All canonical names in declaration order, including `OTHER`
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entries a classifier must choose from (`OTHER` is implicit)
    pub fn allowed_labels(&self) -> Vec<TaxonomyEntry> {
        self.entries.iter().filter(|e| !e.is_other()).cloned().collect()
    }

    /// Whether `name` is a canonical label
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Number of entries, including `OTHER`
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: `OTHER` is always present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Match `### <digits>. <name>` and return the trimmed name
fn parse_heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("###")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = rest[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
