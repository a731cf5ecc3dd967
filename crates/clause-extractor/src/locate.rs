//! Find a claimed snippet inside a reference text

/// Locate `needle` in `haystack`, returning its `[start, end)` byte span.
///
/// The needle is trimmed first. An exact search is tried before an ASCII
/// case-insensitive one; ASCII folding keeps byte lengths unchanged, so the
/// returned offsets are valid for the original `haystack`. Returns `None`
/// when the snippet is blank or absent; callers treat that as "unlocated".
///
/// # Examples
///
/// ```
/// use clause_extractor::locate;
///
/// assert_eq!(locate("The Employer recognizes the Union", "the union"), Some((24, 33)));
/// assert_eq!(locate("abc", "xyz"), None);
/// ```
pub fn locate(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let snippet = needle.trim();
    if snippet.is_empty() {
        return None;
    }

    if let Some(idx) = haystack.find(snippet) {
        return Some((idx, idx + snippet.len()));
    }

    let folded_haystack = haystack.to_ascii_lowercase();
    let folded_snippet = snippet.to_ascii_lowercase();
    folded_haystack
        .find(&folded_snippet)
        .map(|idx| (idx, idx + snippet.len()))
}
