//! MIME / extension pattern matching for file components.
//!
//! A `filePattern` is a comma-separated list of entries. An entry is one of
//! `*`, `*/*`, `type/*`, `*/subtype`, an exact MIME type, or a `.ext` file
//! name suffix. Comparison is case-insensitive. Entries starting with `!`
//! are not treated as exclusions; they are compared literally and so never
//! match a real content type.

/// Split a `filePattern` into trimmed, non-empty entries.
pub fn supported_mime_types(file_pattern: &str) -> Vec<String> {
    file_pattern
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a file with `content_type` and `file_name` satisfies any entry.
pub fn matches_file_pattern(entries: &[String], content_type: &str, file_name: &str) -> bool {
    entries
        .iter()
        .any(|entry| matches_entry(entry, content_type, file_name))
}

fn matches_entry(entry: &str, content_type: &str, file_name: &str) -> bool {
    let entry = entry.to_ascii_lowercase();
    let content_type = content_type.trim().to_ascii_lowercase();

    if entry == "*" || entry == "*/*" || entry == content_type {
        return true;
    }
    if entry.starts_with('.') {
        return file_name.to_ascii_lowercase().ends_with(&entry);
    }

    let wanted: Vec<&str> = entry.split('/').collect();
    let actual: Vec<&str> = content_type.split('/').collect();
    (0..wanted.len().max(actual.len())).all(|i| match (wanted.get(i), actual.get(i)) {
        (Some(&"*"), _) => true,
        (Some(w), Some(a)) => w == a,
        _ => false,
    })
}
