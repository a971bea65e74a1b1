//! Storage key generation

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

const MAX_NAME_CHARS: usize = 100;

/// Runs of characters not allowed in a stored file name
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid filename regex"));

/// Reduce a user supplied file name to `[A-Za-z0-9._-]`.
///
/// Path components are dropped, runs of other characters become a single `_`,
/// and leading dots are removed so the result is never hidden or relative.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let replaced = UNSAFE_CHARS.replace_all(base.trim(), "_");
    let cleaned: String = replaced
        .trim_start_matches('.')
        .trim_matches('_')
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Unique key: `<prefix>/YYYY/MM/DD/<uuid>-<sanitized name>`
pub fn generate_key(prefix: &str, filename: &str) -> String {
    let date = chrono::Utc::now().format("%Y/%m/%d");
    format!(
        "{}/{}/{}-{}",
        prefix.trim_matches('/'),
        date,
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}
