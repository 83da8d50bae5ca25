use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]+").unwrap());

/// Reduces a video title to something safe inside a
/// `Content-Disposition: attachment; filename="..."` header. Anything
/// outside `[A-Za-z0-9_.-]` collapses to a single underscore; empty
/// results fall back to the provided default.
pub fn attachment_filename(title: &str, fallback: &str) -> String {
    let cleaned = UNSAFE_RE.replace_all(title.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}
