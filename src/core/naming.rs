//! Identifier and file-name derivation for generated loaders.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Anything that is not safe in a file name, including `!`, `/`, `'` and non-ASCII
static UNSAFE_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

/// Derive a file-name-safe slug: lower-cased, whitespace runs and unsafe
/// characters replaced by `_`, no leading or trailing `_`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let spaced = WHITESPACE_RUN.replace_all(&lowered, "_");
    let safe = UNSAFE_CHAR.replace_all(&spaced, "_");
    safe.trim_matches('_').to_string()
}

/// Lower-case the first code point. Returns `None` for empty input.
pub fn lower_first(value: &str) -> Option<String> {
    let mut chars = value.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().collect::<String>() + chars.as_str())
}

/// Last `/`-separated segment of a package path, the alias Go uses by convention.
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
