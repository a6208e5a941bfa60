//! Text normalization for raw platform exports.

use std::sync::LazyLock;

use regex::Regex;

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("valid URL regex"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strips URLs, collapses whitespace runs to single spaces, and trims.
///
/// Platform exports are full of tracking links and copy-pasted line
/// breaks; neither carries style signal worth embedding.
pub fn clean_text(raw: &str) -> String {
    let without_urls = RE_URL.replace_all(raw, "");
    let collapsed = RE_WHITESPACE.replace_all(&without_urls, " ");
    collapsed.trim().to_string()
}
