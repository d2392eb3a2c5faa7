//! Document titles.
//!
//! The first level-1 heading of a post is its title. It is published as the
//! post title, so the rendered body must not repeat it.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(?P<title>.+)$").unwrap());

static TITLE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+.+(?:\r?\n)*").unwrap());

/// Text of the first level-1 heading, trimmed.
pub fn extract_title(markdown: &str) -> Option<String> {
    TITLE_RE
        .captures(markdown)
        .and_then(|caps| caps.name("title"))
        .map(|title| title.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Remove the first level-1 heading line and the blank lines right after it.
pub fn strip_title(markdown: &str) -> Cow<'_, str> {
    TITLE_LINE_RE.replace(markdown, "")
}
