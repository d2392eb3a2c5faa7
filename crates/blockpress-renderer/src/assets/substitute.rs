use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Original document path -> uploaded URL.
///
/// Ordered by path so substitution runs in the same order on every call.
pub type ReplacementMap = BTreeMap<String, String>;

/// Rewrite image references whose path is a key of `replacements`.
///
/// Paths are matched literally, so `./shot (1).png` or `a+b.png` need no
/// special handling by callers. Every occurrence is rewritten to
/// `![alt](url)`. Image titles are not carried over.
pub fn replace_image_paths(markdown: &str, replacements: &ReplacementMap) -> String {
    let mut result = markdown.to_string();

    for (original_path, url) in replacements {
        let pattern = format!(
            r#"!\[(?P<alt>[^\]]*)\]\([ \t]*{}(?:[ \t]+(?:"[^"]*"|'[^']*'))?[ \t]*\)"#,
            regex::escape(original_path)
        );
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(err) => {
                tracing::warn!(path = %original_path, "skipping unmatchable image path: {err}");
                continue;
            }
        };

        let replaced = re.replace_all(&result, |caps: &Captures| {
            format!("![{}]({})", &caps["alt"], url)
        });
        result = replaced.into_owned();
    }

    result
}
