use crate::utils::{is_local_path, resolve_asset_path};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Inline image syntax: `![alt](path "title")`.
///
/// The path may hold spaces and one level of balanced parentheses, so
/// `![shot](./screen (1).png)` captures `./screen (1).png`. Titles may be
/// single or double quoted.
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"!\[(?P<alt>[^\]]*)\]\([ \t]*(?P<path>(?:[^()"\n]|\([^()\n]*\))+?)(?:[ \t]+(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'))?[ \t]*\)"#,
    )
    .unwrap()
});

/// One image occurrence in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    /// The whole `![alt](path)` match as written.
    pub original_text: String,
    pub alt_text: String,
    /// Path exactly as written in the document; the key for substitution.
    pub original_path: String,
    /// Absolute filesystem path used for upload.
    pub resolved_path: PathBuf,
    pub is_local: bool,
}

/// Find every local image reference in document order.
///
/// Remote images (`http://`, `https://`) are left out. The same path used
/// twice yields two references. Nothing is checked on disk here.
pub fn extract_local_images(markdown: &str, base_dir: Option<&Path>) -> Vec<ImageReference> {
    IMAGE_RE
        .captures_iter(markdown)
        .filter_map(|caps| {
            let original_text = caps.get(0)?.as_str();
            let alt_text = caps.name("alt").map(|m| m.as_str()).unwrap_or_default();
            let original_path = caps.name("path")?.as_str().trim();

            if original_path.is_empty() || !is_local_path(original_path) {
                return None;
            }

            Some(ImageReference {
                original_text: original_text.to_string(),
                alt_text: alt_text.to_string(),
                original_path: original_path.to_string(),
                resolved_path: resolve_asset_path(original_path, base_dir),
                is_local: true,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_remote_images() {
        let markdown = "![a](https://example.com/a.png)\n![b](http://example.com/b.png)\n![c](./c.png)";
        let images = extract_local_images(markdown, Some(Path::new("/posts")));

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].original_path, "./c.png");
        assert_eq!(images[0].alt_text, "c");
        assert!(images[0].is_local);
    }

    #[test]
    fn test_keeps_document_order_and_duplicates() {
        let markdown = "![one](a.png) text ![two](b.png)\n\n![three](a.png)";
        let images = extract_local_images(markdown, None);

        let paths: Vec<_> = images.iter().map(|i| i.original_path.as_str()).collect();
        assert_eq!(paths, ["a.png", "b.png", "a.png"]);
        let alts: Vec<_> = images.iter().map(|i| i.alt_text.as_str()).collect();
        assert_eq!(alts, ["one", "two", "three"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_against_base_dir() {
        let images = extract_local_images("![x](images/x.png)", Some(Path::new("/srv/blog")));
        assert_eq!(images[0].resolved_path, PathBuf::from("/srv/blog/images/x.png"));

        let images = extract_local_images("![x](/tmp/x.png)", Some(Path::new("/srv/blog")));
        assert_eq!(images[0].resolved_path, PathBuf::from("/tmp/x.png"));
    }

    #[test]
    fn test_title_is_not_part_of_path() {
        let images = extract_local_images(r#"![alt](./pic.png "A title")"#, None);
        assert_eq!(images[0].original_path, "./pic.png");
        assert_eq!(images[0].original_text, r#"![alt](./pic.png "A title")"#);

        let images = extract_local_images("![alt](./pic.png 'single')", None);
        assert_eq!(images[0].original_path, "./pic.png");
    }

    #[test]
    fn test_path_with_parentheses() {
        let images = extract_local_images("![a](./path (1).png)", None);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].original_path, "./path (1).png");
    }

    #[test]
    fn test_empty_alt_text() {
        let images = extract_local_images("![](cover.jpg)", None);
        assert_eq!(images[0].alt_text, "");
        assert_eq!(images[0].original_path, "cover.jpg");
    }

    #[test]
    fn test_links_are_not_images() {
        assert!(extract_local_images("[not an image](./doc.pdf)", None).is_empty());
    }
}
