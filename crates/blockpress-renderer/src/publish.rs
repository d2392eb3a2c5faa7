//! End-to-end entry points: markdown in, publishable post out.

use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, Parser, html};
use serde::Serialize;

use crate::assets::{AssetUploader, ImageReference, extract_local_images, upload_and_replace};
use crate::blocks::render_blocks;
use crate::default_md_options;
use crate::error::PipelineError;
use crate::title::{extract_title, strip_title};

/// A post ready to hand to the content API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    pub html: String,
    pub title: Option<String>,
    pub uploaded_count: usize,
}

/// Markdown inspected without uploading anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedMarkdown {
    /// Plain HTML preview of the body, title line removed.
    pub html: String,
    pub title: Option<String>,
    pub local_images: Vec<ImageReference>,
}

/// Upload local images, rewrite their paths and render the result as blocks.
///
/// When the document has no local images nothing is uploaded and the output
/// is exactly `render_blocks(markdown)`. Missing or failed images are
/// skipped; compare `uploaded_count` with the number of local images to spot
/// them.
#[tracing::instrument(skip_all, fields(base_dir = ?base_dir))]
pub async fn resolve_and_render(
    markdown: &str,
    base_dir: Option<&Path>,
    uploader: &dyn AssetUploader,
) -> RenderedPost {
    let title = extract_title(markdown);
    let images = extract_local_images(markdown, base_dir);

    if images.is_empty() {
        return RenderedPost {
            html: render_blocks(markdown),
            title,
            uploaded_count: 0,
        };
    }

    tracing::info!("Uploading {} local image(s)", images.len());
    let result = upload_and_replace(markdown, &images, uploader).await;
    if result.uploaded_count < images.len() {
        tracing::warn!(
            "Only {} of {} local images were uploaded",
            result.uploaded_count,
            images.len()
        );
    }

    RenderedPost {
        html: render_blocks(&result.updated_markdown),
        title,
        uploaded_count: result.uploaded_count,
    }
}

/// [`resolve_and_render`] for a file on disk.
///
/// Images resolve against the file's directory. A document without a `#`
/// title is titled after the file stem.
pub async fn resolve_and_render_file(
    path: impl AsRef<Path>,
    uploader: &dyn AssetUploader,
) -> Result<RenderedPost, PipelineError> {
    let (path, markdown) = read_markdown(path.as_ref()).await?;
    let mut post = resolve_and_render(&markdown, path.parent(), uploader).await;
    if post.title.is_none() {
        post.title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(post)
}

pub fn process_markdown(markdown: &str, base_dir: Option<&Path>) -> ProcessedMarkdown {
    let body = strip_title(markdown);
    let mut preview = String::new();
    let events = Parser::new_ext(&body, default_md_options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        event => event,
    });
    html::push_html(&mut preview, events);

    ProcessedMarkdown {
        html: preview,
        title: extract_title(markdown),
        local_images: extract_local_images(markdown, base_dir),
    }
}

pub async fn process_markdown_file(
    path: impl AsRef<Path>,
) -> Result<ProcessedMarkdown, PipelineError> {
    let (path, markdown) = read_markdown(path.as_ref()).await?;
    Ok(process_markdown(&markdown, path.parent()))
}

/// Returns the absolute path alongside the file contents.
async fn read_markdown(path: &Path) -> Result<(PathBuf, String), PipelineError> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(PipelineError::FileNotFound { path });
    }
    let markdown = tokio::fs::read_to_string(&path).await?;
    tracing::debug!("Read {} bytes from {}", markdown.len(), path.display());
    Ok((path, markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectoryUploader;

    fn uploader(media: &Path) -> DirectoryUploader {
        DirectoryUploader::new(media, "https://cdn.test/media")
    }

    #[tokio::test]
    async fn test_without_local_images_matches_direct_render() {
        let media = tempfile::tempdir().unwrap();
        let markdown = "# Post\n\n![remote](https://example.com/a.png)\n\nBody text.";

        let post = resolve_and_render(markdown, None, &uploader(media.path())).await;

        assert_eq!(post.html, render_blocks(markdown));
        assert_eq!(post.title.as_deref(), Some("Post"));
        assert_eq!(post.uploaded_count, 0);
        assert_eq!(std::fs::read_dir(media.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_local_image_is_uploaded_and_rendered() {
        let posts = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();
        std::fs::create_dir(posts.path().join("img")).unwrap();
        std::fs::write(posts.path().join("img/Photo 1.png"), b"png").unwrap();

        let markdown = "# Trip\n\n![Photo](img/Photo 1.png)\n";
        let post = resolve_and_render(markdown, Some(posts.path()), &uploader(media.path())).await;

        assert_eq!(post.uploaded_count, 1);
        assert_eq!(
            post.html,
            "<!-- wp:image -->\n<figure class=\"wp-block-image\"><img src=\"https://cdn.test/media/photo_1.png\" alt=\"Photo\"/></figure>\n<!-- /wp:image -->\n"
        );
        assert!(media.path().join("photo_1.png").exists());
    }

    #[tokio::test]
    async fn test_missing_image_keeps_original_path() {
        let posts = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();

        let post = resolve_and_render(
            "See ![gone](gone.png).",
            Some(posts.path()),
            &uploader(media.path()),
        )
        .await;

        assert_eq!(post.uploaded_count, 0);
        assert!(post.html.contains("<img src=\"gone.png\" alt=\"gone\"/>"), "{}", post.html);
    }

    #[tokio::test]
    async fn test_file_title_falls_back_to_stem() {
        let posts = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();
        let file = posts.path().join("release-notes.md");
        std::fs::write(&file, "No heading here.\n").unwrap();

        let post = resolve_and_render_file(&file, &uploader(media.path())).await.unwrap();
        assert_eq!(post.title.as_deref(), Some("release-notes"));

        std::fs::write(&file, "# Real Title\n\nBody\n").unwrap();
        let post = resolve_and_render_file(&file, &uploader(media.path())).await.unwrap();
        assert_eq!(post.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_process_markdown() {
        let processed = process_markdown(
            "# Title\n\nBody with ![pic](pic.png) and ![web](https://x.io/w.png)",
            Some(Path::new("/posts")),
        );

        assert_eq!(processed.title.as_deref(), Some("Title"));
        assert!(processed.html.starts_with("<p>Body with <img src=\"pic.png\" alt=\"pic\" />"));
        assert!(!processed.html.contains("<h1>"));
        assert_eq!(processed.local_images.len(), 1);
        assert_eq!(processed.local_images[0].original_path, "pic.png");
    }

    #[test]
    fn test_preview_keeps_line_breaks() {
        let processed = process_markdown("line one\nline two", None);
        assert_eq!(processed.html, "<p>line one<br />\nline two</p>\n");
    }

    #[tokio::test]
    async fn test_same_file_name_in_two_dirs_gets_two_urls() {
        let posts = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();
        for dir in ["a", "b"] {
            std::fs::create_dir(posts.path().join(dir)).unwrap();
            std::fs::write(posts.path().join(dir).join("cover.png"), dir).unwrap();
        }

        let markdown = "![one](a/cover.png)\n\n![two](b/cover.png)\n";
        let post = resolve_and_render(markdown, Some(posts.path()), &uploader(media.path())).await;

        assert_eq!(post.uploaded_count, 2);
        assert!(post.html.contains("src=\"https://cdn.test/media/cover.png\" alt=\"one\""), "{}", post.html);
        assert!(post.html.contains("src=\"https://cdn.test/media/cover-1.png\" alt=\"two\""), "{}", post.html);
        assert_eq!(std::fs::read(media.path().join("cover-1.png")).unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_process_markdown_file() {
        let posts = tempfile::tempdir().unwrap();
        let file = posts.path().join("post.md");
        std::fs::write(&file, "# Hello\n\n![a](a.png)\n").unwrap();

        let processed = process_markdown_file(&file).await.unwrap();
        assert_eq!(processed.title.as_deref(), Some("Hello"));
        assert_eq!(processed.local_images[0].resolved_path, posts.path().join("a.png"));
    }

    #[tokio::test]
    async fn test_missing_file_is_file_not_found() {
        let posts = tempfile::tempdir().unwrap();
        let missing = posts.path().join("nope.md");

        let err = process_markdown_file(&missing).await.unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { ref path } if path == &missing));
    }
}
