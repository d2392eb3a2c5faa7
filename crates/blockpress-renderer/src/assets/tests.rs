//! Tests for the upload-and-replace pipeline.
//!
//! The uploader is faked; real files live in a temp dir so the existence
//! check runs against disk.

use super::*;
use crate::error::UploadError;
use crate::types::UploadedAsset;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Uploader that hands out sequential CDN URLs and can be told to fail
/// for specific file names.
#[derive(Default)]
struct FakeUploader {
    failing: Vec<&'static str>,
    calls: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeUploader {
    fn failing(names: &[&'static str]) -> Self {
        Self {
            failing: names.to_vec(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetUploader for FakeUploader {
    async fn upload(&self, path: &Path, alt_text: &str) -> Result<UploadedAsset, UploadError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((path.to_path_buf(), alt_text.to_string()));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(UploadError::new(path, "413 payload too large"));
        }
        Ok(UploadedAsset::new(format!(
            "https://cdn.example.com/{}/{}",
            calls.len(),
            name
        )))
    }
}

fn fixture_dir(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        std::fs::write(dir.path().join(file), b"image bytes").unwrap();
    }
    dir
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_uploads_and_rewrites_local_images() {
    let dir = fixture_dir(&["a.png", "b.jpg"]);
    let markdown = "![first](./a.png)\n\nSee ![second](b.jpg \"Caption\") inline.\n";
    let images = extract_local_images(markdown, Some(dir.path()));

    let uploader = FakeUploader::default();
    let result = upload_and_replace(markdown, &images, &uploader).await;

    assert_eq!(result.uploaded_count, 2);
    assert_eq!(
        result.updated_markdown,
        "![first](https://cdn.example.com/1/a.png)\n\nSee ![second](https://cdn.example.com/2/b.jpg) inline.\n"
    );
    assert_eq!(
        result.replacements.get("./a.png").map(String::as_str),
        Some("https://cdn.example.com/1/a.png")
    );

    let calls = uploader.calls();
    assert_eq!(calls[0], (dir.path().join("a.png"), "first".to_string()));
    assert_eq!(calls[1], (dir.path().join("b.jpg"), "second".to_string()));
}

#[tokio::test]
async fn test_no_images_is_a_no_op() {
    let uploader = FakeUploader::default();
    let result = upload_and_replace("Just text.", &[], &uploader).await;

    assert_eq!(result.updated_markdown, "Just text.");
    assert_eq!(result.uploaded_count, 0);
    assert!(result.replacements.is_empty());
    assert!(uploader.calls().is_empty());
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn test_missing_file_is_skipped() {
    let dir = fixture_dir(&["present.png"]);
    let markdown = "![gone](missing.png)\n\n![here](present.png)";
    let images = extract_local_images(markdown, Some(dir.path()));

    let uploader = FakeUploader::default();
    let result = upload_and_replace(markdown, &images, &uploader).await;

    assert_eq!(result.uploaded_count, 1);
    assert_eq!(uploader.calls().len(), 1, "missing files never reach the uploader");
    assert!(matches!(
        &result.outcomes[0],
        UploadOutcome::SkippedMissing { original_path, .. } if original_path == "missing.png"
    ));
    assert!(result.updated_markdown.starts_with("![gone](missing.png)"));
    assert!(result.updated_markdown.ends_with("![here](https://cdn.example.com/1/present.png)"));
}

#[tokio::test]
async fn test_failed_upload_does_not_abort_the_rest() {
    let dir = fixture_dir(&["one.png", "two.png", "three.png"]);
    let markdown = "![1](one.png) ![2](two.png) ![3](three.png)";
    let images = extract_local_images(markdown, Some(dir.path()));

    let uploader = FakeUploader::failing(&["two.png"]);
    let result = upload_and_replace(markdown, &images, &uploader).await;

    assert_eq!(uploader.calls().len(), 3);
    assert_eq!(result.uploaded_count, 2);
    assert_eq!(
        result.updated_markdown,
        "![1](https://cdn.example.com/1/one.png) ![2](two.png) ![3](https://cdn.example.com/3/three.png)"
    );

    let outcome_paths: Vec<_> = result.outcomes.iter().map(|o| o.original_path()).collect();
    assert_eq!(outcome_paths, ["one.png", "two.png", "three.png"]);
    match &result.outcomes[1] {
        UploadOutcome::SkippedFailed { reason, .. } => {
            assert!(reason.contains("413 payload too large"), "reason was {reason}");
        }
        other => panic!("expected failure outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_repeated_path_last_upload_wins() {
    let dir = fixture_dir(&["logo.png"]);
    let markdown = "![a](logo.png)\n\n![b](logo.png)";
    let images = extract_local_images(markdown, Some(dir.path()));

    let uploader = FakeUploader::default();
    let result = upload_and_replace(markdown, &images, &uploader).await;

    assert_eq!(result.uploaded_count, 2);
    assert_eq!(result.replacements.len(), 1);
    assert_eq!(
        result.updated_markdown,
        "![a](https://cdn.example.com/2/logo.png)\n\n![b](https://cdn.example.com/2/logo.png)"
    );
}
