use super::locate::ImageReference;
use super::substitute::{ReplacementMap, replace_image_paths};
use crate::error::UploadError;
use crate::types::UploadedAsset;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Media library the pipeline pushes local images into.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, path: &Path, alt_text: &str) -> Result<UploadedAsset, UploadError>;
}

/// What happened to one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { original_path: String, url: String },
    SkippedMissing { original_path: String, resolved_path: PathBuf },
    SkippedFailed { original_path: String, resolved_path: PathBuf, reason: String },
}

impl UploadOutcome {
    pub fn original_path(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { original_path, .. }
            | UploadOutcome::SkippedMissing { original_path, .. }
            | UploadOutcome::SkippedFailed { original_path, .. } => original_path,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ImageUploadResult {
    pub updated_markdown: String,
    pub replacements: ReplacementMap,
    pub uploaded_count: usize,
    /// One entry per input reference, in input order.
    pub outcomes: Vec<UploadOutcome>,
}

/// Upload every local image and point the markdown at the uploaded copies.
///
/// Images run one at a time, in document order. A missing file or failed
/// upload is logged and skipped; the rest of the document still goes out.
#[tracing::instrument(skip_all, fields(images = images.len()))]
pub async fn upload_and_replace(
    markdown: &str,
    images: &[ImageReference],
    uploader: &dyn AssetUploader,
) -> ImageUploadResult {
    let mut outcomes = Vec::with_capacity(images.len());
    for image in images {
        outcomes.push(upload_one(image, uploader).await);
    }

    let replacements = collect_replacements(&outcomes);
    let uploaded_count = outcomes.iter().filter(|o| o.is_uploaded()).count();
    let updated_markdown = replace_image_paths(markdown, &replacements);

    ImageUploadResult {
        updated_markdown,
        replacements,
        uploaded_count,
        outcomes,
    }
}

async fn upload_one(image: &ImageReference, uploader: &dyn AssetUploader) -> UploadOutcome {
    let original_path = image.original_path.clone();
    let resolved_path = image.resolved_path.clone();

    if !tokio::fs::try_exists(&resolved_path).await.unwrap_or(false) {
        tracing::warn!("Image file not found: {}", resolved_path.display());
        return UploadOutcome::SkippedMissing {
            original_path,
            resolved_path,
        };
    }

    tracing::debug!("Uploading image: {}", resolved_path.display());
    match uploader.upload(&resolved_path, &image.alt_text).await {
        Ok(asset) => {
            tracing::debug!("Uploaded {} -> {}", original_path, asset.url);
            UploadOutcome::Uploaded {
                original_path,
                url: asset.url,
            }
        }
        Err(err) => {
            tracing::warn!("Failed to upload image {}: {}", resolved_path.display(), err);
            let reason = match std::error::Error::source(&err) {
                Some(source) => format!("{err}: {source}"),
                None => err.to_string(),
            };
            UploadOutcome::SkippedFailed {
                original_path,
                resolved_path,
                reason,
            }
        }
    }
}

/// Later uploads of the same path replace earlier ones.
fn collect_replacements(outcomes: &[UploadOutcome]) -> ReplacementMap {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            UploadOutcome::Uploaded { original_path, url } => {
                Some((original_path.clone(), url.clone()))
            }
            _ => None,
        })
        .collect()
}
