use super::pipeline::AssetUploader;
use crate::error::PipelineError;
use crate::types::UploadedAsset;
use std::path::Path;
use tempfile::NamedTempFile;

/// File extension for an image MIME type. Unknown types are treated as PNG.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// Image bytes parked on disk long enough to hand to an uploader.
///
/// The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct TempAsset {
    file: NamedTempFile,
}

impl TempAsset {
    pub async fn write(bytes: &[u8], mime: &str) -> Result<Self, PipelineError> {
        let suffix = format!(".{}", extension_for_mime(mime));
        let file = tempfile::Builder::new()
            .prefix("featured-image-")
            .suffix(&suffix)
            .tempfile()?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Upload generated image bytes through a temp file.
///
/// The temp file is gone once this returns, whether or not the upload
/// succeeded.
#[tracing::instrument(skip(bytes, uploader), fields(len = bytes.len()))]
pub async fn upload_generated_image(
    bytes: &[u8],
    mime: &str,
    alt_text: &str,
    uploader: &dyn AssetUploader,
) -> Result<UploadedAsset, PipelineError> {
    let asset = TempAsset::write(bytes, mime).await?;
    let uploaded = uploader.upload(asset.path(), alt_text).await?;
    Ok(uploaded)
}
