use super::pipeline::AssetUploader;
use crate::error::UploadError;
use crate::types::{AssetName, UploadedAsset};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Publishes assets by copying them into a directory served at `base_url`.
///
/// Names never clash: when `cover.png` is taken the copy becomes
/// `cover-1.png`, then `cover-2.png`. Files already inside the media
/// directory are served where they are.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    media_dir: PathBuf,
    base_url: String,
}

impl DirectoryUploader {
    pub fn new(media_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            media_dir: media_dir.into(),
            base_url: base_url.into(),
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// Create the first free `name`, `name-1`, `name-2`, .. in `dir`.
async fn create_unique(dir: &Path, name: &AssetName) -> std::io::Result<(AssetName, PathBuf, File)> {
    let mut candidate = name.clone();
    let mut n = 0;
    loop {
        let dest = dir.join(candidate.as_str());
        match OpenOptions::new().write(true).create_new(true).open(&dest).await {
            Ok(file) => return Ok((candidate, dest, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = name.with_suffix(n);
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait]
impl AssetUploader for DirectoryUploader {
    #[tracing::instrument(skip(self), fields(media_dir = %self.media_dir.display()))]
    async fn upload(&self, path: &Path, alt_text: &str) -> Result<UploadedAsset, UploadError> {
        let source = tokio::fs::canonicalize(path)
            .await
            .map_err(|err| UploadError::new(path, err))?;
        let filename = source
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| UploadError::new(path, "path has no usable file name"))?;

        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|err| UploadError::new(path, err))?;
        let media_dir = tokio::fs::canonicalize(&self.media_dir)
            .await
            .map_err(|err| UploadError::new(path, err))?;

        if source.parent() == Some(media_dir.as_path()) {
            tracing::debug!("{} is already in the media directory", source.display());
            return Ok(UploadedAsset::new(self.url_for(filename)));
        }

        let mut reader = File::open(&source)
            .await
            .map_err(|err| UploadError::new(path, err))?;
        let name = AssetName::from_filename(filename);
        let (name, dest, mut writer) = create_unique(&media_dir, &name)
            .await
            .map_err(|err| UploadError::new(path, err))?;

        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(bytes) => writer.flush().await.map(|()| bytes),
            Err(err) => Err(err),
        };
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(err) => {
                drop(writer);
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(UploadError::new(path, err));
            }
        };

        tracing::debug!("Copied {} bytes to {}", bytes, dest.display());
        Ok(UploadedAsset::new(self.url_for(name.as_str())))
    }
}
