use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("markdown file not found: {}", path.display())]
    #[diagnostic(
        code(blockpress::pipeline::file_not_found),
        help("check the path, relative paths resolve against the working directory")
    )]
    FileNotFound { path: PathBuf },

    #[error("io error: {0}")]
    #[diagnostic(code(blockpress::pipeline::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Upload(#[from] UploadError),
}

/// Failure reported by an [`AssetUploader`](crate::assets::AssetUploader).
///
/// Inside the asset pipeline this is logged and the image is skipped; it only
/// surfaces to callers that upload directly.
#[derive(Debug, Error, Diagnostic)]
#[error("asset upload failed for {}", path.display())]
#[diagnostic(code(blockpress::assets::upload))]
pub struct UploadError {
    pub path: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl UploadError {
    pub fn new(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}
