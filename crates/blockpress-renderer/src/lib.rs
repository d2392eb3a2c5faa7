//! Blockpress renderer
//!
//! Turns a markdown post on disk into block editor HTML: local images are
//! uploaded through an [`AssetUploader`](assets::AssetUploader), their paths
//! rewritten to the uploaded URLs, and the result rendered as
//! `<!-- wp:* -->` annotated blocks.
//!

pub mod assets;
pub mod blocks;
pub mod error;
pub mod language;
pub mod publish;
pub mod title;
pub mod types;
pub mod utils;

pub use assets::{AssetUploader, DirectoryUploader, ImageReference, extract_local_images};
pub use blocks::render_blocks;
pub use error::{PipelineError, UploadError};
pub use publish::{
    ProcessedMarkdown, RenderedPost, process_markdown, process_markdown_file, resolve_and_render,
    resolve_and_render_file,
};
pub use title::extract_title;

/// Markdown extensions understood by every renderer in this crate.
pub fn default_md_options() -> pulldown_cmark::Options {
    pulldown_cmark::Options::ENABLE_TABLES
        | pulldown_cmark::Options::ENABLE_STRIKETHROUGH
        | pulldown_cmark::Options::ENABLE_TASKLISTS
}
