//! Local image assets.
//!
//! Markdown written on disk points at images next to it. Before the document
//! can be published those images are uploaded to the media library and the
//! document is rewritten to point at the uploaded copies:
//!
//! 1. [`extract_local_images`] finds image references and resolves their paths,
//! 2. [`upload_and_replace`] uploads each one through an [`AssetUploader`],
//! 3. [`replace_image_paths`] swaps the original paths for the uploaded URLs.

mod locate;
mod pipeline;
mod substitute;
mod temp;
mod uploader;

#[cfg(test)]
mod tests;

pub use locate::{ImageReference, extract_local_images};
pub use pipeline::{AssetUploader, ImageUploadResult, UploadOutcome, upload_and_replace};
pub use substitute::{ReplacementMap, replace_image_paths};
pub use temp::{TempAsset, extension_for_mime, upload_generated_image};
pub use uploader::DirectoryUploader;
