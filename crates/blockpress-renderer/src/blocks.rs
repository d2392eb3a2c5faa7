//! Block editor output.
//!
//! Markdown is parsed into a [`DocumentNode`] tree and written out as
//! Gutenberg-style HTML, each top-level block wrapped in
//! `<!-- wp:kind {attrs} -->` / `<!-- /wp:kind -->` comments.

mod tree;
mod writer;


pub use tree::{DocumentNode, parse_document, plain_text};
pub use writer::{RenderContext, render_block, render_blocks, render_nodes};
