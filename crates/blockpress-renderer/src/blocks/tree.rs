use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Parser, Tag};

use crate::default_md_options;

/// Parsed markdown, folded from the flat event stream into a tree.
///
/// Inline and block nodes share one enum; which ones can appear where is
/// decided by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Paragraph(Vec<DocumentNode>),
    Heading {
        level: u8,
        children: Vec<DocumentNode>,
    },
    List {
        ordered: bool,
        start: u64,
        items: Vec<DocumentNode>,
    },
    ListItem(Vec<DocumentNode>),
    CodeBlock {
        lang: Option<String>,
        text: String,
    },
    Blockquote(Vec<DocumentNode>),
    Image {
        href: String,
        alt: String,
        title: String,
    },
    Link {
        href: String,
        title: String,
        children: Vec<DocumentNode>,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<DocumentNode>>,
        rows: Vec<Vec<Vec<DocumentNode>>>,
    },
    ThematicBreak,
    HtmlBlock(String),
    InlineHtml(String),
    Emphasis(Vec<DocumentNode>),
    Strong(Vec<DocumentNode>),
    Strikethrough(Vec<DocumentNode>),
    LineBreak,
    InlineCode(String),
    Text(String),
    TaskMarker(bool),
}

impl DocumentNode {
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            DocumentNode::Paragraph(_)
                | DocumentNode::Heading { .. }
                | DocumentNode::List { .. }
                | DocumentNode::ListItem(_)
                | DocumentNode::CodeBlock { .. }
                | DocumentNode::Blockquote(_)
                | DocumentNode::Table { .. }
                | DocumentNode::ThematicBreak
                | DocumentNode::HtmlBlock(_)
        )
    }
}

/// Parse `markdown` into top-level document nodes.
pub fn parse_document(markdown: &str) -> Vec<DocumentNode> {
    let parser = Parser::new_ext(markdown, default_md_options());
    TreeBuilder { events: parser }.children()
}

/// Concatenated text content, used for image alt text.
pub fn plain_text(nodes: &[DocumentNode]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[DocumentNode], text: &mut String) {
    for node in nodes {
        match node {
            DocumentNode::Text(t) | DocumentNode::InlineCode(t) | DocumentNode::InlineHtml(t) => {
                text.push_str(t)
            }
            DocumentNode::LineBreak => text.push(' '),
            DocumentNode::Image { alt, .. } => text.push_str(alt),
            DocumentNode::Emphasis(children)
            | DocumentNode::Strong(children)
            | DocumentNode::Strikethrough(children)
            | DocumentNode::Link { children, .. } => collect_text(children, text),
            _ => {}
        }
    }
}

/// Recursive descent over a balanced event stream: every `Start` is read
/// up to its matching `End`.
struct TreeBuilder<I> {
    events: I,
}

impl<'a, I: Iterator<Item = Event<'a>>> TreeBuilder<I> {
    /// Read sibling nodes until the enclosing `End` (or end of input).
    fn children(&mut self) -> Vec<DocumentNode> {
        let mut nodes = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::End(_) => break,
                Event::Start(tag) => self.open(tag, &mut nodes),
                Event::Text(text) => push_text(&mut nodes, &text),
                Event::Code(code) => nodes.push(DocumentNode::InlineCode(code.into_string())),
                Event::Html(html) | Event::InlineHtml(html) => {
                    nodes.push(DocumentNode::InlineHtml(html.into_string()))
                }
                Event::SoftBreak | Event::HardBreak => nodes.push(DocumentNode::LineBreak),
                Event::Rule => nodes.push(DocumentNode::ThematicBreak),
                Event::TaskListMarker(checked) => nodes.push(DocumentNode::TaskMarker(checked)),
                other => tracing::trace!("Ignoring markdown event: {:?}", other),
            }
        }
        nodes
    }

    fn open(&mut self, tag: Tag<'a>, nodes: &mut Vec<DocumentNode>) {
        let node = match tag {
            Tag::Paragraph => DocumentNode::Paragraph(self.children()),
            Tag::Heading { level, .. } => DocumentNode::Heading {
                level: level as u8,
                children: self.children(),
            },
            Tag::BlockQuote(_) => DocumentNode::Blockquote(self.children()),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                let mut text = self.raw_text();
                if text.ends_with('\n') {
                    text.pop();
                }
                DocumentNode::CodeBlock { lang, text }
            }
            Tag::HtmlBlock => DocumentNode::HtmlBlock(self.raw_text()),
            Tag::List(start) => DocumentNode::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
                items: self.children(),
            },
            Tag::Item => DocumentNode::ListItem(self.children()),
            Tag::Table(alignments) => self.table(alignments),
            Tag::Emphasis => DocumentNode::Emphasis(self.children()),
            Tag::Strong => DocumentNode::Strong(self.children()),
            Tag::Strikethrough => DocumentNode::Strikethrough(self.children()),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{}", dest_url),
                    _ => dest_url.into_string(),
                };
                DocumentNode::Link {
                    href,
                    title: title.into_string(),
                    children: self.children(),
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => DocumentNode::Image {
                href: dest_url.into_string(),
                title: title.into_string(),
                alt: plain_text(&self.children()),
            },
            // Extensions that are not enabled, or that have no block of their
            // own: keep the content, drop the wrapper.
            _ => {
                nodes.extend(self.children());
                return;
            }
        };
        nodes.push(node);
    }

    /// Raw text of a code or html block.
    fn raw_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::End(_) => break,
                Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) | Event::Code(t) => {
                    text.push_str(&t)
                }
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                _ => {}
            }
        }
        text
    }

    /// The head and each body row are read cell by cell.
    fn table(&mut self, alignments: Vec<Alignment>) -> DocumentNode {
        let mut header = Vec::new();
        let mut rows = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableHead) => header = self.row_cells(),
                Event::Start(Tag::TableRow) => rows.push(self.row_cells()),
                Event::End(_) => break,
                _ => {}
            }
        }
        DocumentNode::Table {
            alignments,
            header,
            rows,
        }
    }

    fn row_cells(&mut self) -> Vec<Vec<DocumentNode>> {
        let mut cells = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableCell) => cells.push(self.children()),
                Event::End(_) => break,
                _ => {}
            }
        }
        cells
    }
}

/// The parser splits text runs at entity and bracket boundaries; merge them.
fn push_text(nodes: &mut Vec<DocumentNode>, text: &str) {
    if let Some(DocumentNode::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(DocumentNode::Text(text.to_string()));
    }
}
