use pulldown_cmark::Alignment;
use pulldown_cmark_escape::{escape_href, escape_html, escape_html_body_text};
use serde::Serialize;

use super::tree::{DocumentNode, parse_document};
use crate::language::language_mapping;
use crate::title::strip_title;

/// Where a node sits in the document.
///
/// Only top-level blocks get `<!-- wp:* -->` comment markers; anything nested
/// inside a list item or quote renders as plain HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub top_level: bool,
}

impl RenderContext {
    pub const fn top_level() -> Self {
        Self { top_level: true }
    }

    pub const fn nested() -> Self {
        Self { top_level: false }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::top_level()
    }
}

#[derive(Serialize)]
struct HeadingAttrs {
    level: u8,
}

#[derive(Serialize)]
struct ListAttrs {
    ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
}

const SEPARATOR_HTML: &str = "<hr class=\"wp-block-separator has-alpha-channel-opacity\"/>";

/// Render markdown as a block editor document.
///
/// The leading `# Title` line is dropped since the title travels separately.
/// Every top-level block is wrapped in its comment markers and followed by a
/// blank line; the result ends with exactly one newline.
pub fn render_blocks(markdown: &str) -> String {
    let body = strip_title(markdown);
    let nodes = parse_document(&body);

    let mut html = String::with_capacity(body.len() * 2);
    render_nodes(&mut html, &nodes, RenderContext::top_level());

    let mut rendered = html.trim().to_string();
    rendered.push('\n');
    rendered
}

/// Render a sequence of sibling nodes.
pub fn render_nodes(html: &mut String, nodes: &[DocumentNode], ctx: RenderContext) {
    for node in nodes {
        if node.is_block() {
            render_block(html, node, ctx);
        } else {
            render_inline(html, node);
        }
    }
}

pub fn render_block(html: &mut String, node: &DocumentNode, ctx: RenderContext) {
    match node {
        DocumentNode::Paragraph(children) => render_paragraph(html, children, ctx),
        DocumentNode::Heading { level, children } => {
            render_heading(html, *level, children, ctx)
        }
        DocumentNode::List {
            ordered,
            start,
            items,
        } => render_list(html, *ordered, *start, items, ctx),
        DocumentNode::ListItem(children) => render_list_item(html, children),
        DocumentNode::CodeBlock { lang, text } => {
            render_code_block(html, lang.as_deref(), text, ctx)
        }
        DocumentNode::Blockquote(children) => render_blockquote(html, children, ctx),
        DocumentNode::Table {
            alignments,
            header,
            rows,
        } => render_table(html, alignments, header, rows, ctx),
        DocumentNode::ThematicBreak => {
            if ctx.top_level {
                open_block(html, "separator", None);
                html.push_str(SEPARATOR_HTML);
                close_block(html, "separator");
            } else {
                html.push_str(SEPARATOR_HTML);
            }
        }
        DocumentNode::HtmlBlock(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return;
            }
            if ctx.top_level {
                open_block(html, "html", None);
                html.push_str(raw);
                close_block(html, "html");
            } else {
                html.push_str(raw);
            }
        }
        inline => render_inline(html, inline),
    }
}

fn render_paragraph(html: &mut String, children: &[DocumentNode], ctx: RenderContext) {
    if ctx.top_level {
        if let [DocumentNode::Image { href, alt, title }] = children {
            open_block(html, "image", None);
            html.push_str("<figure class=\"wp-block-image\">");
            write_img(html, href, alt, title);
            html.push_str("</figure>");
            close_block(html, "image");
            return;
        }
    }

    let inner = inline_html(children);
    if inner.trim().is_empty() {
        return;
    }

    if ctx.top_level {
        open_block(html, "paragraph", None);
    }
    html.push_str("<p>");
    html.push_str(&inner);
    html.push_str("</p>");
    if ctx.top_level {
        close_block(html, "paragraph");
    }
}

fn render_heading(html: &mut String, level: u8, children: &[DocumentNode], ctx: RenderContext) {
    if ctx.top_level {
        open_block(html, "heading", comment_json(&HeadingAttrs { level }).as_deref());
    }
    html.push_str(&format!("<h{} class=\"wp-block-heading\">", level));
    render_inlines(html, children);
    html.push_str(&format!("</h{}>", level));
    if ctx.top_level {
        close_block(html, "heading");
    }
}

fn render_list(
    html: &mut String,
    ordered: bool,
    start: u64,
    items: &[DocumentNode],
    ctx: RenderContext,
) {
    let start = (ordered && start != 1).then_some(start);
    if ctx.top_level {
        let attrs = ordered.then(|| ListAttrs { ordered, start });
        let attrs = attrs.as_ref().and_then(comment_json);
        open_block(html, "list", attrs.as_deref());
    }

    match (ordered, start) {
        (true, Some(start)) => html.push_str(&format!("<ol start=\"{}\">", start)),
        (true, None) => html.push_str("<ol>"),
        (false, _) => html.push_str("<ul>"),
    }
    for item in items {
        render_block(html, item, RenderContext::nested());
    }
    html.push_str(if ordered { "</ol>" } else { "</ul>" });

    if ctx.top_level {
        close_block(html, "list");
    }
}

/// Loose-list paragraphs lose their `<p>` and are joined with `<br />`;
/// everything else renders nested.
fn render_list_item(html: &mut String, children: &[DocumentNode]) {
    let mut content = String::new();
    let mut after_paragraph = false;
    for child in children {
        match child {
            DocumentNode::Paragraph(inlines) => {
                if after_paragraph {
                    content.push_str("<br />");
                }
                render_inlines(&mut content, inlines);
                after_paragraph = true;
            }
            other if other.is_block() => {
                render_block(&mut content, other, RenderContext::nested());
                after_paragraph = false;
            }
            other => {
                render_inline(&mut content, other);
                after_paragraph = false;
            }
        }
    }
    html.push_str("<li>");
    html.push_str(content.trim());
    html.push_str("</li>");
}

fn render_code_block(html: &mut String, lang: Option<&str>, text: &str, ctx: RenderContext) {
    let mapping = language_mapping(lang);
    if ctx.top_level {
        let attrs = mapping.as_ref().and_then(comment_json);
        open_block(html, "loos-hcb/code-block", attrs.as_deref());
    }

    html.push_str("<div class=\"hcb_wrap\"><pre class=\"prism undefined-numbers lang-");
    match &mapping {
        Some(mapping) => {
            let _ = escape_html(&mut *html, &mapping.lang_type);
            html.push_str("\" data-lang=\"");
            let _ = escape_html(&mut *html, &mapping.lang_name);
            html.push('"');
        }
        None => html.push_str("plain\""),
    }
    html.push_str("><code>");
    let _ = escape_html(&mut *html, text);
    html.push_str("</code></pre></div>");

    if ctx.top_level {
        close_block(html, "loos-hcb/code-block");
    }
}

fn render_blockquote(html: &mut String, children: &[DocumentNode], ctx: RenderContext) {
    if ctx.top_level {
        open_block(html, "quote", None);
    }
    html.push_str("<blockquote class=\"wp-block-quote\">");
    render_nodes(html, children, RenderContext::nested());
    html.push_str("</blockquote>");
    if ctx.top_level {
        close_block(html, "quote");
    }
}

fn render_table(
    html: &mut String,
    alignments: &[Alignment],
    header: &[Vec<DocumentNode>],
    rows: &[Vec<Vec<DocumentNode>>],
    ctx: RenderContext,
) {
    if ctx.top_level {
        open_block(html, "table", None);
    }
    html.push_str("<figure class=\"wp-block-table\"><table><thead><tr>");
    for (i, cell) in header.iter().enumerate() {
        render_cell(html, "th", alignments.get(i), cell);
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            render_cell(html, "td", alignments.get(i), cell);
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></figure>");
    if ctx.top_level {
        close_block(html, "table");
    }
}

fn render_cell(html: &mut String, tag: &str, align: Option<&Alignment>, cell: &[DocumentNode]) {
    html.push('<');
    html.push_str(tag);
    match align {
        Some(Alignment::Left) => html.push_str(" style=\"text-align:left\""),
        Some(Alignment::Center) => html.push_str(" style=\"text-align:center\""),
        Some(Alignment::Right) => html.push_str(" style=\"text-align:right\""),
        Some(Alignment::None) | None => {}
    }
    html.push('>');
    render_inlines(html, cell);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn inline_html(nodes: &[DocumentNode]) -> String {
    let mut html = String::new();
    render_inlines(&mut html, nodes);
    html
}

fn render_inlines(html: &mut String, nodes: &[DocumentNode]) {
    for node in nodes {
        render_inline(html, node);
    }
}

fn render_inline(html: &mut String, node: &DocumentNode) {
    match node {
        DocumentNode::Text(text) => {
            let _ = escape_html_body_text(&mut *html, text);
        }
        DocumentNode::InlineCode(code) => {
            html.push_str("<code>");
            let _ = escape_html(&mut *html, code);
            html.push_str("</code>");
        }
        DocumentNode::Emphasis(children) => wrap_inline(html, "em", children),
        DocumentNode::Strong(children) => wrap_inline(html, "strong", children),
        DocumentNode::Strikethrough(children) => wrap_inline(html, "del", children),
        DocumentNode::Link {
            href,
            title,
            children,
        } => {
            html.push_str("<a href=\"");
            let _ = escape_href(&mut *html, href);
            html.push('"');
            if !title.is_empty() {
                html.push_str(" title=\"");
                let _ = escape_html(&mut *html, title);
                html.push('"');
            }
            html.push('>');
            render_inlines(html, children);
            html.push_str("</a>");
        }
        DocumentNode::Image { href, alt, title } => write_img(html, href, alt, title),
        DocumentNode::LineBreak => html.push_str("<br />"),
        DocumentNode::InlineHtml(raw) => html.push_str(raw),
        DocumentNode::TaskMarker(checked) => {
            if *checked {
                html.push_str("<input checked=\"\" disabled=\"\" type=\"checkbox\"/> ");
            } else {
                html.push_str("<input disabled=\"\" type=\"checkbox\"/> ");
            }
        }
        block => render_block(html, block, RenderContext::nested()),
    }
}

fn wrap_inline(html: &mut String, tag: &str, children: &[DocumentNode]) {
    html.push('<');
    html.push_str(tag);
    html.push('>');
    render_inlines(html, children);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn write_img(html: &mut String, src: &str, alt: &str, title: &str) {
    html.push_str("<img src=\"");
    let _ = escape_href(&mut *html, src);
    html.push('"');
    if !alt.is_empty() {
        html.push_str(" alt=\"");
        let _ = escape_html(&mut *html, alt);
        html.push('"');
    }
    if !title.is_empty() {
        html.push_str(" title=\"");
        let _ = escape_html(&mut *html, title);
        html.push('"');
    }
    html.push_str("/>");
}

fn open_block(html: &mut String, name: &str, attrs: Option<&str>) {
    html.push_str("<!-- wp:");
    html.push_str(name);
    if let Some(attrs) = attrs {
        html.push(' ');
        html.push_str(attrs);
    }
    html.push_str(" -->\n");
}

fn close_block(html: &mut String, name: &str) {
    html.push_str("\n<!-- /wp:");
    html.push_str(name);
    html.push_str(" -->\n\n");
}

/// Block attributes as JSON that is safe inside an HTML comment.
fn comment_json<T: Serialize>(attrs: &T) -> Option<String> {
    match serde_json::to_string(attrs) {
        Ok(json) => Some(escape_comment_json(&json)),
        Err(err) => {
            tracing::warn!("Failed to serialize block attributes: {}", err);
            None
        }
    }
}

/// `--` would end the comment early and `<`/`>`/`&` confuse HTML parsers, so
/// they are written as JSON unicode escapes.
pub(crate) fn escape_comment_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                escaped.push_str("\\u002d\\u002d");
            }
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            c => escaped.push(c),
        }
    }
    escaped
}
