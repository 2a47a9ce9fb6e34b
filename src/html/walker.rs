//! HTML structural tree walking.

use base64::Engine;
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use crate::collect::{self, Collected};
use crate::config::ImportOptions;
use crate::document::ImageAsset;
use crate::html::dom;
use crate::inline::InlineTag;
use crate::util;

/// Element kinds the HTML walker distinguishes.
///
/// Closed set with an explicit `Descend` fallback: unknown tags are
/// transparent wrappers, so pasted markup never loses content to an
/// unrecognized element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlKind {
    Heading(u8),
    Paragraph,
    Emphasis(InlineTag),
    Pre,
    Link,
    Image,
    UnorderedList,
    OrderedList,
    ListItem,
    Table,
    TableSection,
    TableRow,
    TableHeaderCell,
    TableCell,
    Break,
    Rule,
    BlockQuote,
    Superscript,
    Subscript,
    /// Non-content: the element and its children are dropped.
    NonContent,
    /// Transparent wrapper: children are visited, the element is not.
    Descend,
}

fn classify(name: &str) -> HtmlKind {
    match name {
        "h1" => HtmlKind::Heading(1),
        "h2" => HtmlKind::Heading(2),
        "h3" => HtmlKind::Heading(3),
        "h4" => HtmlKind::Heading(4),
        "h5" => HtmlKind::Heading(5),
        "h6" => HtmlKind::Heading(6),
        "p" => HtmlKind::Paragraph,
        "b" | "strong" => HtmlKind::Emphasis(InlineTag::Strong),
        "i" | "em" => HtmlKind::Emphasis(InlineTag::Em),
        "u" => HtmlKind::Emphasis(InlineTag::Underline),
        "strike" | "s" | "del" => HtmlKind::Emphasis(InlineTag::Del),
        "code" => HtmlKind::Emphasis(InlineTag::Code),
        "pre" => HtmlKind::Pre,
        "a" => HtmlKind::Link,
        "img" => HtmlKind::Image,
        "ul" => HtmlKind::UnorderedList,
        "ol" => HtmlKind::OrderedList,
        "li" => HtmlKind::ListItem,
        "table" => HtmlKind::Table,
        "thead" | "tbody" => HtmlKind::TableSection,
        "tr" => HtmlKind::TableRow,
        "th" => HtmlKind::TableHeaderCell,
        "td" => HtmlKind::TableCell,
        "br" => HtmlKind::Break,
        "hr" => HtmlKind::Rule,
        "blockquote" => HtmlKind::BlockQuote,
        "sup" => HtmlKind::Superscript,
        "sub" => HtmlKind::Subscript,
        "script" | "style" | "meta" | "link" | "head" | "title" | "noscript" => {
            HtmlKind::NonContent
        }
        _ => HtmlKind::Descend,
    }
}

/// Recursive-descent renderer for a parsed fragment body.
pub struct HtmlWalker<'a> {
    options: &'a ImportOptions,
    collected: Collected,
    /// Set while a footnote body renders. Extraction is suspended under
    /// it: placeholders and anchors belong in the content string, and a
    /// body string is not guaranteed to reach it.
    in_footnote: bool,
    re_footnote_marker: Regex,
    re_data_uri: Regex,
}

impl<'a> HtmlWalker<'a> {
    pub fn new(options: &'a ImportOptions) -> Self {
        Self {
            options,
            collected: Collected::new(),
            in_footnote: false,
            re_footnote_marker: Regex::new(r"^\[?\d+\]?$").unwrap(),
            re_data_uri: Regex::new(r"(?si)^data:image/([a-z0-9]+);base64,(.+)$").unwrap(),
        }
    }

    /// Render the fragment body to markup. Bare text directly under the
    /// body is not content and is discarded.
    pub fn walk(&mut self, body: &Handle) -> String {
        let mut output = String::new();
        for child in body.children.borrow().iter() {
            if let NodeData::Element { ref name, .. } = child.data {
                let name = name.local.to_string();
                output.push_str(&self.render_element(child, &name));
            }
        }
        output
    }

    pub fn into_collected(self) -> Collected {
        self.collected
    }

    fn render_children(&mut self, handle: &Handle) -> String {
        let mut out = String::new();
        for child in handle.children.borrow().iter() {
            out.push_str(&self.render_node(child));
        }
        out
    }

    fn render_node(&mut self, handle: &Handle) -> String {
        match handle.data {
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                if text.trim().is_empty() {
                    String::new()
                } else {
                    util::escape_xml(&text)
                }
            }
            NodeData::Element { ref name, .. } => {
                let name = name.local.to_string();
                self.render_element(handle, &name)
            }
            // Comments, doctypes and processing instructions are dropped
            _ => String::new(),
        }
    }

    fn render_element(&mut self, handle: &Handle, name: &str) -> String {
        match classify(name) {
            HtmlKind::Heading(level) => {
                let inner = self.render_children(handle);
                let inner = inner.trim();
                if util::is_blank_markup(inner) {
                    return String::new();
                }
                format!("<h{level}>{inner}</h{level}>\n\n")
            }
            HtmlKind::Paragraph => {
                let inner = self.render_children(handle);
                let inner = inner.trim();
                if util::is_blank_markup(inner) {
                    return String::new();
                }
                format!("<p>{inner}</p>\n\n")
            }
            HtmlKind::Emphasis(tag) => {
                let inner = self.render_children(handle);
                if self.options.preserve_formatting {
                    tag.wrap(&inner)
                } else {
                    inner
                }
            }
            HtmlKind::Pre => {
                format!("<pre>{}</pre>\n\n", self.render_children(handle))
            }
            HtmlKind::Link => {
                let inner = self.render_children(handle);
                match dom::get_attribute(handle, "href") {
                    Some(href) if !href.is_empty() => {
                        format!("<a href=\"{}\">{inner}</a>", util::escape_xml(&href))
                    }
                    _ => inner,
                }
            }
            HtmlKind::Image => self.render_image(handle),
            HtmlKind::UnorderedList => {
                format!("<ul>\n{}</ul>\n\n", self.render_children(handle))
            }
            HtmlKind::OrderedList => {
                format!("<ol>\n{}</ol>\n\n", self.render_children(handle))
            }
            HtmlKind::ListItem => {
                format!("<li>{}</li>\n", self.render_children(handle).trim())
            }
            HtmlKind::Table => {
                format!("<table>\n{}</table>\n\n", self.render_children(handle))
            }
            HtmlKind::TableSection => {
                format!("<{name}>\n{}</{name}>\n", self.render_children(handle))
            }
            HtmlKind::TableRow => {
                format!("<tr>\n{}</tr>\n", self.render_children(handle))
            }
            HtmlKind::TableHeaderCell => {
                format!("<th>{}</th>\n", self.render_children(handle).trim())
            }
            HtmlKind::TableCell => {
                format!("<td>{}</td>\n", self.render_children(handle).trim())
            }
            HtmlKind::Break => "<br />".to_string(),
            HtmlKind::Rule => "<hr />\n\n".to_string(),
            HtmlKind::BlockQuote => {
                format!(
                    "<blockquote>{}</blockquote>\n\n",
                    self.render_children(handle).trim()
                )
            }
            HtmlKind::Superscript => self.render_superscript(handle),
            HtmlKind::Subscript => {
                format!("<sub>{}</sub>", self.render_children(handle))
            }
            HtmlKind::NonContent => String::new(),
            HtmlKind::Descend => self.render_children(handle),
        }
    }

    /// A superscript is a footnote reference when its text is a bare
    /// marker like `[3]`, or when it links into a footnote area. On match
    /// the rendered content becomes the footnote body and the element is
    /// replaced by a reference anchor. The body renders with extraction
    /// suspended: images inside it stay out of the asset map and nested
    /// markers stay literal superscripts.
    fn render_superscript(&mut self, handle: &Handle) -> String {
        if self.in_footnote || !self.is_footnote_reference(handle) {
            return format!("<sup>{}</sup>", self.render_children(handle));
        }
        self.in_footnote = true;
        let body = self.render_children(handle);
        self.in_footnote = false;
        let id = self.collected.add_footnote(body.trim().to_string());
        collect::footnote_anchor(id)
    }

    fn is_footnote_reference(&self, handle: &Handle) -> bool {
        let text = dom::get_text_content(handle);
        if self.re_footnote_marker.is_match(text.trim()) {
            return true;
        }
        links_into_footnotes(handle)
    }

    /// Extract a data-URI image, pass external URLs through untouched,
    /// and drop anything else (no network fetches happen here).
    fn render_image(&mut self, handle: &Handle) -> String {
        let src = dom::get_attribute(handle, "src").unwrap_or_default();
        let alt = dom::get_attribute(handle, "alt").unwrap_or_default();

        if let Some(caps) = self.re_data_uri.captures(src.trim()) {
            if !self.options.import_images || self.in_footnote {
                return String::new();
            }
            let extension = caps[1].to_lowercase();
            let payload: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
            let data = match base64::engine::general_purpose::STANDARD.decode(payload.as_bytes())
            {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("undecodable data URI image: {e}");
                    return String::new();
                }
            };
            let original_name = format!("image.{extension}");
            let id = self.collected.add_image(ImageAsset {
                data,
                extension,
                original_name,
            });
            return collect::image_placeholder(id, &alt);
        }

        let src_lower = src.to_lowercase();
        if src_lower.starts_with("http://") || src_lower.starts_with("https://") {
            return format!(
                "<img src=\"{}\" alt=\"{}\">",
                util::escape_xml(&src),
                util::escape_xml(&alt)
            );
        }

        String::new()
    }
}

fn links_into_footnotes(handle: &Handle) -> bool {
    if let NodeData::Element { ref name, .. } = handle.data {
        if name.local.as_ref() == "a" {
            if let Some(href) = dom::get_attribute(handle, "href") {
                if href.contains("#fn") || href.contains("#footnote") {
                    return true;
                }
            }
        }
    }
    handle.children.borrow().iter().any(|child| links_into_footnotes(child))
}
