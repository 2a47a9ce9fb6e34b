//! ODT structural tree walking.

use std::io::{Read, Seek};

use crate::collect::{self, Collected};
use crate::config::ImportOptions;
use crate::document::ImageAsset;
use crate::heuristics::DocumentText;
use crate::inline::InlineTag;
use crate::odt::container::OdtContainer;
use crate::odt::xml::{Ns, XmlElement, XmlNode};
use crate::util;

/// Element kinds the ODT walker distinguishes.
///
/// The set is closed: anything unclassified is `Descend`, a transparent
/// wrapper whose children are still visited, so an unrecognized tag never
/// silently drops content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OdtKind {
    Heading,
    Paragraph,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    TableHeaderRows,
    Span,
    Link,
    Note,
    LineBreak,
    Space,
    Tab,
    Frame,
    Image,
    /// Non-content: the element and its children are dropped.
    Skipped,
    /// Transparent wrapper: children are visited, the element is not.
    Descend,
}

fn classify(el: &XmlElement) -> OdtKind {
    match (el.ns, el.local.as_str()) {
        (Ns::Text, "h") => OdtKind::Heading,
        (Ns::Text, "p") => OdtKind::Paragraph,
        (Ns::Text, "list") => OdtKind::List,
        (Ns::Text, "list-item") => OdtKind::ListItem,
        (Ns::Table, "table") => OdtKind::Table,
        (Ns::Table, "table-row") => OdtKind::TableRow,
        (Ns::Table, "table-cell") => OdtKind::TableCell,
        (Ns::Table, "table-header-rows") => OdtKind::TableHeaderRows,
        (Ns::Text, "span") => OdtKind::Span,
        (Ns::Text, "a") => OdtKind::Link,
        (Ns::Text, "note") => OdtKind::Note,
        (Ns::Text, "line-break") => OdtKind::LineBreak,
        (Ns::Text, "s") => OdtKind::Space,
        (Ns::Text, "tab") => OdtKind::Tab,
        (Ns::Draw, "frame") => OdtKind::Frame,
        (Ns::Draw, "image") => OdtKind::Image,
        // Declarations, comments and change tracking are not prose
        (Ns::Table, "table-column") => OdtKind::Skipped,
        (Ns::Text, "tracked-changes") => OdtKind::Skipped,
        (Ns::Text, "sequence-decls") => OdtKind::Skipped,
        (Ns::Office, "annotation") => OdtKind::Skipped,
        (Ns::Office, "forms") => OdtKind::Skipped,
        _ => OdtKind::Descend,
    }
}

/// Recursive-descent renderer for the `office:text` body.
///
/// Holds the open container (for image entry reads), the injected
/// options, and the extraction state; the caller takes the state back
/// with [`OdtWalker::into_collected`] when the walk is done.
pub struct OdtWalker<'a, R: Read + Seek> {
    container: &'a mut OdtContainer<R>,
    options: &'a ImportOptions,
    collected: Collected,
}

impl<'a, R: Read + Seek> OdtWalker<'a, R> {
    pub fn new(container: &'a mut OdtContainer<R>, options: &'a ImportOptions) -> Self {
        Self {
            container,
            options,
            collected: Collected::new(),
        }
    }

    /// Render the document body to markup.
    ///
    /// The first element child is the title line; it is reserved for the
    /// field heuristics and never rendered into content.
    pub fn walk(&mut self, body: &XmlElement) -> String {
        let mut output = String::new();
        for el in body.child_elements().skip(1) {
            output.push_str(&self.render_block(el));
        }
        output
    }

    pub fn into_collected(self) -> Collected {
        self.collected
    }

    fn render_block(&mut self, el: &XmlElement) -> String {
        match classify(el) {
            OdtKind::Heading => {
                let level = heading_level(el);
                let inner = self.render_inline_children(el);
                if util::is_blank_markup(&inner) {
                    return String::new();
                }
                format!("<h{level}>{inner}</h{level}>\n\n")
            }
            OdtKind::Paragraph => {
                let inner = self.render_inline_children(el);
                if util::is_blank_markup(&inner) {
                    return String::new();
                }
                format!("<p>{inner}</p>\n\n")
            }
            OdtKind::List => {
                let items = self.render_list_items(el);
                format!("<ul>\n{items}</ul>\n\n")
            }
            OdtKind::Table => {
                let mut rows = String::new();
                for child in el.child_elements() {
                    match classify(child) {
                        OdtKind::TableRow => rows.push_str(&self.render_table_row(child)),
                        OdtKind::TableHeaderRows => {
                            for row in child.child_elements() {
                                if classify(row) == OdtKind::TableRow {
                                    rows.push_str(&self.render_table_row(row));
                                }
                            }
                        }
                        // table-column declarations carry no content
                        _ => {}
                    }
                }
                format!("<table>\n{rows}</table>\n\n")
            }
            OdtKind::Frame | OdtKind::Image => {
                let img = self.render_image(el);
                if img.is_empty() {
                    String::new()
                } else {
                    format!("<p>{img}</p>\n\n")
                }
            }
            OdtKind::Note => {
                let anchor = self.render_note(el);
                if anchor.is_empty() {
                    String::new()
                } else {
                    format!("<p>{anchor}</p>\n\n")
                }
            }
            OdtKind::Skipped => String::new(),
            // Sections and unknown containers are transparent at block
            // level; bare text under them is not content
            _ => {
                let mut out = String::new();
                for child in el.child_elements() {
                    out.push_str(&self.render_block(child));
                }
                out
            }
        }
    }

    fn render_list_items(&mut self, list: &XmlElement) -> String {
        let mut out = String::new();
        for item in list.child_elements() {
            if classify(item) != OdtKind::ListItem {
                continue;
            }
            let mut inner = String::new();
            for child in item.child_elements() {
                match classify(child) {
                    OdtKind::Paragraph | OdtKind::Heading => {
                        inner.push_str(&self.render_inline_children(child));
                    }
                    OdtKind::List => {
                        let nested = self.render_list_items(child);
                        inner.push_str(&format!("<ul>\n{nested}</ul>"));
                    }
                    _ => {}
                }
            }
            out.push_str(&format!("<li>{inner}</li>\n"));
        }
        out
    }

    fn render_table_row(&mut self, row: &XmlElement) -> String {
        let mut cells = String::new();
        for cell in row.child_elements() {
            if classify(cell) != OdtKind::TableCell {
                continue;
            }
            let mut inner = String::new();
            for block in cell.child_elements() {
                match classify(block) {
                    OdtKind::Paragraph | OdtKind::Heading => {
                        inner.push_str(&self.render_inline_children(block));
                    }
                    OdtKind::List => {
                        let nested = self.render_list_items(block);
                        inner.push_str(&format!("<ul>\n{nested}</ul>"));
                    }
                    _ => {}
                }
            }
            cells.push_str(&format!("<td>{inner}</td>\n"));
        }
        format!("<tr>\n{cells}</tr>\n")
    }

    fn render_inline_children(&mut self, el: &XmlElement) -> String {
        let mut out = String::new();
        for node in &el.children {
            match node {
                XmlNode::Text(text) => out.push_str(&util::escape_xml(text)),
                XmlNode::Element(child) => out.push_str(&self.render_inline_element(child)),
            }
        }
        out
    }

    fn render_inline_element(&mut self, el: &XmlElement) -> String {
        match classify(el) {
            OdtKind::Span => {
                let inner = self.render_inline_children(el);
                if !self.options.preserve_formatting {
                    return inner;
                }
                match el
                    .attr(Ns::Text, "style-name")
                    .and_then(InlineTag::from_style_name)
                {
                    Some(tag) => tag.wrap(&inner),
                    None => inner,
                }
            }
            OdtKind::Link => {
                let inner = self.render_inline_children(el);
                match el.attr(Ns::Xlink, "href") {
                    Some(href) if !href.is_empty() => {
                        format!("<a href=\"{}\">{inner}</a>", util::escape_xml(href))
                    }
                    _ => inner,
                }
            }
            OdtKind::Note => self.render_note(el),
            OdtKind::LineBreak => "<br />".to_string(),
            OdtKind::Tab => "&nbsp;&nbsp;&nbsp;&nbsp;".to_string(),
            OdtKind::Space => " ".repeat(space_count(el)),
            OdtKind::Frame | OdtKind::Image => self.render_image(el),
            OdtKind::Skipped => String::new(),
            // Unknown inline elements are transparent wrappers
            _ => self.render_inline_children(el),
        }
    }

    /// Rewrite a footnote as its reference anchor, collecting the body.
    /// Notes of any other class (endnotes) are dropped.
    fn render_note(&mut self, note: &XmlElement) -> String {
        if note.attr(Ns::Text, "note-class") != Some("footnote") {
            return String::new();
        }
        let Some(body) = note.child(Ns::Text, "note-body") else {
            return String::new();
        };
        let flattened = body
            .child_elements()
            .filter(|el| classify(el) == OdtKind::Paragraph)
            .map(plain_text)
            .collect::<Vec<_>>()
            .join(" ");
        let id = self
            .collected
            .add_footnote(util::escape_xml(flattened.trim()));
        collect::footnote_anchor(id)
    }

    /// Resolve a drawing frame to an extracted image placeholder.
    ///
    /// Unlocatable entry bytes degrade to no output at all, so a dangling
    /// placeholder is never emitted. Entries without a file extension are
    /// magic-sniffed; payloads that sniff as non-image (embedded objects)
    /// are refused the same way.
    fn render_image(&mut self, el: &XmlElement) -> String {
        if !self.options.import_images {
            return String::new();
        }
        let image_el = if el.is(Ns::Draw, "image") {
            Some(el)
        } else {
            el.descendant(Ns::Draw, "image")
        };
        let Some(image_el) = image_el else {
            return String::new();
        };
        let Some(href) = image_el.attr(Ns::Xlink, "href") else {
            return String::new();
        };
        let Some(data) = self.container.image_bytes(href) else {
            return String::new();
        };

        let original_name = href.rsplit('/').next().unwrap_or(href).to_string();
        let extension = match std::path::Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => ext.to_lowercase(),
            None => {
                let format = util::detect_media_format(href, &data);
                if !format.is_image() {
                    log::warn!("frame entry {href} is not a recognized image");
                    return String::new();
                }
                format.extension().to_string()
            }
        };

        let id = self.collected.add_image(ImageAsset {
            data,
            extension,
            original_name,
        });
        collect::image_placeholder(id, &format!("Image {id}"))
    }
}

/// Collect the plain-text outline of the whole body: first heading, every
/// paragraph, flattened body text. Runs over the full tree, independent of
/// the markup walk, so the heuristics also see the title line the walk
/// reserves.
pub fn collect_document_text(body: &XmlElement) -> DocumentText {
    let mut text = DocumentText::default();
    let mut blocks: Vec<String> = Vec::new();
    collect_outline(body, &mut text, &mut blocks);
    text.body_text = blocks.join("\n");
    text
}

fn collect_outline(el: &XmlElement, text: &mut DocumentText, blocks: &mut Vec<String>) {
    for child in el.child_elements() {
        match classify(child) {
            OdtKind::Heading => {
                let t = plain_text(child);
                if text.first_heading.is_none() {
                    text.first_heading = Some(t.clone());
                }
                blocks.push(t);
            }
            OdtKind::Paragraph => {
                let t = plain_text(child);
                text.paragraphs.push(t.clone());
                blocks.push(t);
            }
            OdtKind::Skipped => {}
            _ => collect_outline(child, text, blocks),
        }
    }
}

/// Flatten a run to plain text: expanded spaces and tabs, line breaks as
/// newlines, note bodies and non-content excluded.
fn plain_text(el: &XmlElement) -> String {
    let mut out = String::new();
    plain_text_into(el, &mut out);
    out
}

fn plain_text_into(el: &XmlElement, out: &mut String) {
    for node in &el.children {
        match node {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(child) => match classify(child) {
                OdtKind::Note | OdtKind::Skipped => {}
                OdtKind::Space => out.push_str(&" ".repeat(space_count(child))),
                OdtKind::Tab => out.push('\t'),
                OdtKind::LineBreak => out.push('\n'),
                _ => plain_text_into(child, out),
            },
        }
    }
}

fn space_count(el: &XmlElement) -> usize {
    // The count attribute is document-controlled; cap the expansion
    el.attr(Ns::Text, "c")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .min(1000)
}

fn heading_level(el: &XmlElement) -> u32 {
    el.attr(Ns::Text, "outline-level")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .clamp(1, 6)
}
