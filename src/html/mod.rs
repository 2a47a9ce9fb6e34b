//! HTML fragment ingestion.
//!
//! Pasted fragments are parsed with a real HTML5 tree builder, so
//! unclosed tags, stray markup and partial documents all produce a
//! well-formed tree instead of an error. The walker rewrites the tree
//! into canonical markup while extracting data-URI images and footnote
//! superscripts, the field heuristics run over the text outline, and
//! the normalizer strips presentational attributes from the result.

use crate::collect::Collected;
use crate::config::ImportOptions;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::heuristics::{DocumentText, FieldExtractor, TitleSkip};
use crate::normalize::Normalizer;

mod dom;
mod walker;

use markup5ever_rcdom::Handle;
use walker::HtmlWalker;

/// Read a document from a pasted HTML fragment.
///
/// # Example
///
/// ```
/// let options = manuscript::ImportOptions::default();
/// let doc = manuscript::read_html_fragment(
///     "<h1>On Gardens</h1><p>A short essay about walled gardens.</p>",
///     &options,
/// ).unwrap();
/// assert_eq!(doc.title, "On Gardens");
/// ```
pub fn read_html_fragment(html: &str, options: &ImportOptions) -> Result<Document> {
    let parsed = dom::parse_fragment(html);
    let body = dom::find_first_element(&parsed.document, "body");

    let (markup, text, collected) = match body {
        Some(ref body) => {
            let text = collect_document_text(body);
            let mut walker = HtmlWalker::new(options);
            let markup = walker.walk(body);
            (markup, text, walker.into_collected())
        }
        None => {
            log::debug!("parsed fragment has no body element");
            (String::new(), DocumentText::default(), Collected::new())
        }
    };

    let metadata_author = metadata_author(&parsed.document);

    let extractor = FieldExtractor::new(options);
    let title = extractor.title(&text).ok_or(Error::TitleExtractionFailed)?;
    let author = extractor.author(metadata_author.as_deref(), &text);
    let abstract_text = extractor.abstract_text(&text, TitleSkip::IfShort);

    let mut assembled = markup;
    if collected.has_footnotes() && options.import_footnotes {
        assembled.push_str(&collected.footnote_block());
    }
    let content = Normalizer::new(true).apply(&assembled);

    let (images, footnotes) = collected.into_parts();
    Ok(Document {
        title,
        author,
        abstract_text,
        content,
        images,
        footnotes,
    })
}

/// Plain-text outline of the fragment body for the field heuristics.
fn collect_document_text(body: &Handle) -> DocumentText {
    let first_heading = dom::find_first_of(body, &["h1", "h2", "h3", "h4", "h5", "h6"])
        .map(|heading| dom::get_text_content(&heading));

    let paragraphs = dom::find_all_elements(body, "p")
        .iter()
        .map(dom::get_text_content)
        .collect();

    DocumentText {
        first_heading,
        paragraphs,
        body_text: dom::get_text_content(body),
    }
}

/// Author from `<meta name="author" content="...">`, wherever the tree
/// builder placed it. Blank content counts as absent.
fn metadata_author(document: &Handle) -> Option<String> {
    for meta in dom::find_all_elements(document, "meta") {
        let is_author = dom::get_attribute(&meta, "name")
            .is_some_and(|name| name.eq_ignore_ascii_case("author"));
        if !is_author {
            continue;
        }
        if let Some(content) = dom::get_attribute(&meta, "content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    None
}
