//! OpenDocument Text ingestion.
//!
//! An ODT file is a zip container holding `content.xml` (the body) and
//! optionally `meta.xml` (document metadata). The pipeline opens the
//! container, parses both payloads into namespace-resolved trees, walks
//! the body into canonical markup while extracting images and footnotes,
//! runs the field heuristics over the full text outline, and assembles
//! the normalized document.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::collect::Collected;
use crate::config::ImportOptions;
use crate::document::Document;
use crate::error::{ContainerError, Error, Result};
use crate::heuristics::{DocumentText, FieldExtractor, TitleSkip};
use crate::normalize::Normalizer;

mod container;
mod walker;
mod xml;

use container::OdtContainer;
use walker::{OdtWalker, collect_document_text};
use xml::{Ns, XmlElement, parse_tree};

/// Read an ODT document from a file path.
///
/// # Example
///
/// ```no_run
/// let options = manuscript::ImportOptions::default();
/// let doc = manuscript::read_odt("paper.odt", &options).unwrap();
/// println!("{} by {}", doc.title, doc.author);
/// ```
pub fn read_odt<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Document> {
    let file = File::open(path)?;
    read_odt_from_reader(file, options)
}

/// Read an ODT document from an in-memory byte slice.
pub fn read_odt_bytes(bytes: &[u8], options: &ImportOptions) -> Result<Document> {
    read_odt_from_reader(Cursor::new(bytes), options)
}

/// Read an ODT document from any seekable byte source.
///
/// The archive handle lives inside this call and is released on every
/// path, success or failure, before it returns.
pub fn read_odt_from_reader<R: Read + Seek>(
    reader: R,
    options: &ImportOptions,
) -> Result<Document> {
    let mut container = OdtContainer::open(reader)?;

    let content_xml = container.content_xml()?;
    let content_root = parse_tree(&content_xml).map_err(|reason| ContainerError::MalformedXml {
        entry: "content.xml".to_string(),
        reason,
    })?;

    let metadata_author = match container.meta_xml()? {
        Some(meta_xml) => {
            let meta_root = parse_tree(&meta_xml).map_err(|reason| ContainerError::MalformedXml {
                entry: "meta.xml".to_string(),
                reason,
            })?;
            metadata_author(&meta_root)
        }
        None => None,
    };

    let body = content_root
        .child(Ns::Office, "body")
        .and_then(|body| body.child(Ns::Office, "text"));

    let (markup, text, collected) = match body {
        Some(body_text) => {
            let text = collect_document_text(body_text);
            let mut walker = OdtWalker::new(&mut container, options);
            let markup = walker.walk(body_text);
            (markup, text, walker.into_collected())
        }
        None => {
            log::debug!("content.xml has no office:text body");
            (String::new(), DocumentText::default(), Collected::new())
        }
    };

    let extractor = FieldExtractor::new(options);
    let title = extractor.title(&text).ok_or(Error::TitleExtractionFailed)?;
    let author = extractor.author(metadata_author.as_deref(), &text);
    let abstract_text = extractor.abstract_text(&text, TitleSkip::Always);

    let mut assembled = markup;
    if collected.has_footnotes() && options.import_footnotes {
        assembled.push_str(&collected.footnote_block());
    }
    let content = Normalizer::new(false).apply(&assembled);

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

/// Author from document metadata: `dc:creator`, falling back to
/// `meta:initial-creator`. Blank values count as absent.
fn metadata_author(meta_root: &XmlElement) -> Option<String> {
    let creator = meta_root
        .descendant(Ns::Dc, "creator")
        .map(|el| el.text())
        .filter(|t| !t.trim().is_empty());
    if creator.is_some() {
        return creator;
    }
    meta_root
        .descendant(Ns::Meta, "initial-creator")
        .map(|el| el.text())
        .filter(|t| !t.trim().is_empty())
}
