//! ODT ingestion tests.
//!
//! Every fixture is a zip archive assembled in memory, so the tests
//! exercise the real container path without fixture files on disk.

use std::io::{Cursor, Write};

use manuscript::{ContainerError, Error, ImportOptions, read_odt, read_odt_bytes};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot a real image";

fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).expect("Failed to add entry");
        zip.write_all(data).expect("Failed to write entry");
    }
    zip.finish().expect("Failed to finish archive").into_inner()
}

fn content_xml(body: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<office:document-content",
            " xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\"",
            " xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\"",
            " xmlns:table=\"urn:oasis:names:tc:opendocument:xmlns:table:1.0\"",
            " xmlns:draw=\"urn:oasis:names:tc:opendocument:xmlns:drawing:1.0\"",
            " xmlns:xlink=\"http://www.w3.org/1999/xlink\">",
            "<office:body><office:text>{}</office:text></office:body>",
            "</office:document-content>"
        ),
        body
    )
}

fn meta_xml(inner: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<office:document-meta",
            " xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\"",
            " xmlns:meta=\"urn:oasis:names:tc:opendocument:xmlns:meta:1.0\"",
            " xmlns:dc=\"http://purl.org/dc/elements/1.1/\">",
            "<office:meta>{}</office:meta>",
            "</office:document-meta>"
        ),
        inner
    )
}

fn simple_odt(body: &str) -> Vec<u8> {
    archive(&[("content.xml", content_xml(body).as_bytes())])
}

// ============================================================================
// Field extraction
// ============================================================================

#[test]
fn test_title_author_and_capped_abstract() {
    let bytes = simple_odt(concat!(
        "<text:p>My Title</text:p>",
        "<text:p>Author: Jane Doe</text:p>",
        "<text:p>This opening paragraph runs well past twenty characters.</text:p>",
        "<text:p>The second body paragraph also clears the length bar.</text:p>",
        "<text:p>A third qualifying paragraph that must not be accumulated.</text:p>",
    ));
    let options = ImportOptions {
        abstract_max_paragraphs: 2,
        ..ImportOptions::default()
    };
    let doc = read_odt_bytes(&bytes, &options).expect("Failed to read document");

    assert_eq!(doc.title, "My Title");
    assert_eq!(doc.author, "Jane Doe");
    assert_eq!(
        doc.abstract_text,
        "This opening paragraph runs well past twenty characters.\n\n\
         The second body paragraph also clears the length bar."
    );

    // The title line is reserved for the heuristics, everything after it
    // is content
    assert!(!doc.content.contains("<p>My Title</p>"), "Title line should not render");
    assert!(doc.content.contains("<p>Author: Jane Doe</p>"));
    assert!(doc.content.contains("<p>A third qualifying paragraph that must not be accumulated.</p>"));
}

#[test]
fn test_short_paragraph_never_reaches_abstract() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Tiny line here.</text:p>",
        "<text:p>This paragraph is comfortably long enough to qualify.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    // 15 characters falls under the 20-character floor
    assert_eq!(
        doc.abstract_text,
        "This paragraph is comfortably long enough to qualify."
    );
}

#[test]
fn test_author_from_bare_by_line_without_meta() {
    let bytes = simple_odt(concat!(
        "<text:p>A Study of Tides</text:p>",
        "<text:p>By John Smith</text:p>",
        "<text:p>Coastal measurements were collected over nine months.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.author, "John Smith");
}

#[test]
fn test_abstract_label_stripped_from_first_paragraph() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Abstract: The survey covers three decades of records.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.abstract_text, "The survey covers three decades of records.");
}

#[test]
fn test_extraction_switches_disable_fields() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Author: Jane Doe</text:p>",
        "<text:p>A body paragraph that is long enough for the abstract.</text:p>",
    ));
    let options = ImportOptions {
        auto_extract_author: false,
        auto_extract_abstract: false,
        ..ImportOptions::default()
    };
    let doc = read_odt_bytes(&bytes, &options).expect("Failed to read document");

    assert_eq!(doc.author, "");
    assert_eq!(doc.abstract_text, "");
}

#[test]
fn test_heading_becomes_title_over_first_paragraph() {
    let bytes = simple_odt(concat!(
        "<text:p>Not the title</text:p>",
        "<text:h text:outline-level=\"1\">The Real Title</text:h>",
        "<text:p>Body text follows the heading in this document.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.title, "The Real Title");
}

// ============================================================================
// Metadata author
// ============================================================================

#[test]
fn test_meta_creator_wins_over_heuristic() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<text:p>By John Smith</text:p>",
        "<text:p>Body long enough to be counted into the abstract.</text:p>",
    ));
    let meta = meta_xml("<dc:creator>Meta Author</dc:creator>");
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("meta.xml", meta.as_bytes()),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.author, "Meta Author");
}

#[test]
fn test_blank_creator_falls_back_to_initial_creator() {
    let content = content_xml("<text:p>Title</text:p>");
    let meta = meta_xml(concat!(
        "<dc:creator>  </dc:creator>",
        "<meta:initial-creator>First Author</meta:initial-creator>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("meta.xml", meta.as_bytes()),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.author, "First Author");
}

// ============================================================================
// Structure rendering
// ============================================================================

#[test]
fn test_headings_clamp_outline_levels() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:h text:outline-level=\"3\">Section</text:h>",
        "<text:h text:outline-level=\"9\">Deep</text:h>",
        "<text:h>Plain</text:h>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains("<h3>Section</h3>"));
    assert!(doc.content.contains("<h6>Deep</h6>"), "Level 9 should clamp to h6");
    assert!(doc.content.contains("<h1>Plain</h1>"), "Missing level should default to h1");
}

#[test]
fn test_nested_list_rendering() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:list>",
        "<text:list-item><text:p>Alpha</text:p></text:list-item>",
        "<text:list-item><text:p>Beta</text:p>",
        "<text:list><text:list-item><text:p>Nested</text:p></text:list-item></text:list>",
        "</text:list-item>",
        "</text:list>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains("<ul>\n<li>Alpha</li>\n<li>Beta<ul>\n<li>Nested</li>\n</ul></li>\n</ul>"));
}

#[test]
fn test_table_with_header_rows() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<table:table>",
        "<table:table-column/>",
        "<table:table-header-rows>",
        "<table:table-row><table:table-cell><text:p>Head</text:p></table:table-cell></table:table-row>",
        "</table:table-header-rows>",
        "<table:table-row><table:table-cell><text:p>Cell</text:p></table:table-cell></table:table-row>",
        "</table:table>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains(
        "<table>\n<tr>\n<td>Head</td>\n</tr>\n<tr>\n<td>Cell</td>\n</tr>\n</table>"
    ));
}

#[test]
fn test_inline_formatting_and_whitespace_controls() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>An <text:span text:style-name=\"Bold1\">urgent</text:span> word</text:p>",
        "<text:p>A<text:line-break/>B<text:tab/>C</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains("<p>An <strong>urgent</strong> word</p>"));
    assert!(doc.content.contains("A<br />B&nbsp;&nbsp;&nbsp;&nbsp;C"));
}

#[test]
fn test_plain_mode_drops_wrappers_keeps_text() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>An <text:span text:style-name=\"Italic\">aside</text:span> here</text:p>",
    ));
    let options = ImportOptions {
        preserve_formatting: false,
        ..ImportOptions::default()
    };
    let doc = read_odt_bytes(&bytes, &options).expect("Failed to read document");

    assert!(doc.content.contains("<p>An aside here</p>"));
    assert!(!doc.content.contains("<em>"));
}

#[test]
fn test_link_href_escaped() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>See <text:a xlink:href=\"https://example.com/?a=1&amp;b=2\">the site</text:a>.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains(
        "<a href=\"https://example.com/?a=1&amp;b=2\">the site</a>"
    ));
}

#[test]
fn test_annotations_are_not_content() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Kept text.</text:p>",
        "<office:annotation><text:p>Reviewer remark</text:p></office:annotation>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains("Kept text."));
    assert!(!doc.content.contains("Reviewer remark"));
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_embedded_image_extracted_with_placeholder() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/logo.png\"/></draw:frame>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/logo.png", PNG_BYTES),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[&1].data, PNG_BYTES);
    assert_eq!(doc.images[&1].extension, "png");
    assert_eq!(doc.images[&1].original_name, "logo.png");
    assert!(doc.content.contains("<p><img src=\"{{IMAGE_1}}\" alt=\"Image 1\"></p>"));
}

#[test]
fn test_inline_image_inside_paragraph() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Before <draw:frame><draw:image xlink:href=\"Pictures/p.png\"/></draw:frame> after</text:p>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/p.png", PNG_BYTES),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.content.contains("<p>Before <img src=\"{{IMAGE_1}}\" alt=\"Image 1\"> after</p>"));
}

#[test]
fn test_percent_encoded_image_href() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/my%20logo.png\"/></draw:frame>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/my logo.png", PNG_BYTES),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[&1].data, PNG_BYTES);
}

#[test]
fn test_extensionless_image_gets_sniffed_extension() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/chart\"/></draw:frame>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/chart", PNG_BYTES),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[&1].extension, "png");
    assert_eq!(doc.images[&1].original_name, "chart");
}

#[test]
fn test_extensionless_non_image_payload_refused() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/object1\"/></draw:frame>",
        "<text:p>Trailing text.</text:p>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/object1", b"\x00\x01embedded object payload" as &[u8]),
    ]);
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.images.is_empty());
    assert!(!doc.content.contains("{{IMAGE_"));
    assert!(doc.content.contains("Trailing text."));
}

#[test]
fn test_unlocatable_image_emits_nothing() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/gone.png\"/></draw:frame>",
        "<text:p>Trailing text.</text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.images.is_empty());
    assert!(!doc.content.contains("{{IMAGE_"), "No dangling placeholder allowed");
    assert!(doc.content.contains("Trailing text."));
}

#[test]
fn test_images_disabled() {
    let content = content_xml(concat!(
        "<text:p>Title</text:p>",
        "<draw:frame><draw:image xlink:href=\"Pictures/logo.png\"/></draw:frame>",
    ));
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("Pictures/logo.png", PNG_BYTES),
    ]);
    let options = ImportOptions {
        import_images: false,
        ..ImportOptions::default()
    };
    let doc = read_odt_bytes(&bytes, &options).expect("Failed to read document");

    assert!(doc.images.is_empty());
    assert!(!doc.content.contains("{{IMAGE_"));
}

// ============================================================================
// Footnotes
// ============================================================================

const NOTE_ONE: &str = concat!(
    "<text:note text:note-class=\"footnote\" text:id=\"ftn1\">",
    "<text:note-citation>1</text:note-citation>",
    "<text:note-body><text:p>First source.</text:p></text:note-body>",
    "</text:note>",
);

const NOTE_TWO: &str = concat!(
    "<text:note text:note-class=\"footnote\" text:id=\"ftn2\">",
    "<text:note-citation>2</text:note-citation>",
    "<text:note-body><text:p>Second source.</text:p></text:note-body>",
    "</text:note>",
);

#[test]
fn test_footnotes_anchors_and_trailing_block() {
    let bytes = simple_odt(&format!(
        "<text:p>Title</text:p><text:p>Claim one.{NOTE_ONE} Claim two.{NOTE_TWO}</text:p>"
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.footnotes.len(), 2);
    assert_eq!(doc.footnotes[&1], "First source.");
    assert_eq!(doc.footnotes[&2], "Second source.");

    assert!(doc.content.contains("<sup><a href=\"#fn-1\" id=\"fnref-1\">[1]</a></sup>"));
    assert!(doc.content.contains("<sup><a href=\"#fn-2\" id=\"fnref-2\">[2]</a></sup>"));
    assert!(doc.content.contains("<div class=\"footnotes\">"));
    assert!(doc.content.contains("<li id=\"fn-1\">First source. <a href=\"#fnref-1\">↩</a></li>"));
    assert!(doc.content.contains("<li id=\"fn-2\">Second source. <a href=\"#fnref-2\">↩</a></li>"));

    // The citation digit never renders outside the anchor
    assert!(!doc.content.contains("Claim one.1"));
}

#[test]
fn test_multi_paragraph_note_body_flattened() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Claim.<text:note text:note-class=\"footnote\">",
        "<text:note-citation>1</text:note-citation>",
        "<text:note-body><text:p>Part one.</text:p><text:p>Part two.</text:p></text:note-body>",
        "</text:note></text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert_eq!(doc.footnotes[&1], "Part one. Part two.");
}

#[test]
fn test_endnotes_dropped() {
    let bytes = simple_odt(concat!(
        "<text:p>Title</text:p>",
        "<text:p>Claim.<text:note text:note-class=\"endnote\">",
        "<text:note-citation>i</text:note-citation>",
        "<text:note-body><text:p>End matter.</text:p></text:note-body>",
        "</text:note></text:p>",
    ));
    let doc = read_odt_bytes(&bytes, &ImportOptions::default()).expect("Failed to read document");

    assert!(doc.footnotes.is_empty());
    assert!(!doc.content.contains("fnref"));
    assert!(!doc.content.contains("End matter."));
}

#[test]
fn test_footnote_block_suppressed_but_anchors_kept() {
    let bytes = simple_odt(&format!("<text:p>Title</text:p><text:p>Claim.{NOTE_ONE}</text:p>"));
    let options = ImportOptions {
        import_footnotes: false,
        ..ImportOptions::default()
    };
    let doc = read_odt_bytes(&bytes, &options).expect("Failed to read document");

    assert_eq!(doc.footnotes.len(), 1);
    assert!(doc.content.contains("<sup><a href=\"#fn-1\" id=\"fnref-1\">[1]</a></sup>"));
    assert!(!doc.content.contains("<div class=\"footnotes\">"));
}

// ============================================================================
// Container errors
// ============================================================================

#[test]
fn test_non_zip_bytes_are_unreadable() {
    let err = read_odt_bytes(b"definitely not a zip archive", &ImportOptions::default())
        .expect_err("Garbage bytes must not parse");
    assert!(matches!(
        err,
        Error::Container(ContainerError::Unreadable(_))
    ));
}

#[test]
fn test_missing_content_entry() {
    let bytes = archive(&[("mimetype", b"application/vnd.oasis.opendocument.text" as &[u8])]);
    let err = read_odt_bytes(&bytes, &ImportOptions::default())
        .expect_err("Archive without content.xml must not parse");
    match err {
        Error::Container(ContainerError::MissingEntry(entry)) => {
            assert_eq!(entry, "content.xml");
        }
        other => panic!("Expected MissingEntry, got {other:?}"),
    }
}

#[test]
fn test_malformed_content_xml() {
    let bytes = archive(&[("content.xml", b"<office:text><text:p></office:text>" as &[u8])]);
    let err = read_odt_bytes(&bytes, &ImportOptions::default())
        .expect_err("Mismatched tags must not parse");
    match err {
        Error::Container(ContainerError::MalformedXml { entry, .. }) => {
            assert_eq!(entry, "content.xml");
        }
        other => panic!("Expected MalformedXml, got {other:?}"),
    }
}

#[test]
fn test_malformed_meta_xml() {
    let content = content_xml("<text:p>Title</text:p>");
    let bytes = archive(&[
        ("content.xml", content.as_bytes()),
        ("meta.xml", b"<office:document-meta" as &[u8]),
    ]);
    let err = read_odt_bytes(&bytes, &ImportOptions::default())
        .expect_err("Truncated meta.xml must not parse");
    match err {
        Error::Container(ContainerError::MalformedXml { entry, .. }) => {
            assert_eq!(entry, "meta.xml");
        }
        other => panic!("Expected MalformedXml, got {other:?}"),
    }
}

#[test]
fn test_empty_body_fails_title_extraction() {
    let bytes = simple_odt("");
    let err = read_odt_bytes(&bytes, &ImportOptions::default())
        .expect_err("Document without any text must not parse");
    assert!(matches!(err, Error::TitleExtractionFailed));
}

// ============================================================================
// Path API
// ============================================================================

#[test]
fn test_read_odt_from_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("sample.odt");
    let bytes = simple_odt(concat!(
        "<text:p>On Disk</text:p>",
        "<text:p>A body paragraph stored in a real file on disk.</text:p>",
    ));
    std::fs::write(&path, &bytes).expect("Failed to write fixture");

    let doc = read_odt(&path, &ImportOptions::default()).expect("Failed to read from path");
    assert_eq!(doc.title, "On Disk");
}

#[test]
fn test_missing_file_is_io_error() {
    let err = read_odt("/nonexistent/sample.odt", &ImportOptions::default())
        .expect_err("Missing file must not parse");
    assert!(matches!(err, Error::Io(_)));
}
