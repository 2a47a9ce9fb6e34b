//! Import configuration.

/// Options controlling what the ingestion pipeline extracts.
///
/// Passed explicitly to every parse entry point; the engine never reads
/// configuration from any other source mid-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Derive the author from container metadata or prose heuristics.
    pub auto_extract_author: bool,

    /// Derive an abstract from the leading paragraphs.
    pub auto_extract_abstract: bool,

    /// Maximum number of paragraphs accumulated into the abstract.
    /// Values below 1 are treated as 1.
    pub abstract_max_paragraphs: usize,

    /// Extract embedded images and emit `{{IMAGE_N}}` placeholders.
    /// When false no assets are collected and no placeholders appear.
    pub import_images: bool,

    /// Append the trailing footnote block when footnotes were collected.
    pub import_footnotes: bool,

    /// Translate inline styling (bold, italic, underline, code) into
    /// canonical tags. When false, styled runs render as plain text.
    pub preserve_formatting: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            auto_extract_author: true,
            auto_extract_abstract: true,
            abstract_max_paragraphs: 3,
            import_images: true,
            import_footnotes: true,
            preserve_formatting: true,
        }
    }
}
