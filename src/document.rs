//! Normalized document model.

use std::collections::BTreeMap;

use crate::util;

/// A normalized document produced by one parse invocation.
///
/// Fully populated before it is returned; the engine never hands out a
/// partial document and never mutates one afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Document {
    /// Document title. Never empty: a parse that cannot find one fails
    /// with [`Error::TitleExtractionFailed`](crate::Error).
    pub title: String,

    /// Author name. Empty means unknown.
    pub author: String,

    /// Extracted abstract. Empty when disabled or when no paragraph
    /// qualified.
    #[cfg_attr(feature = "cli", serde(rename = "abstract"))]
    pub abstract_text: String,

    /// Canonical markup: headings, paragraphs, inline emphasis, links,
    /// lists, tables, image placeholders and footnote anchors.
    pub content: String,

    /// Extracted images keyed by placeholder id. Ids are contiguous from 1
    /// in discovery order, and every key appears in `content` exactly once
    /// as `{{IMAGE_<id>}}`.
    pub images: BTreeMap<u32, ImageAsset>,

    /// Collected footnote bodies keyed by reference id. Ids are contiguous
    /// from 1 in discovery order. The id space is independent of `images`.
    pub footnotes: BTreeMap<u32, String>,
}

/// A binary image asset extracted from the source document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ImageAsset {
    /// Raw image bytes.
    #[cfg_attr(feature = "cli", serde(skip_serializing))]
    pub data: Vec<u8>,

    /// Lowercase file extension without the leading dot (`png`, `jpg`).
    pub extension: String,

    /// Name the asset carried in the source: the archive entry's basename
    /// for ODT, `image.<ext>` for data URIs.
    pub original_name: String,
}

impl ImageAsset {
    /// MIME type for this asset, from the name's extension or, failing
    /// that, the leading bytes.
    pub fn mime_type(&self) -> &'static str {
        util::detect_media_format(&self.original_name, &self.data).mime_type()
    }
}
