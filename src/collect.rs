//! Extraction state threaded through the structural walkers.
//!
//! Images and footnotes are discovered mid-walk but delivered as ordered
//! maps on the final document. `Collected` owns the accumulators, assigns
//! the sequential ids, and emits the markup that references them, so every
//! id in the output has exactly one entry here.

use std::collections::BTreeMap;

use crate::document::ImageAsset;
use crate::util;

/// Images and footnotes gathered during one walk.
///
/// Owned by the walker for the duration of a single parse and converted
/// into the document's maps afterwards. Ids are assigned in discovery
/// order starting at 1; the two id spaces are independent.
#[derive(Debug, Default)]
pub struct Collected {
    images: Vec<ImageAsset>,
    footnotes: Vec<String>,
}

impl Collected {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an extracted image and return its assigned id.
    pub fn add_image(&mut self, asset: ImageAsset) -> u32 {
        self.images.push(asset);
        self.images.len() as u32
    }

    /// Store a footnote body and return its assigned id.
    pub fn add_footnote(&mut self, body: String) -> u32 {
        self.footnotes.push(body);
        self.footnotes.len() as u32
    }

    pub fn has_footnotes(&self) -> bool {
        !self.footnotes.is_empty()
    }

    /// Render the trailing footnote block: an ordered list of collected
    /// bodies, each with a back-reference to its in-text anchor.
    pub fn footnote_block(&self) -> String {
        let mut block = String::from("<div class=\"footnotes\">\n<hr />\n<ol>\n");
        for (i, body) in self.footnotes.iter().enumerate() {
            let id = i + 1;
            block.push_str(&format!(
                "<li id=\"fn-{id}\">{body} <a href=\"#fnref-{id}\">↩</a></li>\n"
            ));
        }
        block.push_str("</ol>\n</div>");
        block
    }

    /// Convert the accumulators into the document's ordered maps.
    pub fn into_parts(self) -> (BTreeMap<u32, ImageAsset>, BTreeMap<u32, String>) {
        let images = (1u32..).zip(self.images).collect();
        let footnotes = (1u32..).zip(self.footnotes).collect();
        (images, footnotes)
    }
}

/// Placeholder markup for an extracted image. The `{{IMAGE_N}}` token is
/// substituted with the persisted asset's address downstream.
pub fn image_placeholder(id: u32, alt: &str) -> String {
    let alt = util::escape_xml(alt);
    format!("<img src=\"{{{{IMAGE_{id}}}}}\" alt=\"{alt}\">")
}

/// In-text reference anchor for a footnote. Pairs with the `fn-N` list
/// item emitted by [`Collected::footnote_block`].
pub fn footnote_anchor(id: u32) -> String {
    format!("<sup><a href=\"#fn-{id}\" id=\"fnref-{id}\">[{id}]</a></sup>")
}
