//! Inline formatting translation.
//!
//! Maps source-specific style markers onto the canonical inline vocabulary
//! used in normalized content. ODT styles are classified by substring of
//! the author-assigned style name; HTML source tags map directly.

/// Canonical inline emphasis tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineTag {
    Strong,
    Em,
    Underline,
    Del,
    Code,
}

impl InlineTag {
    /// Tag name emitted into normalized content.
    pub fn tag(self) -> &'static str {
        match self {
            InlineTag::Strong => "strong",
            InlineTag::Em => "em",
            InlineTag::Underline => "u",
            InlineTag::Del => "del",
            InlineTag::Code => "code",
        }
    }

    /// Classify an ODT text-style name.
    ///
    /// Style names are author-assigned ("Bold_20_Run", "MyItalicStyle");
    /// only a case-insensitive substring carries meaning. A name matching
    /// several families takes the first match in table order.
    pub fn from_style_name(name: &str) -> Option<InlineTag> {
        let lower = name.to_lowercase();
        if lower.contains("bold") || lower.contains("strong") {
            Some(InlineTag::Strong)
        } else if lower.contains("italic") || lower.contains("emphasis") {
            Some(InlineTag::Em)
        } else if lower.contains("underline") {
            Some(InlineTag::Underline)
        } else if lower.contains("code") || lower.contains("monospace") {
            Some(InlineTag::Code)
        } else {
            None
        }
    }

    /// Wrap already-rendered children in this tag pair.
    pub fn wrap(self, inner: &str) -> String {
        let tag = self.tag();
        format!("<{tag}>{inner}</{tag}>")
    }
}
