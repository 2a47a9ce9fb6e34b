//! Final content cleanup.

use regex::{Captures, Regex};

/// Deterministic cleanup applied once to the fully assembled content
/// string, footnote block included.
///
/// Passes run in a fixed order: newline collapse, empty-paragraph removal,
/// attribute stripping (HTML-sourced content only), horizontal-whitespace
/// collapse, final trim.
pub struct Normalizer {
    strip_attributes: bool,
    re_newlines: Regex,
    re_empty_paragraph: Regex,
    re_style_attr: Regex,
    re_class_attr: Regex,
    re_hspace: Regex,
}

impl Normalizer {
    /// Build the pipeline. `strip_attributes` is set on the HTML path,
    /// where pasted fragments carry editor style/class baggage.
    pub fn new(strip_attributes: bool) -> Self {
        Self {
            strip_attributes,
            re_newlines: Regex::new(r"\n{3,}").unwrap(),
            re_empty_paragraph: Regex::new(r"<p>\s*</p>").unwrap(),
            re_style_attr: Regex::new(r#" style="[^"]*""#).unwrap(),
            re_class_attr: Regex::new(r#" class="([^"]*)""#).unwrap(),
            re_hspace: Regex::new(r"[ \t]+").unwrap(),
        }
    }

    pub fn apply(&self, content: &str) -> String {
        let mut result = self.re_newlines.replace_all(content, "\n\n").into_owned();
        result = self.re_empty_paragraph.replace_all(&result, "").into_owned();

        if self.strip_attributes {
            result = self.re_style_attr.replace_all(&result, "").into_owned();
            // class attributes are dropped, except the reserved class that
            // marks the footnote block
            result = self
                .re_class_attr
                .replace_all(&result, |caps: &Captures| {
                    if &caps[1] == "footnotes" {
                        caps[0].to_string()
                    } else {
                        String::new()
                    }
                })
                .into_owned();
        }

        result = self.re_hspace.replace_all(&result, " ").into_owned();
        result.trim().to_string()
    }
}
