//! Heuristic extraction of title, author and abstract.
//!
//! The heuristics run over a text outline collected from the full
//! structural tree, not over the generated markup, so they see every
//! paragraph even where the markup walk drops or rewrites elements.

use regex::Regex;

use crate::config::ImportOptions;
use crate::util;

/// Longest title taken from a paragraph or flattened body text, in bytes.
const TITLE_MAX_LEN: usize = 200;

/// Paragraphs shorter than this never qualify for the abstract.
const ABSTRACT_MIN_PARAGRAPH_LEN: usize = 20;

/// How many leading non-empty paragraphs the author scan inspects.
const AUTHOR_SCAN_WINDOW: usize = 5;

/// Plain-text outline of a parsed document.
#[derive(Debug, Default)]
pub struct DocumentText {
    /// Text of the first heading element in document order, if any.
    pub first_heading: Option<String>,

    /// Plain text of every paragraph, in document order.
    pub paragraphs: Vec<String>,

    /// Flattened text of the whole body.
    pub body_text: String,
}

/// How the abstract pass treats the first non-empty paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSkip {
    /// Always treat it as the title line (ODT: the walk already reserves
    /// the document's first element for the title).
    Always,

    /// Treat it as the title line only when it is short enough to have
    /// been chosen by the title rule (HTML).
    IfShort,
}

/// Title/author/abstract rules with their patterns compiled once.
pub struct FieldExtractor<'a> {
    options: &'a ImportOptions,
    re_author_labeled: Regex,
    re_author_by: Regex,
    re_author_line: Regex,
    re_lead_label: Regex,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(options: &'a ImportOptions) -> Self {
        Self {
            options,
            re_author_labeled: Regex::new(r"(?mi)^(?:Author|By|Written by):\s*(.+)$").unwrap(),
            re_author_by: Regex::new(r"(?mi)^By\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)$").unwrap(),
            re_author_line: Regex::new(r"(?i)^(?:Author|By|Written by):").unwrap(),
            re_lead_label: Regex::new(r"(?i)^(?:Abstract|Summary|Overview):\s*").unwrap(),
        }
    }

    /// Derive the title: first heading, else a short first paragraph,
    /// else the first non-empty line of the body text capped at
    /// [`TITLE_MAX_LEN`]. `None` means the document has no usable title
    /// and the parse must fail.
    pub fn title(&self, text: &DocumentText) -> Option<String> {
        if let Some(heading) = &text.first_heading {
            let heading = heading.trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }

        if let Some(para) = text.paragraphs.iter().find(|p| !p.trim().is_empty()) {
            let para = para.trim();
            if para.len() < TITLE_MAX_LEN {
                return Some(para.to_string());
            }
        }

        let line = text
            .body_text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())?;
        Some(util::truncate_bytes(line, TITLE_MAX_LEN).to_string())
    }

    /// Derive the author. Explicit metadata wins; otherwise the leading
    /// paragraphs are scanned, first for a labeled `Author:`/`By:` line
    /// anywhere in the window, then for a bare `By Firstname Lastname`
    /// line. Returns an empty string when nothing matches.
    pub fn author(&self, metadata_author: Option<&str>, text: &DocumentText) -> String {
        if !self.options.auto_extract_author {
            return String::new();
        }

        if let Some(meta) = metadata_author {
            let meta = meta.trim();
            if !meta.is_empty() {
                return meta.to_string();
            }
        }

        let window: Vec<&str> = text
            .paragraphs
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .take(AUTHOR_SCAN_WINDOW)
            .collect();

        for para in &window {
            if let Some(caps) = self.re_author_labeled.captures(para) {
                return caps[1].trim().to_string();
            }
        }
        for para in &window {
            if let Some(caps) = self.re_author_by.captures(para) {
                return caps[1].trim().to_string();
            }
        }

        String::new()
    }

    /// Derive the abstract from the leading paragraphs.
    ///
    /// Skips the title line, an author line in second position, and any
    /// paragraph under [`ABSTRACT_MIN_PARAGRAPH_LEN`] bytes; accumulates
    /// up to `abstract_max_paragraphs` paragraphs; strips a leading
    /// `Abstract:`/`Summary:`/`Overview:` label from the first one.
    pub fn abstract_text(&self, text: &DocumentText, title_skip: TitleSkip) -> String {
        if !self.options.auto_extract_abstract {
            return String::new();
        }

        let max = self.options.abstract_max_paragraphs.max(1);
        let mut accumulated: Vec<String> = Vec::new();
        let mut position = 0usize;

        for para in &text.paragraphs {
            let trimmed = para.trim();
            if trimmed.is_empty() {
                continue;
            }
            position += 1;

            if position == 1 {
                let is_title_line = match title_skip {
                    TitleSkip::Always => true,
                    TitleSkip::IfShort => trimmed.len() < TITLE_MAX_LEN,
                };
                if is_title_line {
                    continue;
                }
            }
            if position == 2 && self.re_author_line.is_match(trimmed) {
                continue;
            }
            if trimmed.len() < ABSTRACT_MIN_PARAGRAPH_LEN {
                continue;
            }

            accumulated.push(trimmed.to_string());
            if accumulated.len() >= max {
                break;
            }
        }

        if let Some(first) = accumulated.first_mut() {
            let stripped = self.re_lead_label.replace(first, "").trim().to_string();
            *first = stripped;
        }

        accumulated.join("\n\n")
    }
}
