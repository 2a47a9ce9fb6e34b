//! # manuscript
//!
//! A library for importing OpenDocument Text files and pasted HTML
//! fragments into a normalized document record.
//!
//! ## Features
//!
//! - Read OpenDocument Text (`.odt`) containers
//! - Read pasted HTML fragments, however malformed
//! - Heuristic extraction of title, author and abstract
//! - Embedded images lifted into keyed assets behind `{{IMAGE_1}}` placeholders
//! - Footnotes collected into a numbered block with paired reference anchors
//!
//! ## Quick Start
//!
//! ```no_run
//! use manuscript::{read_odt, ImportOptions};
//!
//! let options = ImportOptions::default();
//! let doc = read_odt("paper.odt", &options).unwrap();
//! println!("{} by {}", doc.title, doc.author);
//! for (id, image) in &doc.images {
//!     std::fs::write(format!("image-{id}.{}", image.extension), &image.data).unwrap();
//! }
//! ```
//!
//! ## Import Options
//!
//! [`ImportOptions`] switches each extraction stage individually:
//!
//! ```
//! use manuscript::{read_html_fragment, ImportOptions};
//!
//! let options = ImportOptions {
//!     preserve_formatting: false,
//!     ..ImportOptions::default()
//! };
//! let doc = read_html_fragment("<h1>Notes</h1><p>Some <b>bold</b> text.</p>", &options).unwrap();
//! assert!(!doc.content.contains("<strong>"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod odt;

pub(crate) mod collect;
pub(crate) mod heuristics;
pub(crate) mod inline;
pub(crate) mod normalize;
pub(crate) mod util;

pub use config::ImportOptions;
pub use document::{Document, ImageAsset};
pub use error::{ContainerError, Error, Result};
pub use html::read_html_fragment;
pub use odt::{read_odt, read_odt_bytes, read_odt_from_reader};
