//! Error types for document ingestion.

use thiserror::Error;

/// Errors that can occur while opening an ODT container or reading its
/// XML payloads.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Unreadable archive: {0}")]
    Unreadable(#[from] zip::result::ZipError),

    #[error("Missing archive entry: {0}")]
    MissingEntry(String),

    #[error("Malformed XML in {entry}: {reason}")]
    MalformedXml { entry: String, reason: String },
}

/// Errors that can occur during document ingestion.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("No usable title found in document")]
    TitleExtractionFailed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
