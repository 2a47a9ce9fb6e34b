//! ODT zip container access.

use std::io::{Read, Seek};

use percent_encoding::percent_decode_str;
use zip::ZipArchive;

use crate::error::ContainerError;
use crate::util;

/// An opened ODT archive.
///
/// Stays open for the duration of one parse so image entries can be read
/// directly when the walker reaches their frames. Dropped (and the handle
/// released) before the parse call returns, on every path.
pub struct OdtContainer<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> OdtContainer<R> {
    /// Open the archive. Fails when the bytes are not a readable zip.
    pub fn open(reader: R) -> Result<Self, ContainerError> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// The body-content payload. Required in every ODT container.
    pub fn content_xml(&mut self) -> Result<String, ContainerError> {
        match self.read_entry_text("content.xml")? {
            Some(xml) => Ok(xml),
            None => Err(ContainerError::MissingEntry("content.xml".to_string())),
        }
    }

    /// The metadata payload. Optional: absence only disables
    /// metadata-sourced author lookup.
    pub fn meta_xml(&mut self) -> Result<Option<String>, ContainerError> {
        self.read_entry_text("meta.xml")
    }

    /// Best-effort read for image hrefs: absence and entry-level read
    /// failures degrade to `None` so one broken image never fails the
    /// whole parse.
    pub fn image_bytes(&mut self, href: &str) -> Option<Vec<u8>> {
        match self.entry_bytes(href) {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => {
                log::warn!("image entry not found in archive: {href}");
                None
            }
            Err(e) => {
                log::warn!("failed to read image entry {href}: {e}");
                None
            }
        }
    }

    /// Read an entry's raw bytes, trying the literal name first and a
    /// percent-decoded form second (hrefs may be URL-encoded while the
    /// archive stores the decoded name). `None` when the entry is absent.
    fn entry_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>, ContainerError> {
        match self.archive.by_name(path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)
                    .map_err(zip::result::ZipError::Io)?;
                return Ok(Some(bytes));
            }
            Err(zip::result::ZipError::FileNotFound) => {}
            Err(e) => return Err(ContainerError::Unreadable(e)),
        }

        if let Ok(decoded) = percent_decode_str(path).decode_utf8() {
            if decoded != path {
                match self.archive.by_name(&decoded) {
                    Ok(mut file) => {
                        let mut bytes = Vec::new();
                        file.read_to_end(&mut bytes)
                            .map_err(zip::result::ZipError::Io)?;
                        return Ok(Some(bytes));
                    }
                    Err(zip::result::ZipError::FileNotFound) => {}
                    Err(e) => return Err(ContainerError::Unreadable(e)),
                }
            }
        }

        Ok(None)
    }

    fn read_entry_text(&mut self, name: &str) -> Result<Option<String>, ContainerError> {
        let Some(bytes) = self.entry_bytes(name)? else {
            return Ok(None);
        };
        let encoding = util::extract_xml_encoding(&bytes);
        Ok(Some(util::decode_text(&bytes, encoding).into_owned()))
    }
}
