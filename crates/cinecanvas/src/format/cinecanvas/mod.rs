//! CineCanvas XML subtitle format
//!
//! Reading and writing DCSubtitle documents for Digital Cinema Packages.
//! Selection is by `xml` extension plus a root-element sniff, since plenty
//! of other subtitle formats also live in `.xml` files.

mod reader;
mod writer;

use crate::ass::AssDocument;
use crate::error::{CodecError, Result};
use crate::format::SubtitleFormat;
use crate::settings::ExportSettings;
use crate::time::Framerate;
use crate::xml::XmlElement;
use std::fs;
use std::path::Path;

/// CineCanvas XML format handler
#[derive(Debug, Default)]
pub struct CineCanvasFormat;

impl CineCanvasFormat {
    /// Create a new handler
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a CineCanvas document from a string
    pub fn read_from_str(&self, content: &str, _fps: &Framerate) -> Result<AssDocument> {
        let root = XmlElement::parse_document(content)
            .map_err(|e| CodecError::parse(format!("failed to load CineCanvas XML: {e}")))?;
        reader::document_from_xml(&root)
    }

    /// Serialize a document to a CineCanvas XML string
    ///
    /// Times are quantized against the settings' frame rate.
    #[must_use]
    pub fn write_to_string(&self, doc: &AssDocument, settings: &ExportSettings) -> String {
        writer::document_to_xml(doc, settings).to_document_string()
    }

    /// Write a document to `path` using explicit export settings
    pub fn write_with_settings(
        &self,
        doc: &AssDocument,
        path: &Path,
        settings: &ExportSettings,
    ) -> Result<()> {
        let content = self.write_to_string(doc, settings);
        fs::write(path, content)
            .map_err(|e| CodecError::write(format!("failed to write {}: {e}", path.display())))
    }
}

impl SubtitleFormat for CineCanvasFormat {
    fn name(&self) -> &'static str {
        "CineCanvas XML"
    }

    fn read_wildcards(&self) -> &[&str] {
        &["xml"]
    }

    fn write_wildcards(&self) -> &[&str] {
        &["xml"]
    }

    /// Accept only `.xml` files whose root element is `<DCSubtitle>`
    ///
    /// Any IO or parse failure during the sniff declines silently.
    fn can_read(&self, path: &Path) -> bool {
        if !crate::format::has_any_extension(path, self.read_wildcards()) {
            return false;
        }
        let Ok(content) = fs::read_to_string(path) else {
            return false;
        };
        XmlElement::parse_document(&content)
            .map(|root| root.name == "DCSubtitle")
            .unwrap_or(false)
    }

    fn can_write(&self, _doc: &AssDocument) -> bool {
        true
    }

    fn read(&self, path: &Path, fps: &Framerate) -> Result<AssDocument> {
        let content = fs::read_to_string(path).map_err(|e| {
            CodecError::parse(format!("failed to load CineCanvas XML file: {e}"))
        })?;
        self.read_from_str(&content, fps)
    }

    fn write(&self, doc: &AssDocument, path: &Path, fps: &Framerate) -> Result<()> {
        let settings = ExportSettings::new(path, fps);
        self.write_with_settings(doc, path, &settings)
    }
}
