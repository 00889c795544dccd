//! Subtitle format registration and dispatch
//!
//! A [`SubtitleFormat`] bundles reader and writer for one on-disk format;
//! the [`FormatRegistry`] picks a handler for a path by extension wildcard
//! plus each format's own content sniff. Formats that decline selection do
//! so silently; errors only surface once a format has accepted a file.

pub mod cinecanvas;

use crate::ass::AssDocument;
use crate::error::{CodecError, Result};
use crate::time::Framerate;
use std::fmt;
use std::path::Path;

pub use cinecanvas::CineCanvasFormat;

/// A bidirectional subtitle format handler
pub trait SubtitleFormat: fmt::Debug {
    /// Human-readable format name
    fn name(&self) -> &'static str;

    /// File extensions this format can read
    fn read_wildcards(&self) -> &[&str];

    /// File extensions this format can write
    fn write_wildcards(&self) -> &[&str];

    /// Whether this format will read the given file
    ///
    /// The default checks the extension against [`read_wildcards`]
    /// (ASCII case-insensitive); formats sharing an extension with other
    /// formats additionally sniff the content.
    ///
    /// [`read_wildcards`]: Self::read_wildcards
    fn can_read(&self, path: &Path) -> bool {
        has_any_extension(path, self.read_wildcards())
    }

    /// Whether this format can represent the given document
    fn can_write(&self, doc: &AssDocument) -> bool;

    /// Read a file into a fresh document
    fn read(&self, path: &Path, fps: &Framerate) -> Result<AssDocument>;

    /// Write a document to a file
    fn write(&self, doc: &AssDocument, path: &Path, fps: &Framerate) -> Result<()>;
}

/// Case-insensitive extension match against a wildcard list
#[must_use]
pub fn has_any_extension(path: &Path, wildcards: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| wildcards.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Registry of available subtitle formats
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<Box<dyn SubtitleFormat>>,
}

impl FormatRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in format registered
    #[must_use]
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CineCanvasFormat::new()));
        registry
    }

    /// Register a format
    pub fn register(&mut self, format: Box<dyn SubtitleFormat>) {
        self.formats.push(format);
    }

    /// First format accepting the file for reading
    #[must_use]
    pub fn find_reader(&self, path: &Path) -> Option<&dyn SubtitleFormat> {
        self.formats
            .iter()
            .map(Box::as_ref)
            .find(|format| format.can_read(path))
    }

    /// First format accepting the path and document for writing
    #[must_use]
    pub fn find_writer(&self, doc: &AssDocument, path: &Path) -> Option<&dyn SubtitleFormat> {
        self.formats
            .iter()
            .map(Box::as_ref)
            .find(|format| has_any_extension(path, format.write_wildcards()) && format.can_write(doc))
    }

    /// Read a file with the first accepting format
    pub fn read_file(&self, path: &Path, fps: &Framerate) -> Result<AssDocument> {
        let format = self
            .find_reader(path)
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;
        format.read(path, fps)
    }

    /// Write a document with the first accepting format
    pub fn write_file(&self, doc: &AssDocument, path: &Path, fps: &Framerate) -> Result<()> {
        let format = self
            .find_writer(doc, path)
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;
        format.write(doc, path, fps)
    }
}
