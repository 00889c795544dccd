//! # CineCanvas
//!
//! Reader and writer for CineCanvas XML, the Digital Cinema Package (DCP)
//! subtitle format, against an ASS-shaped in-memory document model.
//!
//! The format pairs `<DCSubtitle>` documents with typography carried on
//! `<Font>`/`<Text>` elements. Going out, ASS inline override tags
//! (`{\b1}`, `\fs`, `\1c`, `\fad(...)`) decompose into nested `<Font>`
//! runs, `\N` line breaks become stacked `<Text>` elements positioned via
//! `VPosition`, and times snap to the target frame rate. Coming in, the
//! inheritance chain (container font, per-subtitle overrides, inline runs)
//! flattens onto a single synthesized style plus tagged event text.
//!
//! # Quick Start
//!
//! ```
//! use cinecanvas::{
//!     AssDocument, CineCanvasFormat, DialogueEvent, ExportSettings, Style, Time,
//! };
//!
//! let mut doc = AssDocument::new();
//! doc.styles.push(Style::default());
//! doc.events.push(DialogueEvent::new(
//!     Time::from_ms(1000),
//!     Time::from_ms(3000),
//!     "Default",
//!     r"Hello {\b1}cinema{\b0}!",
//! ));
//!
//! let format = CineCanvasFormat::new();
//! let xml = format.write_to_string(&doc, &ExportSettings::default());
//! assert!(xml.contains("<DCSubtitle Version=\"1.0\">"));
//!
//! let read_back = format
//!     .read_from_str(&xml, &cinecanvas::Framerate::unloaded())
//!     .unwrap();
//! assert_eq!(read_back.events.len(), 1);
//! ```
//!
//! File-level entry points live on [`FormatRegistry`], which picks a format
//! by extension and content sniff the way an editor's open/save dialogs do.
//!
//! The codec is synchronous and holds no shared state; concurrent
//! invocations on independent documents are safe.

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod ass;
pub mod color;
pub mod error;
pub mod format;
pub mod props;
pub mod settings;
pub mod tags;
pub mod time;
pub mod xml;

pub use ass::{AssDocument, DialogueEvent, Style};
pub use color::Rgba;
pub use error::{CodecError, Result};
pub use format::{CineCanvasFormat, FormatRegistry, SubtitleFormat};
pub use props::FontProps;
pub use settings::{ExportSettings, FrameRateChoice};
pub use tags::StyledSegment;
pub use time::{Framerate, Time};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
