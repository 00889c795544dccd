//! Minimal ASS-shaped document model
//!
//! The editor-facing representation the codec reads into and writes from:
//! ordered script-info pairs, a style list and an event list. This is a
//! built model, not a parsed one, so fields are owned values rather than
//! source spans; parsing and serializing `.ass` text is out of scope.

pub mod normalize;

use crate::color::Rgba;
use crate::time::Time;

/// Style definition referenced by events
///
/// Carries the subset of ASS style fields with a CineCanvas analog plus the
/// layout fields the reader synthesizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style name (unique within a document)
    pub name: String,

    /// Font family name
    pub font: String,

    /// Font size in points
    pub font_size: u32,

    /// Bold flag
    pub bold: bool,

    /// Italic flag
    pub italic: bool,

    /// Primary fill color
    pub primary: Rgba,

    /// Outline color
    pub outline: Rgba,

    /// Outline width in pixels; zero means no border
    pub outline_width: f64,

    /// Numpad alignment code (2 = bottom center)
    pub alignment: u8,

    /// Left margin in pixels
    pub margin_l: u32,

    /// Right margin in pixels
    pub margin_r: u32,

    /// Vertical margin in pixels
    pub margin_v: u32,
}

impl Default for Style {
    /// Standard default style: Arial 48, white on black border
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font: "Arial".to_string(),
            font_size: 48,
            bold: false,
            italic: false,
            primary: Rgba::WHITE,
            outline: Rgba::BLACK,
            outline_width: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
        }
    }
}

/// Dialogue event on the subtitle timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    /// Start time
    pub start: Time,

    /// End time
    pub end: Time,

    /// Name of the style this event renders with
    pub style: String,

    /// Text, possibly containing override tags and `\N` separators
    pub text: String,

    /// Comment events are skipped during playback and export
    pub comment: bool,
}

impl Default for DialogueEvent {
    /// Empty five-second line, the editor model's default event
    fn default() -> Self {
        Self {
            start: Time::ZERO,
            end: Time::from_ms(5000),
            style: "Default".to_string(),
            text: String::new(),
            comment: false,
        }
    }
}

impl DialogueEvent {
    /// Create a dialogue event with the given timing and text
    #[must_use]
    pub fn new(start: Time, end: Time, style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            style: style.into(),
            text: text.into(),
            comment: false,
        }
    }
}

/// An ASS-shaped subtitle document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssDocument {
    script_info: Vec<(String, String)>,
    pub styles: Vec<Style>,
    pub events: Vec<DialogueEvent>,
}

impl AssDocument {
    /// Empty document with no styles or events
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document seeded with the standard "Default" style and no events
    #[must_use]
    pub fn load_default() -> Self {
        Self {
            script_info: vec![("ScriptType".to_string(), "v4.00+".to_string())],
            styles: vec![Style::default()],
            events: Vec::new(),
        }
    }

    /// Set a script-info value, replacing any existing entry for the key
    pub fn set_script_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.script_info.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.script_info.push((key, value)),
        }
    }

    /// Look up a script-info value
    #[must_use]
    pub fn script_info(&self, key: &str) -> Option<&str> {
        self.script_info
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Find a style by name
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Remove every style with the given name
    pub fn remove_style(&mut self, name: &str) {
        self.styles.retain(|s| s.name != name);
    }
}
