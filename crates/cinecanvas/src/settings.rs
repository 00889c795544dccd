//! Export configuration, validation and pre-flight analysis
//!
//! All values here are DCP-specific and none bind to stored preferences;
//! hosts construct an [`ExportSettings`] per export (usually via
//! [`ExportSettings::new`]) and may overwrite fields collected from their
//! own UI. Every validator clamps or replaces, it never errors, and the
//! pre-flight analyzer produces human-readable warnings that never block
//! an export.

use crate::ass::AssDocument;
use crate::time::Framerate;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Smallest accepted font size in points
pub const MIN_FONT_SIZE: u32 = 10;
/// Largest accepted font size in points
pub const MAX_FONT_SIZE: u32 = 72;
/// Smallest accepted reel number
pub const MIN_REEL_NUMBER: i32 = 1;
/// Smallest accepted fade duration in milliseconds
pub const MIN_FADE_DURATION: i64 = 0;

/// Default font size in points
pub const DEFAULT_FONT_SIZE: u32 = 42;
/// Default fade duration in milliseconds
pub const DEFAULT_FADE_DURATION: i64 = 20;
/// Default movie title when none can be derived
pub const DEFAULT_MOVIE_TITLE: &str = "Untitled";
/// Default ISO 639 language code
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Placeholder SubtitleID used when the host supplies no UUID source
pub const PLACEHOLDER_SUBTITLE_ID: &str = "urn:uuid:00000000-0000-0000-0000-000000000000";

/// The discrete frame rates DCP subtitles may target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameRateChoice {
    /// 23.976 fps (Cinema)
    Fps23_976,
    /// 24 fps (Cinema)
    #[default]
    Fps24,
    /// 25 fps (PAL)
    Fps25,
    /// 29.97 fps (NTSC)
    Fps29_97,
    /// 30 fps
    Fps30,
    /// 48 fps (HFR Cinema)
    Fps48,
    /// 50 fps (HFR PAL)
    Fps50,
    /// 59.94 fps (HFR NTSC)
    Fps59_94,
    /// 60 fps (HFR)
    Fps60,
}

impl FrameRateChoice {
    /// All supported choices, in ascending rate order
    pub const ALL: [Self; 9] = [
        Self::Fps23_976,
        Self::Fps24,
        Self::Fps25,
        Self::Fps29_97,
        Self::Fps30,
        Self::Fps48,
        Self::Fps50,
        Self::Fps59_94,
        Self::Fps60,
    ];

    /// The rational frame rate this choice stands for
    #[must_use]
    pub const fn framerate(self) -> Framerate {
        match self {
            Self::Fps23_976 => Framerate::new(24000, 1001),
            Self::Fps24 => Framerate::new(24, 1),
            Self::Fps25 => Framerate::new(25, 1),
            Self::Fps29_97 => Framerate::new(30000, 1001),
            Self::Fps30 => Framerate::new(30, 1),
            Self::Fps48 => Framerate::new(48, 1),
            Self::Fps50 => Framerate::new(50, 1),
            Self::Fps59_94 => Framerate::new(60000, 1001),
            Self::Fps60 => Framerate::new(60, 1),
        }
    }

    /// Nominal rate as a float, for display and matching
    #[must_use]
    pub const fn nominal_fps(self) -> f64 {
        match self {
            Self::Fps23_976 => 23.976,
            Self::Fps24 => 24.0,
            Self::Fps25 => 25.0,
            Self::Fps29_97 => 29.97,
            Self::Fps30 => 30.0,
            Self::Fps48 => 48.0,
            Self::Fps50 => 50.0,
            Self::Fps59_94 => 59.94,
            Self::Fps60 => 60.0,
        }
    }

    /// Closest choice for a video frame rate, within 0.1 fps
    ///
    /// An unloaded rate or one matching nothing defaults to 24 fps.
    #[must_use]
    pub fn from_framerate(fps: &Framerate) -> Self {
        if !fps.is_loaded() {
            return Self::Fps24;
        }
        let rate = fps.fps();
        Self::ALL
            .into_iter()
            .find(|choice| (rate - choice.nominal_fps()).abs() < 0.1)
            .unwrap_or(Self::Fps24)
    }
}

/// Per-export configuration for the CineCanvas writer
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub frame_rate: FrameRateChoice,
    pub movie_title: String,
    pub reel_number: i32,
    pub language_code: String,
    pub include_font_reference: bool,
    pub font_uri: String,
    /// Value of the emitted `<SubtitleID>` element
    pub subtitle_id: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            frame_rate: FrameRateChoice::Fps24,
            movie_title: DEFAULT_MOVIE_TITLE.to_string(),
            reel_number: 1,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            include_font_reference: false,
            font_uri: String::new(),
            subtitle_id: PLACEHOLDER_SUBTITLE_ID.to_string(),
        }
    }
}

impl ExportSettings {
    /// Settings for exporting to `path`, detecting the frame rate from the
    /// open video when one is loaded
    ///
    /// The movie title is the path's file stem; the remaining fields take
    /// their DCP defaults, which the host should let the user verify.
    #[must_use]
    pub fn new(path: &Path, video_fps: &Framerate) -> Self {
        let movie_title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(DEFAULT_MOVIE_TITLE)
            .to_string();
        let frame_rate = FrameRateChoice::from_framerate(video_fps);
        debug!(title = %movie_title, fps = video_fps.fps(), "derived export settings");
        Self {
            frame_rate,
            movie_title,
            ..Self::default()
        }
    }

    /// The oracle the writer quantizes against
    #[must_use]
    pub fn framerate(&self) -> Framerate {
        self.frame_rate.framerate()
    }

    /// Replace the placeholder SubtitleID with a freshly generated
    /// RFC-4122 value
    #[must_use]
    pub fn with_generated_id(mut self) -> Self {
        self.subtitle_id = format!("urn:uuid:{}", Uuid::new_v4());
        self
    }

    /// Pre-flight analysis of a document against these settings
    ///
    /// Returns newline-joined warning strings; the result never blocks an
    /// export. The XYZ color-space note is always present.
    #[must_use]
    pub fn validate(&self, doc: &AssDocument) -> String {
        let mut has_animations = false;
        let mut has_complex_effects = false;
        let mut has_drawings = false;
        let mut subtitle_count = 0usize;
        let mut max_line_length = 0usize;

        for event in &doc.events {
            if event.comment {
                continue;
            }
            subtitle_count += 1;
            let text = event.text.as_str();

            if text.contains("\\t") || text.contains("\\move") {
                has_animations = true;
            }
            if text.contains("\\blur")
                || text.contains("\\be")
                || text.contains("\\fscx")
                || text.contains("\\fscy")
            {
                has_complex_effects = true;
            }
            if text.contains("\\p") {
                has_drawings = true;
            }
            max_line_length = max_line_length.max(text.len());
        }

        let mut warnings = Vec::new();
        if subtitle_count > 500 {
            warnings.push(format!(
                "Warning: File contains {subtitle_count} subtitles. DCP typically limits to ~500 per reel."
            ));
        }
        if has_animations {
            warnings.push("Warning: Animations (\\t, \\move) will be lost in export.".to_string());
        }
        if has_complex_effects {
            warnings.push(
                "Warning: Complex effects (\\blur, \\be, scaling) will be lost in export."
                    .to_string(),
            );
        }
        if has_drawings {
            warnings.push(
                "Warning: Vector drawings (\\p) are not supported and will be lost.".to_string(),
            );
        }
        if max_line_length > 80 {
            warnings.push(
                "Warning: Some lines are very long. Cinema subtitles typically use 40-50 characters per line."
                    .to_string(),
            );
        }
        if self.include_font_reference && self.font_uri.is_empty() {
            warnings
                .push("Warning: Font reference enabled but no font file selected.".to_string());
        }
        warnings.push(
            "Note: DCP uses XYZ color space. Color appearance may differ from ASS preview."
                .to_string(),
        );

        warnings.join("\n")
    }
}

/// Field validators; each clamps or replaces, never errors
pub mod validate {
    use super::{
        FrameRateChoice, DEFAULT_FADE_DURATION, DEFAULT_FONT_SIZE, DEFAULT_LANGUAGE_CODE,
        DEFAULT_MOVIE_TITLE, MAX_FONT_SIZE, MIN_FADE_DURATION, MIN_FONT_SIZE, MIN_REEL_NUMBER,
    };

    /// Common ISO 639-1 and 639-2 codes for cinema, sorted for binary
    /// search. Not exhaustive; other purely alphabetic 2-3 letter codes are
    /// also accepted.
    const LANGUAGE_CODES: &[&str] = &[
        "ar", "ara", "ces", "chi", "cs", "cze", "da", "dan", "de", "deu", "dut", "el", "ell",
        "en", "eng", "es", "fi", "fin", "fr", "fra", "fre", "ger", "gre", "he", "heb", "hi",
        "hin", "hu", "hun", "id", "ind", "it", "ita", "ja", "jpn", "ko", "kor", "ms", "msa",
        "nl", "nld", "no", "nor", "per", "pl", "pol", "por", "pt", "ro", "ron", "ru", "rum",
        "rus", "slo", "spa", "sv", "swe", "tgl", "th", "tha", "tl", "tr", "tur", "uk", "ukr",
        "vi", "vie", "wel", "zh", "zho",
    ];

    /// One of the allowed discrete rates, else 24
    #[must_use]
    pub fn frame_rate(fps: f64) -> f64 {
        FrameRateChoice::ALL
            .into_iter()
            .map(FrameRateChoice::nominal_fps)
            .find(|rate| (rate - fps).abs() < f64::EPSILON)
            .unwrap_or(24.0)
    }

    /// Trimmed of surrounding whitespace; empty becomes "Untitled"
    #[must_use]
    pub fn movie_title(title: &str) -> String {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            DEFAULT_MOVIE_TITLE.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// At least one, else one
    #[must_use]
    pub fn reel_number(reel: i32) -> i32 {
        if reel >= MIN_REEL_NUMBER {
            reel
        } else {
            MIN_REEL_NUMBER
        }
    }

    /// Lowercased; falls back to "en" unless known or plausibly ISO 639
    #[must_use]
    pub fn language_code(code: &str) -> String {
        let lower = code.to_lowercase();
        if is_valid_language_code(&lower) {
            lower
        } else {
            DEFAULT_LANGUAGE_CODE.to_string()
        }
    }

    /// In the known table, or purely alphabetic with length 2 or 3
    #[must_use]
    pub fn is_valid_language_code(code: &str) -> bool {
        if LANGUAGE_CODES.binary_search(&code).is_ok() {
            return true;
        }
        (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphabetic())
    }

    /// Within 10..=72 points, else 42
    #[must_use]
    pub fn font_size(size: u32) -> u32 {
        if (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
            size
        } else {
            DEFAULT_FONT_SIZE
        }
    }

    /// Non-negative, else the 20 ms default
    #[must_use]
    pub fn fade_duration(duration: i64) -> i64 {
        if duration >= MIN_FADE_DURATION {
            duration
        } else {
            DEFAULT_FADE_DURATION
        }
    }

}
