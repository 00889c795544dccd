//! Time primitives and DCP frame quantization
//!
//! Times are integer milliseconds since 00:00:00.000 and never negative.
//! CineCanvas carries them as `HH:MM:SS:mmm` strings (the reader also
//! accepts `HH:MM:SS.mmm`), and when a frame rate is known, every emitted
//! time is snapped onto its frame grid by converting through a frame index
//! and back.

use std::fmt;

/// Milliseconds since 00:00:00.000, clamped to be non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(i64);

impl Time {
    /// Zero time
    pub const ZERO: Self = Self(0);

    /// Create a time from milliseconds, clamping negatives to zero
    #[must_use]
    pub const fn from_ms(ms: i64) -> Self {
        Self(if ms < 0 { 0 } else { ms })
    }

    /// Milliseconds since zero
    #[must_use]
    pub const fn as_ms(self) -> i64 {
        self.0
    }

    /// Format as a CineCanvas `HH:MM:SS:mmm` string
    ///
    /// Hours are unbounded; fields below them are zero-padded to their
    /// natural width.
    #[must_use]
    pub fn to_cinecanvas(self) -> String {
        let mut ms = self.0;
        let hours = ms / 3_600_000;
        ms %= 3_600_000;
        let minutes = ms / 60_000;
        ms %= 60_000;
        let seconds = ms / 1000;
        let millis = ms % 1000;
        format!("{hours:02}:{minutes:02}:{seconds:02}:{millis:03}")
    }

    /// Parse a CineCanvas time string
    ///
    /// Tries `HH:MM:SS:mmm` first, then `HH:MM:SS.mmm`. Anything else
    /// yields zero; field ranges are not validated, so `00:99:00:000` is
    /// ninety-nine minutes.
    #[must_use]
    pub fn parse_cinecanvas(s: &str) -> Self {
        parse_fields(s, ':')
            .or_else(|| parse_fields(s, '.'))
            .map_or(Self::ZERO, |(h, m, sec, ms)| {
                Self::from_ms(h * 3_600_000 + m * 60_000 + sec * 1000 + ms)
            })
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cinecanvas())
    }
}

/// Split `H:M:S<sep>ms` where the first three separators are colons and the
/// last is `last_sep`. All four fields must be plain unsigned integers.
fn parse_fields(s: &str, last_sep: char) -> Option<(i64, i64, i64, i64)> {
    let (rest, millis) = s.trim().rsplit_once(last_sep)?;
    let mut parts = rest.split(':');
    let hours = parts.next()?.trim().parse().ok()?;
    let minutes = parts.next()?.trim().parse().ok()?;
    let seconds = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((hours, minutes, seconds, millis.trim().parse().ok()?))
}

/// Frame-rate oracle for DCP frame-accurate timing
///
/// A rational `numerator/denominator` frames-per-second value plus a
/// `loaded` flag for the "no video open" case. Frame lookups use the
/// START bias: a time maps to the first frame whose start is at or after
/// it, and a frame maps back to the first millisecond it covers, which
/// makes `ms -> frame -> ms` idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framerate {
    numerator: i64,
    denominator: i64,
    loaded: bool,
}

impl Framerate {
    /// Create a loaded frame rate from a rational fps value
    ///
    /// A non-positive numerator or denominator produces an unloaded rate.
    #[must_use]
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        if numerator <= 0 || denominator <= 0 {
            return Self::unloaded();
        }
        Self {
            numerator,
            denominator,
            loaded: true,
        }
    }

    /// The absent oracle: no quantization is performed
    #[must_use]
    pub const fn unloaded() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
            loaded: false,
        }
    }

    /// Whether a rate is available
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Frames per second as a float
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Index of the frame containing `time`, START-biased
    #[must_use]
    pub fn frame_at_time(&self, time: Time) -> i64 {
        let ms = time.as_ms();
        ((ms - 1) * self.numerator).div_euclid(self.denominator * 1000) + 1
    }

    /// First millisecond covered by `frame`
    #[must_use]
    pub fn time_at_frame(&self, frame: i64) -> Time {
        Time::from_ms((frame * self.denominator * 1000).div_euclid(self.numerator))
    }

    /// Snap a time onto this rate's frame grid
    ///
    /// Unloaded or non-positive rates leave the time untouched.
    #[must_use]
    pub fn quantize(&self, time: Time) -> Time {
        if !self.loaded || self.numerator <= 0 {
            return time;
        }
        self.time_at_frame(self.frame_at_time(time))
    }
}

impl Default for Framerate {
    fn default() -> Self {
        Self::unloaded()
    }
}
