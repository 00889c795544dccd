//! ASS override-tag scanning and styled segmentation
//!
//! The override-tag language is not fully parsed. Each attribute command
//! (`\fn`, `\fs`, `\1c`, `\3c`, `\1a`, `\fad`) gets its own independent
//! scanner over the raw text, and a single left-to-right walk splits a line
//! into contiguous bold/italic runs. Adding a command means adding a scanner;
//! segmentation never changes.
//!
//! Scanners recover from malformed syntax by skipping, never by failing.

use crate::color::Rgba;
use smallvec::SmallVec;

/// A maximal run of visible text sharing one bold/italic state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// Segment list; lines rarely have more than a few runs
pub type Segments = SmallVec<[StyledSegment; 4]>;

/// Split a line into styled segments, starting from the base style's state
///
/// Walks the text once. A `{` closes the current segment (emitted if
/// non-empty) and, when the block is terminated, applies every `\b0`/`\b1`
/// and `\i0`/`\i1` found inside it, last one winning. An unterminated `{`
/// is skipped as a single character. Text outside tag blocks is preserved
/// byte for byte, interior whitespace included.
pub fn parse_styled_segments(text: &str, default_bold: bool, default_italic: bool) -> Segments {
    let mut segments = Segments::new();
    let mut bold = default_bold;
    let mut italic = default_italic;
    let mut current = String::new();

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if !current.is_empty() {
                segments.push(StyledSegment {
                    text: std::mem::take(&mut current),
                    bold,
                    italic,
                });
            }
            match text[i..].find('}') {
                Some(rel) => {
                    apply_toggles(&text[i + 1..i + rel], &mut bold, &mut italic);
                    i += rel + 1;
                }
                // Unterminated block: drop the brace and carry on
                None => i += 1,
            }
        } else {
            let next = text[i..]
                .find('{')
                .map_or(bytes.len(), |rel| i + rel);
            current.push_str(&text[i..next]);
            i = next;
        }
    }

    if !current.is_empty() {
        segments.push(StyledSegment {
            text: current,
            bold,
            italic,
        });
    }
    segments
}

/// Apply every `\b`/`\i` toggle inside one tag block, last occurrence wins
///
/// Only the byte directly after the command is inspected, so `\blur`,
/// `\bord`, `\be` and friends fall through untouched.
fn apply_toggles(block: &str, bold: &mut bool, italic: &mut bool) {
    let bytes = block.as_bytes();
    for (pos, _) in block.match_indices("\\b") {
        match bytes.get(pos + 2) {
            Some(b'0') => *bold = false,
            Some(b'1') => *bold = true,
            _ => {}
        }
    }
    for (pos, _) in block.match_indices("\\i") {
        match bytes.get(pos + 2) {
            Some(b'0') => *italic = false,
            Some(b'1') => *italic = true,
            _ => {}
        }
    }
}

/// Last `\fn<name>` in the text; the name runs up to `\` or `}`
#[must_use]
pub fn font_name_override(text: &str) -> Option<&str> {
    let mut result = None;
    for (pos, _) in text.match_indices("\\fn") {
        let rest = &text[pos + 3..];
        let end = rest.find(['\\', '}']).unwrap_or(rest.len());
        if end > 0 {
            result = Some(&rest[..end]);
        }
    }
    result
}

/// Last `\fs<N>` in the text
///
/// Requires a digit run directly after the command, so `\fscx`/`\fscy`
/// never match.
#[must_use]
pub fn font_size_override(text: &str) -> Option<u32> {
    let mut result = None;
    for (pos, _) in text.match_indices("\\fs") {
        let rest = &text[pos + 3..];
        let digits: &str = &rest[..rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len())];
        if let Ok(size) = digits.parse() {
            result = Some(size);
        }
    }
    result
}

/// Last `\1c&H<BBGGRR>&` or `\c&H<BBGGRR>&` in the text, converted to RGB
#[must_use]
pub fn primary_color_override(text: &str) -> Option<Rgba> {
    last_bgr_color(text, &["\\1c&H", "\\c&H"])
}

/// Last `\3c&H<BBGGRR>&` in the text, converted to RGB
#[must_use]
pub fn outline_color_override(text: &str) -> Option<Rgba> {
    last_bgr_color(text, &["\\3c&H"])
}

/// Last `\1a&H<NN>&` or `\a&H<NN>&` in the text, as an ASS alpha byte
#[must_use]
pub fn primary_alpha_override(text: &str) -> Option<u8> {
    let mut result: Option<(usize, u8)> = None;
    for prefix in ["\\1a&H", "\\a&H"] {
        for (pos, _) in text.match_indices(prefix) {
            let rest = text[pos + prefix.len()..].as_bytes();
            if rest.len() >= 2 {
                if let Some(alpha) = hex_pair(rest[0], rest[1]) {
                    // Two patterns scanned independently; the later
                    // occurrence in the text wins
                    if result.is_none_or(|(prev, _)| pos > prev) {
                        result = Some((pos, alpha));
                    }
                }
            }
        }
    }
    result.map(|(_, alpha)| alpha)
}

/// Fade times from the first `\fad(in,out)` or `\fade(in,out)` in the text
///
/// The single-value form `\fad(N)` applies to both directions. No fade tag,
/// or an unparseable one, means `(0, 0)`.
#[must_use]
pub fn fade_times(text: &str) -> (i64, i64) {
    let pos = text.find("\\fad(").or_else(|| text.find("\\fade("));
    let Some(pos) = pos else {
        return (0, 0);
    };
    let Some(open) = text[pos..].find('(') else {
        return (0, 0);
    };
    let after_open = pos + open + 1;
    let Some(close) = text[after_open..].find(')') else {
        return (0, 0);
    };
    let params = &text[after_open..after_open + close];

    let mut parts = params.splitn(2, ',');
    let first = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
    let second = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
    match (first, second) {
        (Some(fade_in), Some(fade_out)) => (fade_in, fade_out),
        (Some(both), None) => (both, both),
        _ => (0, 0),
    }
}

fn last_bgr_color(text: &str, prefixes: &[&str]) -> Option<Rgba> {
    let mut result: Option<(usize, Rgba)> = None;
    for prefix in prefixes {
        for (pos, _) in text.match_indices(prefix) {
            let rest = &text[pos + prefix.len()..];
            if rest.len() >= 6 && rest.is_char_boundary(6) {
                if let Some(color) = Rgba::from_ass_bgr(&rest[..6]) {
                    if result.is_none_or(|(prev, _)| pos > prev) {
                        result = Some((pos, color));
                    }
                }
            }
        }
    }
    result.map(|(_, color)| color)
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)? as u8;
    let lo = (lo as char).to_digit(16)? as u8;
    Some((hi << 4) | lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, bold: bool, italic: bool) -> StyledSegment {
        StyledSegment {
            text: text.to_string(),
            bold,
            italic,
        }
    }

    #[test]
    fn plain_text_is_one_segment() {
        let segments = parse_styled_segments("Hello", false, false);
        assert_eq!(segments.as_slice(), &[segment("Hello", false, false)]);
    }

    #[test]
    fn bold_toggle_splits_segments() {
        let segments = parse_styled_segments(r"a {\b1}b{\b0} c", false, false);
        assert_eq!(
            segments.as_slice(),
            &[
                segment("a ", false, false),
                segment("b", true, false),
                segment(" c", false, false),
            ]
        );
    }

    #[test]
    fn default_state_seeds_segments() {
        let segments = parse_styled_segments(r"x{\i0}y", true, true);
        assert_eq!(
            segments.as_slice(),
            &[segment("x", true, true), segment("y", true, false)]
        );
    }

    #[test]
    fn last_toggle_in_block_wins() {
        let segments = parse_styled_segments(r"{\b1\b0}x", false, false);
        assert_eq!(segments.as_slice(), &[segment("x", false, false)]);
    }

    #[test]
    fn blur_is_not_a_bold_toggle() {
        let segments = parse_styled_segments(r"{\blur2\bord1}x", false, false);
        assert_eq!(segments.as_slice(), &[segment("x", false, false)]);
    }

    #[test]
    fn unterminated_block_closes_segment_and_drops_brace() {
        let segments = parse_styled_segments(r"ab{cd", false, false);
        assert_eq!(
            segments.as_slice(),
            &[segment("ab", false, false), segment("cd", false, false)]
        );
    }

    #[test]
    fn interior_whitespace_is_preserved() {
        let segments = parse_styled_segments("a  b", false, false);
        assert_eq!(segments.as_slice(), &[segment("a  b", false, false)]);
    }

    #[test]
    fn empty_text_yields_no_segments() {
        assert!(parse_styled_segments("", false, false).is_empty());
        assert!(parse_styled_segments(r"{\b1}", false, false).is_empty());
    }

    #[test]
    fn concatenation_equals_text_without_blocks() {
        let text = r"one {\i1}two{\i0} three {\b1}four";
        let joined: String = parse_styled_segments(text, false, false)
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(joined, "one two three four");
    }

    #[test]
    fn font_name_runs_to_backslash_or_brace() {
        assert_eq!(font_name_override(r"{\fnArial}x"), Some("Arial"));
        assert_eq!(font_name_override(r"{\fnTimes New Roman\b1}x"), Some("Times New Roman"));
        assert_eq!(font_name_override("no tags"), None);
        assert_eq!(font_name_override(r"{\fn}"), None);
    }

    #[test]
    fn last_font_name_wins() {
        assert_eq!(font_name_override(r"{\fnArial}a{\fnHelvetica}b"), Some("Helvetica"));
    }

    #[test]
    fn font_size_requires_digits() {
        assert_eq!(font_size_override(r"{\fs42}x"), Some(42));
        assert_eq!(font_size_override(r"{\fs12}{\fs36}"), Some(36));
        assert_eq!(font_size_override(r"{\fscx120}"), None);
        assert_eq!(font_size_override(r"{\fs}"), None);
    }

    #[test]
    fn primary_color_is_bgr() {
        // \1c&H0000FF& is BGR for red
        assert_eq!(primary_color_override(r"{\1c&H0000FF&}x"), Some(Rgba::new(255, 0, 0)));
        assert_eq!(primary_color_override(r"{\c&HFF0000&}x"), Some(Rgba::new(0, 0, 255)));
        assert_eq!(primary_color_override(r"{\3c&H0000FF&}x"), None);
    }

    #[test]
    fn outline_color_is_bgr() {
        assert_eq!(outline_color_override(r"{\3c&H00FF00&}x"), Some(Rgba::new(0, 255, 0)));
        assert_eq!(outline_color_override(r"{\1c&H00FF00&}x"), None);
    }

    #[test]
    fn short_color_payload_is_ignored() {
        assert_eq!(primary_color_override(r"{\1c&HFFF&}x"), None);
    }

    #[test]
    fn primary_alpha_parses_two_hex_digits() {
        assert_eq!(primary_alpha_override(r"{\1a&HFF&}x"), Some(255));
        assert_eq!(primary_alpha_override(r"{\a&H80&}x"), Some(128));
        assert_eq!(primary_alpha_override(r"{\1a&HZZ&}x"), None);
    }

    #[test]
    fn alpha_does_not_match_alpha_tag() {
        assert_eq!(primary_alpha_override(r"{\alpha&HFF&}x"), None);
    }

    #[test]
    fn fade_two_values() {
        assert_eq!(fade_times(r"{\fad(100,250)}Hi"), (100, 250));
        assert_eq!(fade_times(r"{\fade(40,60)}Hi"), (40, 60));
    }

    #[test]
    fn fade_single_value_applies_to_both() {
        assert_eq!(fade_times(r"{\fad(120)}Hi"), (120, 120));
        assert_eq!(fade_times(r"{\fad(120,junk)}Hi"), (120, 120));
    }

    #[test]
    fn fade_absent_or_malformed_is_zero() {
        assert_eq!(fade_times("Hi"), (0, 0));
        assert_eq!(fade_times(r"{\fad(oops)}Hi"), (0, 0));
        assert_eq!(fade_times(r"{\fad(100"), (0, 0));
    }
}
