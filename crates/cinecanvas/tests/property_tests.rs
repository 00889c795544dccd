//! Property-based tests for the codec's primitive invariants
//!
//! Uses proptest to verify round-trip and idempotence properties across a
//! wide range of inputs.

use cinecanvas::settings::validate;
use cinecanvas::tags::parse_styled_segments;
use cinecanvas::{Framerate, Rgba, Time};
use proptest::prelude::*;

/// Generate arbitrary colors including both alpha extremes
fn arb_color() -> impl Strategy<Value = Rgba> {
    (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
        .prop_map(|(r, g, b, a)| Rgba::with_alpha(r, g, b, a))
}

/// Generate times up to a bit over a day
fn arb_time() -> impl Strategy<Value = Time> {
    (0i64..100_000_000).prop_map(Time::from_ms)
}

/// Generate the DCP frame-rate rationals
fn arb_framerate() -> impl Strategy<Value = Framerate> {
    prop_oneof![
        Just(Framerate::new(24000, 1001)),
        Just(Framerate::new(24, 1)),
        Just(Framerate::new(25, 1)),
        Just(Framerate::new(30000, 1001)),
        Just(Framerate::new(30, 1)),
        Just(Framerate::new(48, 1)),
        Just(Framerate::new(50, 1)),
        Just(Framerate::new(60000, 1001)),
        Just(Framerate::new(60, 1)),
    ]
}

/// A line piece: either visible text (no braces) or a complete tag block
fn arb_line_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        // Visible text without tag-block delimiters
        "[a-zA-Z0-9 .,!?]{0,12}",
        // Bold/italic toggles
        prop_oneof![
            Just(r"{\b1}".to_string()),
            Just(r"{\b0}".to_string()),
            Just(r"{\i1}".to_string()),
            Just(r"{\i0}".to_string()),
            Just(r"{\b1\i1}".to_string()),
        ],
        // Attribute tags that segmentation must pass over untouched
        prop_oneof![
            Just(r"{\fs42}".to_string()),
            Just(r"{\fnArial}".to_string()),
            Just(r"{\1c&HFFFFFF&}".to_string()),
            Just(r"{\fad(100,200)}".to_string()),
        ],
    ]
}

proptest! {
    #[test]
    fn color_roundtrip(color in arb_color()) {
        prop_assert_eq!(Rgba::from_cinecanvas(&color.to_cinecanvas()), color);
    }

    #[test]
    fn color_string_is_eight_uppercase_hex(color in arb_color()) {
        let s = color.to_cinecanvas();
        prop_assert_eq!(s.len(), 8);
        prop_assert!(s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn time_roundtrip_without_oracle(time in arb_time()) {
        prop_assert_eq!(Time::parse_cinecanvas(&time.to_cinecanvas()), time);
    }

    #[test]
    fn quantization_is_idempotent(time in arb_time(), fps in arb_framerate()) {
        let once = fps.quantize(time);
        prop_assert_eq!(fps.quantize(once), once);
    }

    #[test]
    fn quantization_never_moves_more_than_a_frame(time in arb_time(), fps in arb_framerate()) {
        let quantized = fps.quantize(time);
        let frame_ms = 1000.0 / fps.fps();
        let drift = (quantized.as_ms() - time.as_ms()).abs() as f64;
        prop_assert!(drift <= frame_ms + 1.0, "drift {drift} at {} fps", fps.fps());
    }

    #[test]
    fn segment_concatenation_strips_exactly_the_tag_blocks(
        pieces in prop::collection::vec(arb_line_piece(), 0..8),
        bold in any::<bool>(),
        italic in any::<bool>(),
    ) {
        let text: String = pieces.concat();
        let expected: String = pieces
            .iter()
            .filter(|piece| !piece.starts_with('{'))
            .cloned()
            .collect();

        let segments = parse_styled_segments(&text, bold, italic);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        // Non-empty visible text also implies at least one segment, since
        // only non-empty runs are emitted
        prop_assert_eq!(joined, expected);
        prop_assert!(segments.iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn language_validation_never_errors_and_is_lowercase(code in "[a-zA-Z0-9]{0,6}") {
        let validated = validate::language_code(&code);
        prop_assert_eq!(validated.clone(), validated.to_lowercase());
        prop_assert!(validate::is_valid_language_code(&validated));
    }
}
