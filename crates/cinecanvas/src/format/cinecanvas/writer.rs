//! ASS-shaped model to DCSubtitle document
//!
//! The writer works on a normalized copy of the event list; the source
//! document is never mutated. Normalization must not strip override tags,
//! because fade times are read from each line's `\fad` tag right before its
//! visible text is extracted.

use crate::ass::{normalize, AssDocument, DialogueEvent, Style};
use crate::color::Rgba;
use crate::props::FontProps;
use crate::settings::ExportSettings;
use crate::tags::{self, StyledSegment};
use crate::time::Framerate;
use crate::xml::XmlElement;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// VPosition of the bottom line, percent from screen bottom
const BASE_VPOSITION: f64 = 10.0;
/// Vertical distance between stacked lines
const LINE_SPACING: f64 = 6.5;

/// Build the complete `<DCSubtitle>` tree for a document
#[must_use]
pub fn document_to_xml(doc: &AssDocument, settings: &ExportSettings) -> XmlElement {
    let fps = settings.framerate();
    let events = normalize::prepare_for_export(&doc.events);
    debug!(
        events = events.len(),
        fps = fps.fps(),
        "writing CineCanvas document"
    );

    let styles: HashMap<&str, &Style> = doc.styles.iter().map(|s| (s.name.as_str(), s)).collect();
    let default_style = styles
        .get("Default")
        .copied()
        .or_else(|| doc.styles.first());

    let mut root = XmlElement::new("DCSubtitle").with_attr("Version", "1.0");
    write_header(&mut root, settings);

    let mut container = container_font(default_style);
    let mut spot_number = 1;
    for event in &events {
        let style = styles
            .get(event.style.as_str())
            .copied()
            .or(default_style);
        container.push_element(subtitle_element(event, style, spot_number, &fps));
        spot_number += 1;
    }
    root.push_element(container);
    root
}

/// Header children: SubtitleID, MovieTitle, ReelNumber, Language, LoadFont
fn write_header(root: &mut XmlElement, settings: &ExportSettings) {
    let mut id = XmlElement::new("SubtitleID");
    id.push_text(settings.subtitle_id.clone());
    root.push_element(id);

    let mut title = XmlElement::new("MovieTitle");
    title.push_text(settings.movie_title.clone());
    root.push_element(title);

    let mut reel = XmlElement::new("ReelNumber");
    reel.push_text(settings.reel_number.to_string());
    root.push_element(reel);

    let mut language = XmlElement::new("Language");
    language.push_text(settings.language_code.clone());
    root.push_element(language);

    let uri = if settings.include_font_reference && !settings.font_uri.is_empty() {
        Path::new(&settings.font_uri)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
            .to_string()
    } else {
        String::new()
    };
    root.push_element(
        XmlElement::new("LoadFont")
            .with_attr("Id", "Font1")
            .with_attr("URI", uri),
    );
}

/// Container `<Font>` carrying the default style, or hardcoded fallbacks
/// when the document has no styles at all
fn container_font(style: Option<&Style>) -> XmlElement {
    let mut font = XmlElement::new("Font").with_attr("Id", "Font1");
    match style {
        Some(style) => {
            font.set_attr("Script", style.font.clone());
            font.set_attr("Size", style.font_size.to_string());
            font.set_attr("Weight", weight(style.bold));
            font.set_attr("Italic", italic(style.italic));
            font.set_attr("Color", opaque(style.primary).to_cinecanvas());
            if style.outline_width > 0.0 {
                font.set_attr("Effect", "border");
                font.set_attr("EffectColor", opaque(style.outline).to_cinecanvas());
            } else {
                font.set_attr("Effect", "none");
                font.set_attr("EffectColor", "FF000000");
            }
        }
        None => {
            font.set_attr("Script", "Arial");
            font.set_attr("Size", "42");
            font.set_attr("Weight", "normal");
            font.set_attr("Italic", "no");
            font.set_attr("Color", "FFFFFFFF");
            font.set_attr("Effect", "border");
            font.set_attr("EffectColor", "FF000000");
        }
    }
    font
}

/// One `<Subtitle>` with per-line `<Font>`/`<Text>` children
fn subtitle_element(
    event: &DialogueEvent,
    style: Option<&Style>,
    spot_number: usize,
    fps: &Framerate,
) -> XmlElement {
    let props = FontProps::effective(style, &event.text);
    let (fade_up, fade_down) = tags::fade_times(&event.text);

    let time_in = fps.quantize(event.start);
    // Emitted subtitles always satisfy TimeIn <= TimeOut, whatever the
    // source event claimed
    let time_out = fps.quantize(event.end).max(time_in);
    let mut subtitle = XmlElement::new("Subtitle")
        .with_attr("SpotNumber", spot_number.to_string())
        .with_attr("TimeIn", time_in.to_cinecanvas())
        .with_attr("TimeOut", time_out.to_cinecanvas())
        .with_attr("FadeUpTime", fade_up.to_string())
        .with_attr("FadeDownTime", fade_down.to_string());

    let default_bold = style.is_some_and(|s| s.bold);
    let default_italic = style.is_some_and(|s| s.italic);

    // Split the raw text, tags preserved, on \N (or \n when no \N exists)
    let raw_lines: Vec<&str> = if event.text.contains("\\N") {
        event.text.split("\\N").collect()
    } else if event.text.contains("\\n") {
        event.text.split("\\n").collect()
    } else {
        vec![event.text.as_str()]
    };

    // Lines are stacked bottom-up from BASE_VPOSITION, so the count of
    // non-empty lines must be known before any line is emitted
    let non_empty = raw_lines
        .iter()
        .filter(|line| !visible_text(line, default_bold, default_italic).is_empty())
        .count()
        .max(1);

    let mut valid_index = 0usize;
    for raw_line in &raw_lines {
        let segments = tags::parse_styled_segments(raw_line, default_bold, default_italic);
        let line_text: String = segments.iter().map(|s| s.text.as_str()).collect();
        let trimmed = line_text.trim_matches([' ', '\t']);
        if trimmed.is_empty() {
            continue;
        }
        let vpos = BASE_VPOSITION + ((non_empty - 1 - valid_index) as f64) * LINE_SPACING;
        valid_index += 1;

        subtitle.push_element(line_font(&props, &segments, trimmed, vpos));
    }

    // Entirely empty text still yields one placeholder line
    if valid_index == 0 {
        let mut font = font_attrs(&props, weight(false), italic(false));
        font.push_element(text_attrs(BASE_VPOSITION));
        subtitle.push_element(font);
    }
    subtitle
}

/// `<Font>`/`<Text>` for one line, either a uniform run or mixed runs with
/// inline `<Font>` children
fn line_font(
    props: &FontProps,
    segments: &[StyledSegment],
    trimmed: &str,
    vpos: f64,
) -> XmlElement {
    let first_bold = segments.first().is_some_and(|s| s.bold);
    let first_italic = segments.first().is_some_and(|s| s.italic);
    let uniform = segments
        .iter()
        .all(|s| s.bold == first_bold && s.italic == first_italic);

    if uniform {
        let mut font = font_attrs(props, weight(first_bold), italic(first_italic));
        let mut text = text_attrs(vpos);
        text.push_text(trimmed);
        font.push_element(text);
        font
    } else {
        // Neutral outer font; styled runs become inline <Font> children
        let mut font = font_attrs(props, weight(false), italic(false));
        let mut text = text_attrs(vpos);
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            if segment.bold || segment.italic {
                let mut inline = XmlElement::new("Font");
                if segment.bold {
                    inline.set_attr("Weight", "bold");
                }
                if segment.italic {
                    inline.set_attr("Italic", "yes");
                }
                inline.push_text(segment.text.clone());
                text.push_element(inline);
            } else {
                text.push_text(segment.text.clone());
            }
        }
        font.push_element(text);
        font
    }
}

fn font_attrs(props: &FontProps, weight: &str, italic: &str) -> XmlElement {
    let mut font = XmlElement::new("Font")
        .with_attr("Script", props.font_name.clone())
        .with_attr("Size", props.size.to_string())
        .with_attr("Weight", weight)
        .with_attr("Italic", italic)
        .with_attr("Color", props.primary.to_cinecanvas());
    if props.outline_width > 0.0 {
        font.set_attr("Effect", "border");
        font.set_attr("EffectColor", opaque(props.outline).to_cinecanvas());
    } else {
        font.set_attr("Effect", "none");
    }
    font
}

fn text_attrs(vpos: f64) -> XmlElement {
    XmlElement::new("Text")
        .with_attr("VAlign", "bottom")
        .with_attr("HAlign", "center")
        .with_attr("VPosition", format!("{vpos:.1}"))
        .with_attr("HPosition", "0.0")
        .with_attr("Direction", "horizontal")
}

fn visible_text(raw_line: &str, default_bold: bool, default_italic: bool) -> String {
    let segments = tags::parse_styled_segments(raw_line, default_bold, default_italic);
    let text: String = segments.iter().map(|s| s.text.as_str()).collect();
    text.trim_matches([' ', '\t']).to_string()
}

const fn weight(bold: bool) -> &'static str {
    if bold {
        "bold"
    } else {
        "normal"
    }
}

const fn italic(italic: bool) -> &'static str {
    if italic {
        "yes"
    } else {
        "no"
    }
}

const fn opaque(color: Rgba) -> Rgba {
    Rgba::new(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Time;

    fn arial_default() -> Style {
        Style {
            font: "Arial".to_string(),
            font_size: 42,
            ..Style::default()
        }
    }

    fn doc_with_event(text: &str) -> AssDocument {
        let mut doc = AssDocument::new();
        doc.styles.push(arial_default());
        doc.events.push(DialogueEvent::new(
            Time::from_ms(1000),
            Time::from_ms(3000),
            "Default",
            text,
        ));
        doc
    }

    fn first_subtitle(root: &XmlElement) -> &XmlElement {
        root.first_element("Font")
            .unwrap()
            .first_element("Subtitle")
            .unwrap()
    }

    #[test]
    fn header_carries_settings() {
        let settings = ExportSettings {
            movie_title: "My Film".to_string(),
            reel_number: 2,
            language_code: "de".to_string(),
            ..ExportSettings::default()
        };
        let root = document_to_xml(&AssDocument::new(), &settings);
        assert_eq!(root.name, "DCSubtitle");
        assert_eq!(root.attr("Version"), Some("1.0"));
        assert_eq!(root.first_element("MovieTitle").unwrap().text(), "My Film");
        assert_eq!(root.first_element("ReelNumber").unwrap().text(), "2");
        assert_eq!(root.first_element("Language").unwrap().text(), "de");
        assert!(root
            .first_element("SubtitleID")
            .unwrap()
            .text()
            .starts_with("urn:uuid:"));
    }

    #[test]
    fn empty_document_still_has_container_font() {
        let root = document_to_xml(&AssDocument::new(), &ExportSettings::default());
        let font = root.first_element("Font").unwrap();
        assert_eq!(font.attr("Id"), Some("Font1"));
        assert_eq!(font.attr("Script"), Some("Arial"));
        assert_eq!(font.attr("Size"), Some("42"));
        assert_eq!(font.attr("Effect"), Some("border"));
        assert_eq!(font.attr("EffectColor"), Some("FF000000"));
        assert!(font.first_element("Subtitle").is_none());
    }

    #[test]
    fn load_font_uri_uses_filename_component() {
        let settings = ExportSettings {
            include_font_reference: true,
            font_uri: "/fonts/subdir/MyFont.ttf".to_string(),
            ..ExportSettings::default()
        };
        let root = document_to_xml(&AssDocument::new(), &settings);
        let load_font = root.first_element("LoadFont").unwrap();
        assert_eq!(load_font.attr("URI"), Some("MyFont.ttf"));
    }

    #[test]
    fn load_font_uri_empty_when_disabled() {
        let settings = ExportSettings {
            include_font_reference: false,
            font_uri: "/fonts/MyFont.ttf".to_string(),
            ..ExportSettings::default()
        };
        let root = document_to_xml(&AssDocument::new(), &settings);
        assert_eq!(root.first_element("LoadFont").unwrap().attr("URI"), Some(""));
    }

    #[test]
    fn single_line_subtitle_shape() {
        let root = document_to_xml(&doc_with_event("Hello"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        assert_eq!(subtitle.attr("SpotNumber"), Some("1"));
        assert_eq!(subtitle.attr("TimeIn"), Some("00:00:01:000"));
        assert_eq!(subtitle.attr("TimeOut"), Some("00:00:03:000"));
        assert_eq!(subtitle.attr("FadeUpTime"), Some("0"));
        assert_eq!(subtitle.attr("FadeDownTime"), Some("0"));

        let font = subtitle.first_element("Font").unwrap();
        assert_eq!(font.attr("Script"), Some("Arial"));
        assert_eq!(font.attr("Size"), Some("42"));
        assert_eq!(font.attr("Weight"), Some("normal"));
        assert_eq!(font.attr("Italic"), Some("no"));
        assert_eq!(font.attr("Color"), Some("FFFFFFFF"));
        assert_eq!(font.attr("Effect"), Some("border"));
        assert_eq!(font.attr("EffectColor"), Some("000000FF"));

        let text = font.first_element("Text").unwrap();
        assert_eq!(text.attr("VAlign"), Some("bottom"));
        assert_eq!(text.attr("HAlign"), Some("center"));
        assert_eq!(text.attr("VPosition"), Some("10.0"));
        assert_eq!(text.attr("HPosition"), Some("0.0"));
        assert_eq!(text.attr("Direction"), Some("horizontal"));
        assert_eq!(text.text(), "Hello");
    }

    #[test]
    fn multiline_stacks_bottom_up() {
        let root = document_to_xml(&doc_with_event("Top\\NBottom"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        let texts: Vec<_> = subtitle
            .elements_named("Font")
            .filter_map(|f| f.first_element("Text"))
            .collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].attr("VPosition"), Some("16.5"));
        assert_eq!(texts[0].text(), "Top");
        assert_eq!(texts[1].attr("VPosition"), Some("10.0"));
        assert_eq!(texts[1].text(), "Bottom");
    }

    #[test]
    fn three_lines_use_full_ladder() {
        let root = document_to_xml(&doc_with_event("a\\Nb\\Nc"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        let positions: Vec<_> = subtitle
            .elements_named("Font")
            .filter_map(|f| f.first_element("Text"))
            .map(|t| t.attr("VPosition").unwrap().to_string())
            .collect();
        assert_eq!(positions, ["23.0", "16.5", "10.0"]);
    }

    #[test]
    fn lowercase_linebreaks_split_when_no_uppercase_present() {
        let root = document_to_xml(&doc_with_event("a\\nb"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        assert_eq!(subtitle.elements_named("Font").count(), 2);
    }

    #[test]
    fn empty_lines_are_skipped_in_stacking() {
        let root = document_to_xml(&doc_with_event("Top\\N\\NBottom"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        let positions: Vec<_> = subtitle
            .elements_named("Font")
            .filter_map(|f| f.first_element("Text"))
            .map(|t| t.attr("VPosition").unwrap().to_string())
            .collect();
        assert_eq!(positions, ["16.5", "10.0"]);
    }

    #[test]
    fn mixed_styling_uses_inline_fonts() {
        let root = document_to_xml(
            &doc_with_event(r"a {\b1}b{\b0} c"),
            &ExportSettings::default(),
        );
        let subtitle = first_subtitle(&root);
        let font = subtitle.first_element("Font").unwrap();
        assert_eq!(font.attr("Weight"), Some("normal"));
        assert_eq!(font.attr("Italic"), Some("no"));

        let text = font.first_element("Text").unwrap();
        use crate::xml::XmlNode;
        assert_eq!(text.children.len(), 3);
        match &text.children[0] {
            XmlNode::Text(t) => assert_eq!(t, "a "),
            other => panic!("expected plain text, got {other:?}"),
        }
        match &text.children[1] {
            XmlNode::Element(el) => {
                assert_eq!(el.name, "Font");
                assert_eq!(el.attr("Weight"), Some("bold"));
                assert_eq!(el.attr("Italic"), None);
                assert_eq!(el.text(), "b");
            }
            other => panic!("expected inline font, got {other:?}"),
        }
        match &text.children[2] {
            XmlNode::Text(t) => assert_eq!(t, " c"),
            other => panic!("expected plain text, got {other:?}"),
        }
    }

    #[test]
    fn uniform_bold_line_keeps_single_font() {
        let root = document_to_xml(&doc_with_event(r"{\b1}loud"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        let font = subtitle.first_element("Font").unwrap();
        assert_eq!(font.attr("Weight"), Some("bold"));
        assert_eq!(font.first_element("Text").unwrap().text(), "loud");
    }

    #[test]
    fn fades_come_from_fad_tags() {
        let root = document_to_xml(
            &doc_with_event(r"{\fad(100,250)}Hi"),
            &ExportSettings::default(),
        );
        let subtitle = first_subtitle(&root);
        assert_eq!(subtitle.attr("FadeUpTime"), Some("100"));
        assert_eq!(subtitle.attr("FadeDownTime"), Some("250"));
        // The fade block is stripped from visible text
        assert_eq!(
            subtitle
                .first_element("Font")
                .unwrap()
                .first_element("Text")
                .unwrap()
                .text(),
            "Hi"
        );
    }

    #[test]
    fn comments_are_skipped_and_spot_numbers_stay_dense() {
        let mut doc = AssDocument::new();
        doc.styles.push(arial_default());
        let mut comment =
            DialogueEvent::new(Time::ZERO, Time::from_ms(500), "Default", "c");
        comment.comment = true;
        doc.events.push(comment);
        doc.events.push(DialogueEvent::new(
            Time::from_ms(1000),
            Time::from_ms(2000),
            "Default",
            "d1",
        ));
        doc.events.push(DialogueEvent::new(
            Time::from_ms(3000),
            Time::from_ms(4000),
            "Default",
            "d2",
        ));

        let root = document_to_xml(&doc, &ExportSettings::default());
        let container = root.first_element("Font").unwrap();
        let subtitles: Vec<_> = container.elements_named("Subtitle").collect();
        assert_eq!(subtitles.len(), 2);
        assert_eq!(subtitles[0].attr("SpotNumber"), Some("1"));
        assert_eq!(subtitles[1].attr("SpotNumber"), Some("2"));
        let all_text: Vec<String> = subtitles
            .iter()
            .map(|s| s.first_element("Font").unwrap().text())
            .collect();
        assert_eq!(all_text, ["d1", "d2"]);
    }

    #[test]
    fn source_document_is_not_mutated() {
        let doc = doc_with_event("b\\Na");
        let before = doc.clone();
        let _ = document_to_xml(&doc, &ExportSettings::default());
        assert_eq!(doc, before);
    }

    #[test]
    fn whitespace_only_text_yields_placeholder() {
        let root = document_to_xml(&doc_with_event("  \\N\t"), &ExportSettings::default());
        let subtitle = first_subtitle(&root);
        let fonts: Vec<_> = subtitle.elements_named("Font").collect();
        assert_eq!(fonts.len(), 1);
        let text = fonts[0].first_element("Text").unwrap();
        assert_eq!(text.attr("VPosition"), Some("10.0"));
        assert!(text.text().is_empty());
    }

    #[test]
    fn times_are_quantized_at_24fps() {
        let mut doc = AssDocument::new();
        doc.styles.push(arial_default());
        doc.events.push(DialogueEvent::new(
            Time::from_ms(1042),
            Time::from_ms(3000),
            "Default",
            "Hi",
        ));
        let root = document_to_xml(&doc, &ExportSettings::default());
        assert_eq!(
            first_subtitle(&root).attr("TimeIn"),
            Some("00:00:01:041")
        );
    }

    #[test]
    fn unknown_style_falls_back_to_default() {
        let mut doc = AssDocument::new();
        doc.styles.push(Style {
            font: "Futura".to_string(),
            ..Style::default()
        });
        doc.events.push(DialogueEvent::new(
            Time::ZERO,
            Time::from_ms(1000),
            "Missing",
            "x",
        ));
        let root = document_to_xml(&doc, &ExportSettings::default());
        let font = first_subtitle(&root).first_element("Font").unwrap();
        assert_eq!(font.attr("Script"), Some("Futura"));
    }

    #[test]
    fn no_outline_means_effect_none_without_color() {
        let mut doc = AssDocument::new();
        doc.styles.push(Style {
            outline_width: 0.0,
            ..Style::default()
        });
        doc.events
            .push(DialogueEvent::new(Time::ZERO, Time::from_ms(1000), "Default", "x"));
        let root = document_to_xml(&doc, &ExportSettings::default());
        let font = first_subtitle(&root).first_element("Font").unwrap();
        assert_eq!(font.attr("Effect"), Some("none"));
        assert_eq!(font.attr("EffectColor"), None);
    }
}
