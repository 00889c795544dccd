//! DCSubtitle document to ASS-shaped model
//!
//! The reader is tolerant: unknown elements are ignored, missing attributes
//! take documented defaults, and malformed numerics fall back to their
//! defaults with a log line. Only a missing or wrong root element is a hard
//! error.

use crate::ass::{AssDocument, DialogueEvent, Style};
use crate::color::Rgba;
use crate::error::{CodecError, Result};
use crate::props::FontProps;
use crate::time::Time;
use crate::xml::XmlElement;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Name of the single style the reader synthesizes
pub const SYNTHESIZED_STYLE: &str = "CineCanvas";

/// Build a document from a parsed `<DCSubtitle>` tree
pub fn document_from_xml(root: &XmlElement) -> Result<AssDocument> {
    if root.name != "DCSubtitle" {
        return Err(CodecError::parse(
            "invalid CineCanvas file: missing DCSubtitle root element",
        ));
    }

    let mut target = AssDocument::load_default();

    // Header metadata and the container font
    let mut movie_title = String::new();
    let mut language = String::new();
    let mut container_font: Option<&XmlElement> = None;
    for child in root.elements() {
        match child.name.as_str() {
            "MovieTitle" => movie_title = child.text(),
            "Language" => language = child.text(),
            "Font" => {
                if container_font.is_none() {
                    container_font = Some(child);
                }
            }
            _ => {}
        }
    }
    if !movie_title.is_empty() {
        target.set_script_info("Title", movie_title);
    }
    if !language.is_empty() {
        // ASS has no standard language field; keep it as a custom key
        target.set_script_info("Language", language);
    }

    // One synthesized style carries the container font's typography; the
    // defaulting "Default" style goes away before events reference anything
    let container_props = container_font.map_or_else(FontProps::default, parse_font_element);
    target.remove_style("Default");
    target.styles.push(Style {
        name: SYNTHESIZED_STYLE.to_string(),
        font: container_props.font_name,
        font_size: container_props.size,
        bold: container_props.bold,
        italic: container_props.italic,
        primary: container_props.primary,
        outline: container_props.outline,
        outline_width: container_props.outline_width,
        alignment: 2,
        margin_l: 10,
        margin_r: 10,
        margin_v: 10,
    });

    for font in root.elements_named("Font") {
        for subtitle in font.elements_named("Subtitle") {
            if let Some(event) = read_subtitle(subtitle) {
                target.events.push(event);
            }
        }
    }

    // The editor model requires at least one event
    if target.events.is_empty() {
        target.events.push(DialogueEvent {
            style: SYNTHESIZED_STYLE.to_string(),
            ..DialogueEvent::default()
        });
    }

    debug!(events = target.events.len(), "read CineCanvas document");
    Ok(target)
}

/// One `<Subtitle>` element to a dialogue event; empty subtitles yield None
fn read_subtitle(subtitle: &XmlElement) -> Option<DialogueEvent> {
    let time_in = Time::parse_cinecanvas(subtitle.attr_or("TimeIn", "00:00:00:000"));
    let time_out = Time::parse_cinecanvas(subtitle.attr_or("TimeOut", "00:00:05:000"));
    let fade_up = numeric_attr(subtitle, "FadeUpTime", 0);
    let fade_down = numeric_attr(subtitle, "FadeDownTime", 0);

    // Text lives either under a single inline <Font> or directly under the
    // <Subtitle>
    let container = subtitle.first_element("Font").unwrap_or(subtitle);
    let mut lines = collect_text_lines(container);
    if lines.is_empty() {
        lines = collect_text_lines(subtitle);
    }

    // Higher VPosition means higher on screen; descending sort restores
    // top-to-bottom reading order
    lines.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    let combined = lines
        .iter()
        .map(|(_, content)| content.as_str())
        .collect::<Vec<_>>()
        .join("\\N");
    if combined.is_empty() {
        return None;
    }

    let text = if fade_up != 0 || fade_down != 0 {
        format!("{{\\fad({fade_up},{fade_down})}}{combined}")
    } else {
        combined
    };
    Some(DialogueEvent::new(time_in, time_out, SYNTHESIZED_STYLE, text))
}

/// `(VPosition, content)` for each non-empty `<Text>` child
fn collect_text_lines(container: &XmlElement) -> Vec<(f64, String)> {
    let mut lines = Vec::new();
    for text in container.elements_named("Text") {
        let vpos = text
            .attr("VPosition")
            .map_or(10.0, |raw| parse_f64_or(raw, "VPosition", 10.0));
        let content = text.text();
        if !content.is_empty() {
            lines.push((vpos, content));
        }
    }
    lines
}

/// Parse the container font's typography attributes
///
/// `Script` (font name) is intentionally left at its default; CineCanvas
/// font names rarely map onto installed families and the editor substitutes
/// anyway.
fn parse_font_element(font: &XmlElement) -> FontProps {
    let mut props = FontProps::default();

    if let Some(raw) = font.attr("Size") {
        if let Ok(size) = raw.trim().parse() {
            props.size = size;
        } else {
            warn!(raw, "malformed Size attribute, keeping default");
        }
    }
    props.bold = font.attr_or("Weight", "normal").eq_ignore_ascii_case("bold");
    props.italic = font.attr_or("Italic", "no").eq_ignore_ascii_case("yes");
    props.primary = Rgba::from_cinecanvas(font.attr_or("Color", "FFFFFFFF"));

    let effect = font.attr_or("Effect", "none").to_ascii_lowercase();
    match effect.as_str() {
        "border" => {
            props.outline_width = 2.0;
            props.outline = Rgba::from_cinecanvas(font.attr_or("EffectColor", "FF000000"));
        }
        "shadow" | "none" => props.outline_width = 0.0,
        other => {
            debug!(effect = other, "unknown Effect value, treating as none");
            props.outline_width = 0.0;
        }
    }
    props
}

fn numeric_attr(element: &XmlElement, name: &str, default: i64) -> i64 {
    element.attr(name).map_or(default, |raw| {
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(attribute = name, raw, "malformed numeric attribute");
            default
        })
    })
}

fn parse_f64_or(raw: &str, name: &str, default: f64) -> f64 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(attribute = name, raw, "malformed numeric attribute");
        default
    })
}
