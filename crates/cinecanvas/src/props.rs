//! Effective font properties for a dialogue line
//!
//! A line's typography is its style overlaid with whatever attribute
//! override tags appear in its text. Bold and italic are deliberately not
//! overlaid here: they vary per styled segment and are resolved by the
//! writer when it walks the segments.

use crate::ass::Style;
use crate::color::Rgba;
use crate::tags;

/// Resolved typography for one line
#[derive(Debug, Clone, PartialEq)]
pub struct FontProps {
    pub font_name: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub primary: Rgba,
    pub outline: Rgba,
    pub outline_width: f64,
}

impl Default for FontProps {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            size: 42,
            bold: false,
            italic: false,
            primary: Rgba::WHITE,
            outline: Rgba::BLACK,
            outline_width: 2.0,
        }
    }
}

impl FontProps {
    /// Seed from a style, falling back to defaults when there is none
    #[must_use]
    pub fn from_style(style: Option<&Style>) -> Self {
        match style {
            Some(style) => Self {
                font_name: style.font.clone(),
                size: style.font_size,
                bold: style.bold,
                italic: style.italic,
                primary: style.primary,
                outline: style.outline,
                outline_width: style.outline_width,
            },
            None => Self::default(),
        }
    }

    /// Effective properties for a line: style values overlaid with the
    /// line's `\fn`, `\fs`, `\1c`/`\c`, `\3c` and `\1a`/`\a` override tags
    #[must_use]
    pub fn effective(style: Option<&Style>, text: &str) -> Self {
        let mut props = Self::from_style(style);

        if let Some(name) = tags::font_name_override(text) {
            props.font_name = name.to_string();
        }
        if let Some(size) = tags::font_size_override(text) {
            props.size = size;
        }
        if let Some(color) = tags::primary_color_override(text) {
            props.primary = Rgba::with_alpha(color.r, color.g, color.b, props.primary.a);
        }
        if let Some(color) = tags::outline_color_override(text) {
            props.outline = Rgba::with_alpha(color.r, color.g, color.b, props.outline.a);
        }
        if let Some(alpha) = tags::primary_alpha_override(text) {
            props.primary.a = alpha;
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ass::Style;

    fn base_style() -> Style {
        Style {
            name: "Default".to_string(),
            font: "Futura".to_string(),
            font_size: 36,
            bold: true,
            italic: false,
            primary: Rgba::new(200, 200, 200),
            outline: Rgba::new(10, 10, 10),
            outline_width: 3.0,
            ..Style::default()
        }
    }

    #[test]
    fn style_seeds_props() {
        let style = base_style();
        let props = FontProps::effective(Some(&style), "plain text");
        assert_eq!(props.font_name, "Futura");
        assert_eq!(props.size, 36);
        assert!(props.bold);
        assert_eq!(props.primary, Rgba::new(200, 200, 200));
        assert!((props.outline_width - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_style_uses_defaults() {
        let props = FontProps::effective(None, "plain text");
        assert_eq!(props.font_name, "Arial");
        assert_eq!(props.size, 42);
        assert!(!props.bold);
    }

    #[test]
    fn overrides_replace_style_values() {
        let style = base_style();
        let props = FontProps::effective(Some(&style), r"{\fnHelvetica\fs50\1c&H0000FF&}x");
        assert_eq!(props.font_name, "Helvetica");
        assert_eq!(props.size, 50);
        assert_eq!(props.primary, Rgba::new(255, 0, 0));
        // Untouched fields keep the style's values
        assert_eq!(props.outline, Rgba::new(10, 10, 10));
    }

    #[test]
    fn alpha_override_keeps_rgb() {
        let style = base_style();
        let props = FontProps::effective(Some(&style), r"{\1a&H80&}x");
        assert_eq!(props.primary, Rgba::with_alpha(200, 200, 200, 128));
    }

    #[test]
    fn bold_italic_are_not_overlaid() {
        let style = base_style();
        let props = FontProps::effective(Some(&style), r"{\b0\i1}x");
        assert!(props.bold, "bold stays per-segment");
        assert!(!props.italic, "italic stays per-segment");
    }
}
