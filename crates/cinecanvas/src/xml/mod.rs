//! Minimal owned XML tree
//!
//! CineCanvas documents are small, so the codec builds a plain owned tree:
//! quick-xml's pull parser drives construction, and serialization is a
//! hand-rolled writer so the output shape stays fully deterministic.
//! Element-only content is indented two spaces per level; any element with
//! text content is rendered inline, which keeps mixed runs like
//! `<Text>a <Font Weight="bold">b</Font> c</Text>` byte-exact across a
//! round trip.

use crate::error::{CodecError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Write as _;

/// Child of an element: nested element or character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute, keeping insertion order
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Builder-style [`set_attr`](Self::set_attr)
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Attribute value by name
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by name, or a default
    #[must_use]
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    /// Append a child element
    pub fn push_element(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Append a text child
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Child elements with the given name
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    /// First child element with the given name
    #[must_use]
    pub fn first_element<'a>(&'a self, name: &'a str) -> Option<&'a XmlElement> {
        self.elements_named(name).next()
    }

    /// Concatenated character data of this element and its descendants,
    /// in document order
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Parse a document, returning its root element
    ///
    /// Comments, processing instructions and the XML declaration are
    /// skipped. Fails on malformed XML or an empty document.
    pub fn parse_document(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    stack.push(element_from_start(&start)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| CodecError::parse("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .decode()
                        .map_err(|e| CodecError::parse(format!("bad character data: {e}")))?;
                    // Whitespace runs containing a newline are pretty-printer
                    // layout, not content; a lone space inside mixed content
                    // has no newline and survives
                    if text.contains(['\n', '\r']) && text.chars().all(char::is_whitespace) {
                        continue;
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text.into_owned());
                    }
                }
                Ok(Event::CData(data)) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text);
                    }
                }
                // Entity references in character data arrive as their own
                // events and have to be resolved back into text
                Ok(Event::GeneralRef(reference)) => {
                    let name = String::from_utf8_lossy(&reference.into_inner()).into_owned();
                    let resolved = resolve_entity(&name).ok_or_else(|| {
                        CodecError::parse(format!("unresolvable entity reference: &{name};"))
                    })?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(resolved);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(CodecError::parse(format!("malformed XML: {e}"))),
            }
        }

        if !stack.is_empty() {
            return Err(CodecError::parse("unterminated element"));
        }
        root.ok_or_else(|| CodecError::parse("document has no root element"))
    }

    /// Serialize as a complete document with an XML declaration
    #[must_use]
    pub fn to_document_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        write_element(self, &mut out, 0);
        out
    }
}

/// Resolve a predefined or numeric character entity by name (without the
/// `&`/`;` framing)
fn resolve_entity(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value).map(|c| c.to_string())
        }
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(el) => collect_text(el, out),
        }
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CodecError::parse(format!("bad attribute: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| CodecError::parse(format!("bad attribute value: {e}")))?;
        element.set_attr(
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        );
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_element(element),
        None => {
            if root.is_some() {
                return Err(CodecError::parse("multiple root elements"));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn write_element(element: &XmlElement, out: &mut String, depth: usize) {
    write_indent(out, depth);
    write_open_tag(element, out);
    if element.children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');

    if has_text_content(element) {
        write_children_inline(element, out);
    } else {
        out.push('\n');
        for child in element.elements() {
            write_element(child, out, depth + 1);
        }
        write_indent(out, depth);
    }
    let _ = writeln!(out, "</{}>", element.name);
}

fn write_inline(element: &XmlElement, out: &mut String) {
    write_open_tag(element, out);
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    write_children_inline(element, out);
    let _ = write!(out, "</{}>", element.name);
}

fn write_children_inline(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => out.push_str(&escape_text(text)),
            XmlNode::Element(el) => write_inline(el, out),
        }
    }
}

fn write_open_tag(element: &XmlElement, out: &mut String) {
    let _ = write!(out, "<{}", element.name);
    for (name, value) in &element.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }
}

fn has_text_content(element: &XmlElement) -> bool {
    element
        .children
        .iter()
        .any(|node| matches!(node, XmlNode::Text(_)))
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
