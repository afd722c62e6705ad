//! Owned element tree used as the `set_content` payload.

use std::fmt::Write;

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["input", "br", "hr", "img"];

#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(MarkupElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Markup>,
}

impl MarkupElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an earlier one with the same name.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    /// Adds a boolean attribute (`checked`, `selected`) when `on` is set.
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on {
            self.attr(name, "")
        } else {
            self
        }
    }

    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(Markup::Text(text.to_string()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<MarkupElement> for Markup {
    fn from(element: MarkupElement) -> Self {
        Markup::Element(element)
    }
}

impl Markup {
    pub fn element(tag: &str) -> MarkupElement {
        MarkupElement::new(tag)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Markup::Text(text) => out.push_str(&escape_text(text)),
            Markup::Element(el) => {
                write_open_tag(out, &el.tag, el.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str())));
                if is_void(&el.tag) {
                    return;
                }
                for child in &el.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

/// Serializes a whole content payload.
pub fn to_html(content: &[Markup]) -> String {
    let mut out = String::new();
    for node in content {
        node.write_html(&mut out);
    }
    out
}

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag.to_ascii_lowercase().as_str())
}

pub(crate) fn write_open_tag<'a>(
    out: &mut String,
    tag: &str,
    attrs: impl Iterator<Item = (&'a str, &'a str)>,
) {
    let _ = write!(out, "<{}", tag);
    for (name, value) in attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }
    if is_void(tag) {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
