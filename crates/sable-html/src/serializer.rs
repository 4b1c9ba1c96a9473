//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Renders a node or subtree back into markup. Rendering only reads the
//! tree and cannot fail.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use sable_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::parser::is_void_element;
use crate::tokenizer::RAWTEXT_ELEMENTS;

/// How void elements, and empty elements written as `<x/>`, are terminated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfClosingStyle {
    /// `<br>`
    #[default]
    Html,
    /// `<br />`
    Xhtml,
    /// `<br/>`
    Compact,
}

impl SelfClosingStyle {
    const fn terminator(self) -> &'static str {
        match self {
            Self::Html => ">",
            Self::Xhtml => " />",
            Self::Compact => "/>",
        }
    }
}

/// Output formatting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Quote every attribute value, even where HTML allows it bare.
    pub quote_all_attributes: bool,
    /// Terminator for void elements.
    pub self_closing_style: SelfClosingStyle,
    /// Emit comment nodes.
    pub include_comments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quote_all_attributes: true,
            self_closing_style: SelfClosingStyle::Html,
            include_comments: true,
        }
    }
}

/// Render `id` and its subtree (outer HTML).
///
/// The Document node renders as its children.
#[must_use]
pub fn render(tree: &DomTree, id: NodeId, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_node(tree, id, options, &mut out);
    out
}

/// Render the children of `id` (inner HTML).
#[must_use]
pub fn render_children(tree: &DomTree, id: NodeId, options: &RenderOptions) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, options, &mut out);
    }
    out
}

/// Render just the start tag of an element, attributes included.
#[must_use]
pub fn render_start_tag(data: &ElementData, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_start_tag(data, options, &mut out);
    out.push('>');
    out
}

fn write_node(tree: &DomTree, id: NodeId, options: &RenderOptions, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            for &child in &node.children {
                write_node(tree, child, options, out);
            }
        }
        NodeType::Element(data) => write_element(tree, id, data, options, out),
        NodeType::Text(text) => {
            let raw = tree
                .parent(id)
                .and_then(|parent| tree.tag_name(parent))
                .is_some_and(|tag| RAWTEXT_ELEMENTS.contains(&tag));
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeType::Comment(text) => {
            if options.include_comments {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
        NodeType::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        NodeType::Doctype(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
    }
}

fn write_element(
    tree: &DomTree,
    id: NodeId,
    data: &ElementData,
    options: &RenderOptions,
    out: &mut String,
) {
    write_start_tag(data, options, out);

    // A void tag name only picks the childless form. Content parsed under
    // rules where the tag is not void must still be rendered.
    let children = tree.children(id);
    if children.is_empty() && is_void_element(&data.tag_name) {
        out.push_str(options.self_closing_style.terminator());
        return;
    }

    if data.self_closing && children.is_empty() && options.self_closing_style != SelfClosingStyle::Html
    {
        out.push_str(options.self_closing_style.terminator());
        return;
    }

    out.push('>');
    for &child in children {
        write_node(tree, child, options, out);
    }
    out.push_str("</");
    out.push_str(&data.tag_name);
    out.push('>');
}

fn write_start_tag(data: &ElementData, options: &RenderOptions, out: &mut String) {
    out.push('<');
    out.push_str(&data.tag_name);
    for (name, value) in &data.attrs {
        out.push(' ');
        out.push_str(name);
        if !options.quote_all_attributes {
            if value.is_empty() {
                continue;
            }
            if can_be_unquoted(value) {
                out.push('=');
                escape_attribute(value, out);
                continue;
            }
        }
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
}

/// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
///
/// A value can be written bare when none of its characters would end or
/// corrupt an unquoted value.
fn can_be_unquoted(value: &str) -> bool {
    !value.chars().any(|c| {
        c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
    })
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;"...
/// "<" by "&lt;" ... ">" by "&gt;"."
fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// "If the algorithm was invoked in the attribute mode, replace any
/// occurrences of the """ character by the string "&quot;"."
fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_values() {
        assert!(can_be_unquoted("main"));
        assert!(can_be_unquoted("a&b"));
        assert!(!can_be_unquoted("two words"));
        assert!(!can_be_unquoted("a=b"));
        assert!(!can_be_unquoted("it's"));
    }

    #[test]
    fn test_escape_text() {
        let mut out = String::new();
        escape_text("a < b && c > d", &mut out);
        assert_eq!(out, "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"self_closing_style": "xhtml"}"#).unwrap();
        assert_eq!(options.self_closing_style, SelfClosingStyle::Xhtml);
        assert!(options.quote_all_attributes);
        assert!(options.include_comments);
    }
}
